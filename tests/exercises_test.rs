mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_list_exercises_empty() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "alice", "password123").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "GET",
            "/api/alice/exercises",
            Some(&common::bearer_for("alice")),
            None,
        ))
        .await
        .unwrap();

    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Get Exercises: Success.");
    assert_eq!(body["exercises"], json!([]));
}

#[tokio::test]
async fn test_list_exercises_unknown_user() {
    let app = common::create_test_app(common::setup_test_db());

    let response = app
        .oneshot(common::json_request(
            "GET",
            "/api/ghost/exercises",
            Some(&common::bearer_for("ghost")),
            None,
        ))
        .await
        .unwrap();

    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User ghost not found.");
}

#[tokio::test]
async fn test_create_exercise_returns_full_list() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "alice", "password123").await;
    common::create_test_exercise(&pool, &user.id, "Squat").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/alice/exercises",
            Some(&common::bearer_for("alice")),
            Some(json!({ "exerciseName": "  Bench Press  " })),
        ))
        .await
        .unwrap();

    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["createdExercise"]["name"], "Bench Press");
    assert!(body["createdExercise"]["id"].is_string());
    assert!(body["createdExercise"].get("userId").is_none());

    let names: Vec<&str> = body["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Squat", "Bench Press"]);
}

#[tokio::test]
async fn test_create_exercise_requires_name() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "alice", "password123").await;
    let app = common::create_test_app(pool);

    for body in [json!({}), json!({ "exerciseName": "   " })] {
        let response = app
            .clone()
            .oneshot(common::json_request(
                "POST",
                "/api/alice/exercises",
                Some(&common::bearer_for("alice")),
                Some(body),
            ))
            .await
            .unwrap();

        let (status, body) = common::read_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Create Exercise: Please provide an exercise name."
        );
    }
}

#[tokio::test]
async fn test_create_duplicate_exercise_conflicts() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "alice", "password123").await;
    common::create_test_exercise(&pool, &user.id, "Squat").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/alice/exercises",
            Some(&common::bearer_for("alice")),
            Some(json!({ "exerciseName": "Squat" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_same_exercise_name_for_different_users() {
    let pool = common::setup_test_db();
    let alice = common::create_test_user(&pool, "alice", "password123").await;
    common::create_test_user(&pool, "bob", "password123").await;
    common::create_test_exercise(&pool, &alice.id, "Squat").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/bob/exercises",
            Some(&common::bearer_for("bob")),
            Some(json!({ "exerciseName": "Squat" })),
        ))
        .await
        .unwrap();

    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["exercises"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_exercise() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "alice", "password123").await;
    let exercise = common::create_test_exercise(&pool, &user.id, "Squat").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/api/alice/exercises/{}", exercise.id),
            Some(&common::bearer_for("alice")),
            Some(json!({ "exerciseName": "Front Squat" })),
        ))
        .await
        .unwrap();

    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedExercise"]["id"], exercise.id.as_str());
    assert_eq!(body["updatedExercise"]["name"], "Front Squat");
}

#[tokio::test]
async fn test_update_other_users_exercise_not_found() {
    let pool = common::setup_test_db();
    let alice = common::create_test_user(&pool, "alice", "password123").await;
    common::create_test_user(&pool, "bob", "password123").await;
    let exercise = common::create_test_exercise(&pool, &alice.id, "Squat").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/api/bob/exercises/{}", exercise.id),
            Some(&common::bearer_for("bob")),
            Some(json!({ "exerciseName": "Mine now" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_exercise() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "alice", "password123").await;
    let squat = common::create_test_exercise(&pool, &user.id, "Squat").await;
    common::create_test_exercise(&pool, &user.id, "Deadlift").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "DELETE",
            &format!("/api/alice/exercises/{}", squat.id),
            Some(&common::bearer_for("alice")),
            None,
        ))
        .await
        .unwrap();

    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    let exercises = body["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0]["name"], "Deadlift");
}

#[tokio::test]
async fn test_delete_missing_exercise() {
    let pool = common::setup_test_db();
    common::create_test_user(&pool, "alice", "password123").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "DELETE",
            "/api/alice/exercises/does-not-exist",
            Some(&common::bearer_for("alice")),
            None,
        ))
        .await
        .unwrap();

    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Exercise does-not-exist not found.");
}

#[tokio::test]
async fn test_delete_exercise_in_use_conflicts() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "alice", "password123").await;
    let exercise = common::create_test_exercise(&pool, &user.id, "Squat").await;
    let session =
        common::create_test_session(&pool, &user.id, "Legs", common::date("2021-07-01")).await;
    common::create_test_workout(&pool, &user.id, &session.id, &exercise.id, "100x5").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "DELETE",
            &format!("/api/alice/exercises/{}", exercise.id),
            Some(&common::bearer_for("alice")),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rename_to_existing_name_conflicts() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "alice", "password123").await;
    common::create_test_exercise(&pool, &user.id, "Squat").await;
    let deadlift = common::create_test_exercise(&pool, &user.id, "Deadlift").await;
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(common::json_request(
            "PUT",
            &format!("/api/alice/exercises/{}", deadlift.id),
            Some(&common::bearer_for("alice")),
            Some(json!({ "exerciseName": "Squat" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
