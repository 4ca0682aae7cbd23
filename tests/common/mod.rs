#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;

use liftlog_backend::auth::{AllowAll, SharedAuthorizer, TokenService};
use liftlog_backend::db::{create_memory_pool, DbPool};
use liftlog_backend::handlers::{auth, exercises, sessions, workouts};
use liftlog_backend::migrations::run_migrations_for_tests;
use liftlog_backend::models::{Exercise, Session, User, Workout};
use liftlog_backend::repositories::{
    ExerciseRepository, SessionRepository, UserRepository, WorkoutRepository,
};
use liftlog_backend::routes::{create_router, AppState};

pub const TEST_SECRET: &str = "test-secret";

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub fn token_service() -> TokenService {
    TokenService::new(TEST_SECRET, chrono::Duration::hours(1))
}

/// Router guarded by real token verification.
pub fn create_test_app(pool: DbPool) -> Router {
    create_test_app_with_authorizer(pool, Arc::new(token_service()))
}

/// Router whose ownership check lets everything through.
pub fn create_open_test_app(pool: DbPool) -> Router {
    create_test_app_with_authorizer(pool, Arc::new(AllowAll))
}

pub fn create_test_app_with_authorizer(pool: DbPool, authorizer: SharedAuthorizer) -> Router {
    let user_repo = UserRepository::new(pool.clone());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let session_repo = SessionRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());

    create_router(AppState {
        auth: auth::AuthState {
            user_repo: user_repo.clone(),
            tokens: token_service(),
        },
        exercises: exercises::ExercisesState {
            user_repo: user_repo.clone(),
            exercise_repo: exercise_repo.clone(),
        },
        sessions: sessions::SessionsState {
            user_repo: user_repo.clone(),
            exercise_repo,
            session_repo,
        },
        workouts: workouts::WorkoutsState {
            user_repo,
            workout_repo,
        },
        authorizer,
        pool,
    })
}

pub fn bearer_for(username: &str) -> String {
    format!("Bearer {}", token_service().issue(username).unwrap())
}

pub fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

// Test data creation helpers
pub async fn create_test_user(pool: &DbPool, username: &str, password: &str) -> User {
    UserRepository::new(pool.clone())
        .create(username, password)
        .await
        .unwrap()
}

pub async fn create_test_exercise(pool: &DbPool, user_id: &str, name: &str) -> Exercise {
    ExerciseRepository::new(pool.clone())
        .create(user_id, name)
        .await
        .unwrap()
}

pub async fn create_test_session(
    pool: &DbPool,
    user_id: &str,
    name: &str,
    date: chrono::NaiveDate,
) -> Session {
    SessionRepository::new(pool.clone())
        .create(user_id, name, date, "")
        .await
        .unwrap()
}

pub async fn create_test_workout(
    pool: &DbPool,
    user_id: &str,
    session_id: &str,
    exercise_id: &str,
    content: &str,
) -> Workout {
    WorkoutRepository::new(pool.clone())
        .create(user_id, session_id, exercise_id, content)
        .await
        .unwrap()
}

pub fn date(s: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}
