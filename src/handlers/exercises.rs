use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::json_body;
use crate::error::{AppError, Result};
use crate::models::ExerciseName;
use crate::repositories::{ExerciseRepository, UserRepository};

#[derive(Clone)]
pub struct ExercisesState {
    pub user_repo: UserRepository,
    pub exercise_repo: ExerciseRepository,
}

pub async fn list(
    State(state): State<ExercisesState>,
    Path(username): Path<String>,
) -> Result<Response> {
    let user = state.user_repo.require(&username).await?;
    let exercises = state.exercise_repo.find_by_user(&user.id).await?;

    Ok(Json(json!({
        "message": "Get Exercises: Success.",
        "exercises": exercises,
    }))
    .into_response())
}

pub async fn create(
    State(state): State<ExercisesState>,
    Path(username): Path<String>,
    payload: std::result::Result<Json<ExerciseName>, JsonRejection>,
) -> Result<Response> {
    let body = json_body(payload)?;
    let name = body.trimmed().ok_or_else(|| {
        AppError::Validation("Create Exercise: Please provide an exercise name.".to_string())
    })?;

    let user = state.user_repo.require(&username).await?;
    let exercise = state.exercise_repo.create(&user.id, name).await?;
    let exercises = state.exercise_repo.find_by_user(&user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Create Exercise: Success.",
            "createdExercise": exercise,
            "exercises": exercises,
        })),
    )
        .into_response())
}

pub async fn update(
    State(state): State<ExercisesState>,
    Path((username, exercise_id)): Path<(String, String)>,
    payload: std::result::Result<Json<ExerciseName>, JsonRejection>,
) -> Result<Response> {
    let body = json_body(payload)?;
    let name = body.trimmed().ok_or_else(|| {
        AppError::Validation("Update Exercise: Please provide an exercise name.".to_string())
    })?;

    let user = state.user_repo.require(&username).await?;
    let exercise = state
        .exercise_repo
        .rename(&exercise_id, &user.id, name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found.", exercise_id)))?;

    Ok(Json(json!({
        "message": "Update Exercise: Success.",
        "updatedExercise": exercise,
    }))
    .into_response())
}

pub async fn delete(
    State(state): State<ExercisesState>,
    Path((username, exercise_id)): Path<(String, String)>,
) -> Result<Response> {
    let user = state.user_repo.require(&username).await?;
    if !state.exercise_repo.delete(&exercise_id, &user.id).await? {
        return Err(AppError::NotFound(format!(
            "Exercise {} not found.",
            exercise_id
        )));
    }
    let exercises = state.exercise_repo.find_by_user(&user.id).await?;

    Ok(Json(json!({
        "message": "Delete Exercise: Success.",
        "exercises": exercises,
    }))
    .into_response())
}
