use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::json_body;
use crate::error::{AppError, Result};
use crate::models::{CreateWorkout, UpdateWorkout, WorkoutChanges};
use crate::repositories::{UserRepository, WorkoutRepository};
use crate::validation::is_valid_workout_content;

#[derive(Clone)]
pub struct WorkoutsState {
    pub user_repo: UserRepository,
    pub workout_repo: WorkoutRepository,
}

fn workout_not_found(workout_id: &str) -> AppError {
    AppError::NotFound(format!("Workout {} not found.", workout_id))
}

pub async fn create(
    State(state): State<WorkoutsState>,
    Path((username, session_id)): Path<(String, String)>,
    payload: std::result::Result<Json<CreateWorkout>, JsonRejection>,
) -> Result<Response> {
    let body = json_body(payload)?;
    let exercise_id = body
        .exercise_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::Validation("Create Workout: Missing body parameter 'exerciseId'.".to_string())
        })?;
    let content = body.content.as_deref().unwrap_or("");
    if !is_valid_workout_content(content) {
        return Err(AppError::Validation(
            "Create Workout: Invalid workout content.".to_string(),
        ));
    }

    let user = state.user_repo.require(&username).await?;
    let workout = state
        .workout_repo
        .create(&user.id, &session_id, exercise_id, content)
        .await?;
    tracing::debug!(%username, %session_id, workout_id = %workout.id, "Workout created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Create Workout: Success.",
            "createdWorkout": workout,
        })),
    )
        .into_response())
}

pub async fn show(
    State(state): State<WorkoutsState>,
    Path((username, session_id, workout_id)): Path<(String, String, String)>,
) -> Result<Response> {
    let user = state.user_repo.require(&username).await?;
    let workout = state
        .workout_repo
        .find(&user.id, &session_id, &workout_id)
        .await?
        .ok_or_else(|| workout_not_found(&workout_id))?;

    Ok(Json(json!({
        "message": "Get Workout: Success.",
        "workout": workout,
    }))
    .into_response())
}

pub async fn update(
    State(state): State<WorkoutsState>,
    Path((username, session_id, workout_id)): Path<(String, String, String)>,
    payload: std::result::Result<Json<UpdateWorkout>, JsonRejection>,
) -> Result<Response> {
    let body = json_body(payload)?;
    if let Some(content) = body.content.as_deref() {
        if !is_valid_workout_content(content) {
            return Err(AppError::Validation(
                "Update Workout: Invalid workout content.".to_string(),
            ));
        }
    }
    if body.exercise_id.as_deref() == Some("") {
        return Err(AppError::Validation(
            "Update Workout: 'exerciseId' must not be empty.".to_string(),
        ));
    }
    let changes = WorkoutChanges {
        exercise_id: body.exercise_id,
        content: body.content,
    };
    if changes.is_empty() {
        return Err(AppError::Validation(
            "Update Workout: Nothing to update.".to_string(),
        ));
    }

    let user = state.user_repo.require(&username).await?;
    let workout = state
        .workout_repo
        .update(&user.id, &session_id, &workout_id, changes)
        .await?;

    Ok(Json(json!({
        "message": "Update Workout: Success.",
        "updatedWorkout": workout,
    }))
    .into_response())
}

pub async fn delete(
    State(state): State<WorkoutsState>,
    Path((username, session_id, workout_id)): Path<(String, String, String)>,
) -> Result<Response> {
    let user = state.user_repo.require(&username).await?;
    if !state
        .workout_repo
        .delete(&user.id, &session_id, &workout_id)
        .await?
    {
        return Err(workout_not_found(&workout_id));
    }

    Ok(Json(json!({
        "message": "Delete Workout: Success.",
        "deletedWorkoutId": workout_id,
    }))
    .into_response())
}
