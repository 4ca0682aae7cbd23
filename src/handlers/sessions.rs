use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::json_body;
use crate::error::{AppError, Result};
use crate::history::{self, HistoryEntry, HistoryWindow};
use crate::models::{CreateSession, SessionChanges, UpdateSession};
use crate::repositories::{ExerciseRepository, SessionRepository, UserRepository};
use crate::validation::{parse_date, parse_non_negative_integer, parse_offset};

#[derive(Clone)]
pub struct SessionsState {
    pub user_repo: UserRepository,
    pub exercise_repo: ExerciseRepository,
    pub session_repo: SessionRepository,
}

// Query params arrive as raw strings so malformed values get our own messages.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    start: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    date: Option<String>,
    offset: Option<String>,
}

#[derive(Serialize)]
struct HistoryResponse {
    message: &'static str,
    #[serde(flatten)]
    window: HistoryWindow<HistoryEntry>,
}

pub async fn list(
    State(state): State<SessionsState>,
    Path(username): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let limit = query.limit.as_deref().ok_or_else(|| {
        AppError::Validation("Get Sessions: Missing query parameter 'limit'.".to_string())
    })?;
    let limit = parse_non_negative_integer(limit).ok_or_else(|| {
        AppError::Validation("Get Sessions: 'limit' must be a non-negative integer.".to_string())
    })?;
    let start = match query.start.as_deref() {
        Some(start) => parse_non_negative_integer(start).ok_or_else(|| {
            AppError::Validation(
                "Get Sessions: 'start' must be a non-negative integer.".to_string(),
            )
        })?,
        None => 0,
    };

    let user = state.user_repo.require(&username).await?;
    let sessions = state
        .session_repo
        .find_paginated(&user.id, start, limit)
        .await?;

    Ok(Json(json!({
        "message": "Get Sessions: Success.",
        "sessions": sessions,
    }))
    .into_response())
}

pub async fn list_by_dates(
    State(state): State<SessionsState>,
    Path(username): Path<String>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Response> {
    let (Some(start_date), Some(end_date)) = (query.start_date.as_deref(), query.end_date.as_deref())
    else {
        return Err(AppError::Validation(
            "Get Sessions by Date: Missing query parameter(s).".to_string(),
        ));
    };
    let (Some(start_date), Some(end_date)) = (parse_date(start_date), parse_date(end_date)) else {
        return Err(AppError::Validation(
            "Get Sessions by Date: Invalid date format(s).".to_string(),
        ));
    };
    if start_date > end_date {
        return Err(AppError::Validation(
            "Get Sessions by Date: startDate must not be after endDate.".to_string(),
        ));
    }

    let user = state.user_repo.require(&username).await?;
    let sessions = state
        .session_repo
        .find_in_range(&user.id, start_date, end_date)
        .await?;

    Ok(Json(json!({
        "message": "Get Sessions by Date: Success.",
        "sessions": sessions,
    }))
    .into_response())
}

pub async fn create(
    State(state): State<SessionsState>,
    Path(username): Path<String>,
    payload: std::result::Result<Json<CreateSession>, JsonRejection>,
) -> Result<Response> {
    let body = json_body(payload)?;
    let name = body.name.as_deref().filter(|s| !s.is_empty()).ok_or_else(|| {
        AppError::Validation("Create Session: Missing body parameter 'name'.".to_string())
    })?;
    let date = body.date.as_deref().ok_or_else(|| {
        AppError::Validation("Create Session: Missing body parameter 'date'.".to_string())
    })?;
    let date = parse_date(date)
        .ok_or_else(|| AppError::Validation("Create Session: Invalid date format.".to_string()))?;
    let location = body.location.as_deref().unwrap_or("");

    let user = state.user_repo.require(&username).await?;
    let session = state
        .session_repo
        .create(&user.id, name, date, location)
        .await?;
    tracing::debug!(%username, session_id = %session.id, "Session created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Create Session: Success.",
            "createdSession": session,
        })),
    )
        .into_response())
}

pub async fn show(
    State(state): State<SessionsState>,
    Path((username, session_id)): Path<(String, String)>,
) -> Result<Response> {
    let user = state.user_repo.require(&username).await?;
    let session = state
        .session_repo
        .find(&user.id, &session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found.", session_id)))?;

    Ok(Json(json!({
        "message": "Get Session: Success.",
        "session": session,
    }))
    .into_response())
}

pub async fn update(
    State(state): State<SessionsState>,
    Path((username, session_id)): Path<(String, String)>,
    payload: std::result::Result<Json<UpdateSession>, JsonRejection>,
) -> Result<Response> {
    let body = json_body(payload)?;
    let date = match body.date.as_deref() {
        Some(date) => Some(parse_date(date).ok_or_else(|| {
            AppError::Validation("Update Session: Invalid date format.".to_string())
        })?),
        None => None,
    };
    if body.name.as_deref() == Some("") {
        return Err(AppError::Validation(
            "Update Session: 'name' must not be empty.".to_string(),
        ));
    }
    let changes = SessionChanges {
        name: body.name,
        date,
        location: body.location,
    };
    if changes.is_empty() {
        return Err(AppError::Validation(
            "Update Session: Nothing to update.".to_string(),
        ));
    }

    let user = state.user_repo.require(&username).await?;
    let session = state
        .session_repo
        .update(&user.id, &session_id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found.", session_id)))?;

    Ok(Json(json!({
        "message": "Update Session: Success.",
        "updatedSession": session,
    }))
    .into_response())
}

pub async fn delete(
    State(state): State<SessionsState>,
    Path((username, session_id)): Path<(String, String)>,
) -> Result<Response> {
    let user = state.user_repo.require(&username).await?;
    if !state.session_repo.delete(&user.id, &session_id).await? {
        return Err(AppError::NotFound(format!(
            "Session {} not found.",
            session_id
        )));
    }

    Ok(Json(json!({
        "message": "Delete Session: Success.",
        "deletedSessionId": session_id,
    }))
    .into_response())
}

pub async fn exercise_history(
    State(state): State<SessionsState>,
    Path((username, exercise_id)): Path<(String, String)>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response> {
    let date = query.date.as_deref().ok_or_else(|| {
        AppError::Validation("Get Workout History: Missing query parameter 'date'.".to_string())
    })?;
    let date = parse_date(date).ok_or_else(|| {
        AppError::Validation("Get Workout History: Invalid date format.".to_string())
    })?;
    let offset = match query.offset.as_deref() {
        Some(offset) => parse_offset(offset).ok_or_else(|| {
            AppError::Validation("Get Workout History: 'offset' must be an integer.".to_string())
        })?,
        None => 0,
    };

    let user = state.user_repo.require(&username).await?;
    state
        .exercise_repo
        .find_for_user(&exercise_id, &user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Exercise {} not found.", exercise_id)))?;

    let entries = state
        .session_repo
        .exercise_history(&user.id, &exercise_id)
        .await?;

    Ok(Json(HistoryResponse {
        message: "Get Workout History: Success.",
        window: history::window(&entries, date, offset),
    })
    .into_response())
}
