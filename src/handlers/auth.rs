use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::json_body;
use crate::auth::TokenService;
use crate::error::{AppError, Result};
use crate::models::Credentials;
use crate::repositories::UserRepository;

#[derive(Clone)]
pub struct AuthState {
    pub user_repo: UserRepository,
    pub tokens: TokenService,
}

pub async fn signup(
    State(state): State<AuthState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Response> {
    let credentials = json_body(payload)?;
    let (username, password) = credentials.complete().ok_or_else(|| {
        AppError::Validation("Signup: Please provide a valid username and password".to_string())
    })?;

    state.user_repo.create(username, password).await?;
    tracing::info!(%username, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": format!("Record for user \"{}\" created.", username) })),
    )
        .into_response())
}

pub async fn login(
    State(state): State<AuthState>,
    payload: std::result::Result<Json<Credentials>, JsonRejection>,
) -> Result<Response> {
    let credentials = json_body(payload)?;
    let (username, password) = credentials.complete().ok_or_else(|| {
        AppError::Validation("Login: Please provide a valid username and password".to_string())
    })?;

    let user = state
        .user_repo
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cannot find user {}", username)))?;

    if !state.user_repo.verify_password(&user, password)? {
        return Err(AppError::Unauthorized("Authentication failed".to_string()));
    }

    let token = state.tokens.issue(&user.username)?;

    Ok(Json(json!({
        "message": "Authentication successful",
        "token": token,
    }))
    .into_response())
}
