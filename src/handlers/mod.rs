pub mod auth;
pub mod exercises;
pub mod health;
pub mod sessions;
pub mod workouts;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::{AppError, Result};

/// Unwrap a JSON body, treating a request without one as an empty object so
/// that handlers report the specific missing field.
pub(crate) fn json_body<T: Default>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
    }
}
