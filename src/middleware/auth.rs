use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::{extract_bearer_token, SharedAuthorizer};
use crate::error::{AppError, Result};

/// Let the request through only if the injected authorizer accepts its bearer
/// token for the `{username}` path segment.
pub async fn require_owner(
    State(authorizer): State<SharedAuthorizer>,
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let username = params
        .get("username")
        .ok_or_else(|| AppError::Internal("route has no username segment".to_string()))?;

    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_bearer_token);

    if let Err(e) = authorizer.authorize(bearer, username) {
        tracing::debug!(%username, "Rejected request: {}", e);
        return Err(e);
    }

    Ok(next.run(request).await)
}
