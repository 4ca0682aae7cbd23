use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::db::DbPool;
use crate::version::GIT_VERSION;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
    git_version: &'static str,
}

/// Liveness plus a `SELECT 1` round trip through the pool.
pub async fn health_check(State(pool): State<DbPool>) -> (StatusCode, Json<HealthResponse>) {
    let reachable = tokio::task::spawn_blocking(move || -> bool {
        pool.get()
            .map(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).is_ok())
            .unwrap_or(false)
    })
    .await
    .unwrap_or(false);

    if !reachable {
        tracing::warn!("Health check could not reach the database");
    }

    let (code, status, database) = if reachable {
        (StatusCode::OK, "ok", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
    };

    (
        code,
        Json(HealthResponse {
            status,
            database,
            git_version: GIT_VERSION,
        }),
    )
}
