use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::SharedAuthorizer;
use crate::db::DbPool;
use crate::handlers::{auth, exercises, health, sessions, workouts};
use crate::middleware::require_owner;

/// Everything the handlers need, split into per-area states via `FromRef`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth: auth::AuthState,
    pub exercises: exercises::ExercisesState,
    pub sessions: sessions::SessionsState,
    pub workouts: workouts::WorkoutsState,
    pub authorizer: SharedAuthorizer,
    pub pool: DbPool,
}

pub fn create_router(state: AppState) -> Router {
    // Every route below carries a {username} segment checked by the authorizer.
    let owned = Router::new()
        // Exercises
        .route(
            "/api/{username}/exercises",
            get(exercises::list).post(exercises::create),
        )
        .route(
            "/api/{username}/exercises/{exercise_id}",
            put(exercises::update).delete(exercises::delete),
        )
        // Sessions
        .route(
            "/api/{username}/sessions",
            get(sessions::list).post(sessions::create),
        )
        .route("/api/{username}/sessions/dates", get(sessions::list_by_dates))
        .route(
            "/api/{username}/sessions/history/{exercise_id}",
            get(sessions::exercise_history),
        )
        .route(
            "/api/{username}/sessions/{session_id}",
            get(sessions::show)
                .put(sessions::update)
                .delete(sessions::delete)
                .post(workouts::create),
        )
        // Workouts
        .route(
            "/api/{username}/sessions/{session_id}/{workout_id}",
            get(workouts::show)
                .put(workouts::update)
                .delete(workouts::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_owner));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .merge(owned)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
