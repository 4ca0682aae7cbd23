use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use liftlog_backend::auth::TokenService;
use liftlog_backend::config::Config;
use liftlog_backend::handlers::{auth, exercises, sessions, workouts};
use liftlog_backend::repositories::{
    ExerciseRepository, SessionRepository, UserRepository, WorkoutRepository,
};
use liftlog_backend::routes::{self, AppState};
use liftlog_backend::version::GIT_VERSION;
use liftlog_backend::{db, migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "liftlog_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("JWT_SECRET must be set: {}", e))?;

    tracing::info!("Starting liftlog-backend {}", GIT_VERSION);
    tracing::info!("Connecting to database: {}", config.database_url);

    let pool = db::create_pool(&config.database_url)?;
    migrations::run_migrations(&pool)?;

    let tokens = TokenService::new(
        &config.jwt_secret,
        chrono::Duration::hours(config.token_ttl_hours),
    );

    // Create repositories
    let user_repo = UserRepository::new(pool.clone());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let session_repo = SessionRepository::new(pool.clone());
    let workout_repo = WorkoutRepository::new(pool.clone());

    let state = AppState {
        auth: auth::AuthState {
            user_repo: user_repo.clone(),
            tokens: tokens.clone(),
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
        authorizer: Arc::new(tokens),
        pool,
    };

    let app = routes::create_router(state);

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
