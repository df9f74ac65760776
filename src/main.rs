//! Ritmo Server — Session and credential management backend
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use ritmo_auth::session::{PgSessionStore, PgUserDirectory, SessionCleanup, SessionManager};
use ritmo_core::config::AppConfig;
use ritmo_core::error::AppError;
use ritmo_database::DatabasePool;
use ritmo_database::repositories::{RefreshTokenRepository, UserRepository};

#[tokio::main]
async fn main() {
    let env = std::env::var("RITMO_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Ritmo v{}", env!("CARGO_PKG_VERSION"));

    // Database connection + migrations
    let db = DatabasePool::connect(&config.database).await?;
    ritmo_database::migration::run_migrations(db.pool()).await?;

    // Repositories
    let user_repo = Arc::new(UserRepository::new(db.pool().clone()));
    let token_repo = RefreshTokenRepository::new(db.pool().clone());

    // Auth system
    let session_store = Arc::new(PgSessionStore::new(token_repo));
    let user_directory = Arc::new(PgUserDirectory::new(UserRepository::new(db.pool().clone())));
    let session_manager = Arc::new(SessionManager::new(
        session_store,
        user_directory,
        &config.auth,
    ));
    let password_hasher = Arc::new(ritmo_auth::password::PasswordHasher::new());

    // Shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Background session cleanup
    let cleanup_handle = if config.session.cleanup_enabled {
        let cleanup = SessionCleanup::new(
            Arc::clone(&session_manager),
            std::time::Duration::from_secs(config.session.cleanup_interval_minutes * 60),
        );
        Some(cleanup.spawn(shutdown_rx.clone()))
    } else {
        tracing::info!("Session cleanup task disabled");
        None
    };

    // HTTP server
    let app_state = ritmo_api::state::AppState {
        config: Arc::new(config.clone()),
        db: db.clone(),
        session_manager,
        password_hasher,
        user_repo,
    };

    let app = ritmo_api::router::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Ritmo server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // Wait for background tasks
    if let Some(handle) = cleanup_handle {
        let grace = std::time::Duration::from_secs(config.server.shutdown_grace_seconds);
        let _ = tokio::time::timeout(grace, handle).await;
    }

    db.close().await;
    tracing::info!("Ritmo server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
