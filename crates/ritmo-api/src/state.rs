//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use ritmo_auth::password::PasswordHasher;
use ritmo_auth::session::SessionManager;
use ritmo_core::config::AppConfig;
use ritmo_database::DatabasePool;
use ritmo_database::repositories::UserRepository;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool wrapper
    pub db: DatabasePool,
    /// Session lifecycle manager
    pub session_manager: Arc<SessionManager>,
    /// Password hasher (Argon2)
    pub password_hasher: Arc<PasswordHasher>,
    /// User repository
    pub user_repo: Arc<UserRepository>,
}
