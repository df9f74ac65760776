//! Storage seams for session management.
//!
//! [`SessionStore`] and [`UserDirectory`] abstract over the database so the
//! session manager can be exercised against in-memory implementations in
//! tests. The PostgreSQL implementations delegate to the repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use ritmo_core::error::AppError;
use ritmo_database::repositories::{RefreshTokenRepository, UserRepository};
use ritmo_entity::session::{NewRefreshToken, RefreshToken};
use ritmo_entity::user::User;

/// Persistence operations over refresh token rows.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session row.
    async fn insert(&self, token: NewRefreshToken) -> Result<RefreshToken, AppError>;

    /// Atomically mark an active row revoked and return it. At most one
    /// concurrent caller for the same secret receives the row.
    async fn consume(&self, secret: &str) -> Result<Option<RefreshToken>, AppError>;

    /// Revoke the active row carrying this secret, if any.
    async fn revoke_by_secret(&self, secret: &str) -> Result<Option<RefreshToken>, AppError>;

    /// Revoke every active row for a user. Returns the count revoked.
    async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AppError>;

    /// Revoke one row by id, scoped to its owner.
    async fn revoke_by_id(&self, user_id: Uuid, session_id: Uuid) -> Result<bool, AppError>;

    /// Revoke active rows for a user matching a user agent.
    async fn revoke_by_device(&self, user_id: Uuid, user_agent: &str) -> Result<u64, AppError>;

    /// Revoke a batch of rows by id for a user.
    async fn revoke_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64, AppError>;

    /// Active rows for a user, newest first.
    async fn list_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, AppError>;

    /// Delete expired or revoked rows. Returns the count deleted.
    async fn purge(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

/// Read-only lookups over user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_public_id(&self, public_id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

/// PostgreSQL-backed session store.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    repository: RefreshTokenRepository,
}

impl PgSessionStore {
    pub fn new(repository: RefreshTokenRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, token: NewRefreshToken) -> Result<RefreshToken, AppError> {
        self.repository.insert(token).await
    }

    async fn consume(&self, secret: &str) -> Result<Option<RefreshToken>, AppError> {
        self.repository.consume(secret).await
    }

    async fn revoke_by_secret(&self, secret: &str) -> Result<Option<RefreshToken>, AppError> {
        self.repository.revoke_by_secret(secret).await
    }

    async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AppError> {
        self.repository.revoke_all(user_id).await
    }

    async fn revoke_by_id(&self, user_id: Uuid, session_id: Uuid) -> Result<bool, AppError> {
        self.repository.revoke_by_id(user_id, session_id).await
    }

    async fn revoke_by_device(&self, user_id: Uuid, user_agent: &str) -> Result<u64, AppError> {
        self.repository.revoke_by_device(user_id, user_agent).await
    }

    async fn revoke_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64, AppError> {
        self.repository.revoke_by_ids(user_id, ids).await
    }

    async fn list_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, AppError> {
        self.repository.list_active(user_id, now).await
    }

    async fn purge(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        self.repository.purge_expired_or_revoked(now).await
    }
}

/// PostgreSQL-backed user directory.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    repository: UserRepository,
}

impl PgUserDirectory {
    pub fn new(repository: UserRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.repository.find_by_id(id).await
    }

    async fn find_by_public_id(&self, public_id: Uuid) -> Result<Option<User>, AppError> {
        self.repository.find_by_public_id(public_id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.repository.find_by_email(email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.repository.find_by_username(username).await
    }
}
