//! Refresh token repository.
//!
//! Each row is one logical session. Rows are never un-revoked; revocation
//! only flips `revoked` from FALSE to TRUE.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use ritmo_core::error::{AppError, ErrorKind};
use ritmo_entity::session::{NewRefreshToken, RefreshToken};

/// Repository for refresh token rows.
#[derive(Debug, Clone)]
pub struct RefreshTokenRepository {
    pool: PgPool,
}

impl RefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new refresh token row.
    pub async fn insert(&self, token: NewRefreshToken) -> Result<RefreshToken, AppError> {
        sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at, user_agent, ip_address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(&token.user_agent)
        .bind(&token.ip_address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to store refresh token", e)
        })
    }

    /// Atomically consume a refresh token secret: mark it revoked and return
    /// the row, but only if it was still active. Concurrent callers race on
    /// the conditional UPDATE and at most one of them receives the row.
    pub async fn consume(&self, secret: &str) -> Result<Option<RefreshToken>, AppError> {
        sqlx::query_as::<_, RefreshToken>(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token = $1 AND revoked = FALSE AND expires_at > NOW()
            RETURNING *
            "#,
        )
        .bind(secret)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to consume refresh token", e)
        })
    }

    /// Revoke the session identified by a refresh token secret.
    /// Returns the revoked row, or `None` if no active row matched.
    pub async fn revoke_by_secret(&self, secret: &str) -> Result<Option<RefreshToken>, AppError> {
        sqlx::query_as::<_, RefreshToken>(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token = $1 AND revoked = FALSE
            RETURNING *
            "#,
        )
        .bind(secret)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke refresh token", e)
        })
    }

    /// Revoke every active session belonging to a user.
    /// Returns the number of rows revoked.
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke user sessions", e)
        })?;

        Ok(result.rows_affected())
    }

    /// Revoke one session row by id, scoped to its owner.
    /// Returns `true` if an active row was revoked.
    pub async fn revoke_by_id(&self, user_id: Uuid, session_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE id = $1 AND user_id = $2 AND revoked = FALSE
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke session", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Revoke any active session for a user that carries the given
    /// user agent. Used to enforce one session per device at login.
    pub async fn revoke_by_device(
        &self,
        user_id: Uuid,
        user_agent: &str,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE user_id = $1 AND user_agent = $2 AND revoked = FALSE
            "#,
        )
        .bind(user_id)
        .bind(user_agent)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke device sessions", e)
        })?;

        Ok(result.rows_affected())
    }

    /// Revoke a batch of session rows by id for a user.
    pub async fn revoke_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE user_id = $1 AND id = ANY($2) AND revoked = FALSE
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke sessions", e))?;

        Ok(result.rows_affected())
    }

    /// List all active (non-revoked, non-expired) sessions for a user,
    /// newest first.
    pub async fn list_active(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, AppError> {
        sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT * FROM refresh_tokens
            WHERE user_id = $1 AND revoked = FALSE AND expires_at > $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sessions", e))
    }

    /// Delete rows that are expired or already revoked.
    /// Returns the number of rows deleted.
    pub async fn purge_expired_or_revoked(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE expires_at < $1 OR revoked = TRUE",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to purge stale tokens", e)
        })?;

        Ok(result.rows_affected())
    }
}
