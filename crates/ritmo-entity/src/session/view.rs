//! Client-facing session listing derived from refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::RefreshToken;

/// What a user sees when listing their active sessions.
///
/// Deliberately excludes the token secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    /// Session id (the refresh-token row id).
    pub id: Uuid,
    /// Device fingerprint captured at login.
    pub user_agent: Option<String>,
    /// Network address captured at login.
    pub ip_address: Option<String>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

impl From<&RefreshToken> for SessionView {
    fn from(token: &RefreshToken) -> Self {
        Self {
            id: token.id,
            user_agent: token.user_agent.clone(),
            ip_address: token.ip_address.clone(),
            created_at: token.created_at,
            expires_at: token.expires_at,
        }
    }
}
