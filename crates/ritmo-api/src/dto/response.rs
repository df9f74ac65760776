//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ritmo_entity::user::User;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// User summary for responses. Only the public identifier is exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// Public user ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// First name.
    pub first_name: Option<String>,
    /// Role.
    pub role: String,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.public_id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            role: user.role.to_string(),
            created_at: user.created_at,
        }
    }
}

/// Token pair issued at login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token secret.
    pub refresh_token: String,
    /// Token type, always `bearer`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// Access token expiration.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Login response: tokens plus the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Issued tokens.
    #[serde(flatten)]
    pub tokens: TokenResponse,
    /// Authenticated user.
    pub user: UserResponse,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

/// Count of sessions revoked by a cap or logout operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedResponse {
    /// Number of sessions revoked.
    pub revoked: u64,
}

/// Count of rows removed by a cleanup run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResponse {
    /// Number of stale rows purged.
    pub purged: u64,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Database connectivity.
    pub database: String,
}
