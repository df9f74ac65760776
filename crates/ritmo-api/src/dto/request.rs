//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username.
    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// Password, repeated.
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    /// First name.
    pub first_name: Option<String>,
}

/// Login request body. The identifier is an email or a username.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email or username.
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body. The secret may come from the refresh cookie
/// instead, so the body and its field are both optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token secret.
    pub refresh_token: Option<String>,
}

/// Logout request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// Revoke every session of the user, not just the current one.
    #[serde(default)]
    pub all_devices: bool,
}

/// Session cap request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLimitRequest {
    /// Maximum number of active sessions to keep.
    pub max_sessions: i64,
}
