//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered user account.
///
/// `id` is the stable internal identifier used as a foreign key;
/// `public_id` is the opaque identifier safe to embed in tokens.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Internal primary key. Never leaves the backend.
    pub id: Uuid,
    /// Public identifier embedded in access token subjects.
    pub public_id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// First name (optional).
    pub first_name: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role.
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user may call privileged endpoints.
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// First name (optional).
    pub first_name: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
}
