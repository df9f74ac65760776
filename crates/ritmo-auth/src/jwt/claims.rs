//! Access token claims.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an access token.
///
/// `sub` is the user's public identifier, never the internal row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Public identifier of the authenticated user.
    pub sub: Uuid,
    /// Unique token identifier.
    pub jti: Uuid,
    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,
    /// Expiration timestamp (Unix seconds).
    pub exp: i64,
}
