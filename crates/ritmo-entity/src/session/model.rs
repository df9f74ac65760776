//! Persisted refresh-token model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted refresh token. One active row is one logical session.
///
/// Rows are append-only apart from the `revoked` flag, which only ever
/// flips from `false` to `true`. Expired and revoked rows are hard-deleted
/// by the periodic purge sweep.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Primary key; exposed to clients as the session id.
    pub id: Uuid,
    /// Owning user's internal id.
    pub user_id: Uuid,
    /// The opaque random secret. Unique, indexed, never reused.
    #[serde(skip_serializing)]
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// Monotonic revocation flag.
    pub revoked: bool,
    /// Device fingerprint (user-agent string) captured at issuance.
    pub user_agent: Option<String>,
    /// Client network address captured at issuance.
    pub ip_address: Option<String>,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// A token is active iff it is not revoked and not expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.expires_at > now
    }
}

/// Data required to persist a freshly issued refresh token.
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    /// Owning user's internal id.
    pub user_id: Uuid,
    /// The opaque random secret.
    pub token: String,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Device fingerprint, if the client sent one.
    pub user_agent: Option<String>,
    /// Client network address, if known.
    pub ip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(revoked: bool, expires_in: Duration) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token: "secret".to_string(),
            expires_at: now + expires_in,
            revoked,
            user_agent: None,
            ip_address: None,
            created_at: now,
        }
    }

    #[test]
    fn test_active_requires_unrevoked_and_unexpired() {
        let now = Utc::now();
        assert!(token(false, Duration::days(1)).is_active(now));
        assert!(!token(true, Duration::days(1)).is_active(now));
        assert!(!token(false, Duration::seconds(-1)).is_active(now));
    }
}
