//! JWT access token creation with configurable signing and TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use ritmo_core::config::AuthConfig;
use ritmo_core::error::AppError;

use super::claims::AccessClaims;

/// Creates signed JWT access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL in minutes.
    access_ttl_minutes: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

impl TokenIssuer {
    /// Creates a new issuer from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_minutes: config.access_ttl_minutes as i64,
        }
    }

    /// Generates a fresh access token for the given public user id.
    ///
    /// Every call produces a distinct token: the `jti` claim is a new
    /// UUID even when two tokens are issued within the same second.
    pub fn issue(&self, public_id: Uuid) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + chrono::Duration::minutes(self.access_ttl_minutes);

        let claims = AccessClaims {
            sub: public_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok((token, exp))
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_minutes * 60
    }
}
