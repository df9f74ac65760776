//! Token and credential configuration.

use serde::{Deserialize, Serialize};

/// Authentication and token issuance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
    /// Whether auth cookies carry the `Secure` attribute. Disable only for
    /// plain-HTTP local development.
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            cookie_secure: default_cookie_secure(),
        }
    }
}

impl AuthConfig {
    /// Access token TTL in whole seconds, as reported to clients.
    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl_minutes * 60
    }

    /// Refresh token TTL in whole seconds.
    pub fn refresh_ttl_seconds(&self) -> u64 {
        self.refresh_ttl_days * 24 * 60 * 60
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    7
}

fn default_cookie_secure() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_conversions() {
        let config = AuthConfig::default();
        assert_eq!(config.access_ttl_seconds(), 15 * 60);
        assert_eq!(config.refresh_ttl_seconds(), 7 * 86400);
    }
}
