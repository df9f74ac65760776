//! JWT access token validation.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use ritmo_core::config::AuthConfig;
use ritmo_core::error::{AppError, ErrorKind};

use super::claims::AccessClaims;

/// Validates JWT access tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a new verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);
        // No leeway: an exp even one second in the past is expired.
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks:
    /// 1. Signature validity
    /// 2. Expiration
    /// 3. Presence and shape of the required claims
    pub fn verify(&self, token: &str) -> Result<AccessClaims, AppError> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::new(ErrorKind::TokenExpired, "Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_)
                | jsonwebtoken::errors::ErrorKind::Json(_) => {
                    AppError::new(ErrorKind::TokenMalformed, "Malformed token")
                }
                jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(claim) => AppError::new(
                    ErrorKind::TokenMalformed,
                    format!("Token is missing required claim: {claim}"),
                ),
                _ => AppError::new(ErrorKind::TokenInvalid, "Invalid token"),
            })?;

        let claims = token_data.claims;

        // The library already validates exp; keep an explicit check so a
        // misconfigured Validation can never let an expired token through.
        if claims.exp <= Utc::now().timestamp() {
            return Err(AppError::new(ErrorKind::TokenExpired, "Token has expired"));
        }

        Ok(claims)
    }
}
