//! Unified application error types for Ritmo.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Each [`ErrorKind`] renders as a
//! stable machine-readable code at the API boundary.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Login failed: unknown identifier or wrong password. The two cases
    /// are never distinguished in the client-visible error.
    InvalidCredentials,
    /// No access token was supplied in the header or cookie.
    TokenMissing,
    /// The access token's signature or structure failed verification.
    TokenInvalid,
    /// The access token's expiry claim is missing or in the past.
    TokenExpired,
    /// The access token decoded but lacks a usable subject claim.
    TokenMalformed,
    /// The token's subject does not resolve to a known identity.
    Unauthenticated,
    /// The caller does not have permission to perform the action.
    Forbidden,
    /// No refresh token was supplied in the body or cookie.
    RefreshTokenMissing,
    /// The refresh token is unknown, expired, revoked, or its owner is
    /// gone. Collapsed into a single code to avoid leaking which applied.
    RefreshTokenInvalid,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification).
    Conflict,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::TokenMissing => write!(f, "TOKEN_MISSING"),
            Self::TokenInvalid => write!(f, "TOKEN_INVALID"),
            Self::TokenExpired => write!(f, "TOKEN_EXPIRED"),
            Self::TokenMalformed => write!(f, "TOKEN_MALFORMED"),
            Self::Unauthenticated => write!(f, "UNAUTHENTICATED"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::RefreshTokenMissing => write!(f, "REFRESH_TOKEN_MISSING"),
            Self::RefreshTokenInvalid => write!(f, "REFRESH_TOKEN_INVALID"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

impl ErrorKind {
    /// Whether this kind represents an authentication failure (HTTP 401).
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::TokenMissing
                | Self::TokenInvalid
                | Self::TokenExpired
                | Self::TokenMalformed
                | Self::Unauthenticated
                | Self::RefreshTokenMissing
                | Self::RefreshTokenInvalid
        )
    }
}

/// The unified application error used throughout Ritmo.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an invalid-credentials error.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Invalid email or password")
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create the collapsed refresh-token error. Unknown, expired, revoked,
    /// and ownerless tokens all surface identically.
    pub fn refresh_invalid() -> Self {
        Self::new(
            ErrorKind::RefreshTokenInvalid,
            "Invalid or expired refresh token",
        )
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
