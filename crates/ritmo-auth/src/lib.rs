//! # ritmo-auth
//!
//! Credential verification, JWT issuance and validation, and refresh
//! token session management.
//!
//! Access tokens are short-lived stateless JWTs. Refresh tokens are
//! opaque random secrets stored server-side, one row per session, and
//! are rotated on every use.

pub mod credentials;
pub mod jwt;
pub mod password;
pub mod session;

pub use credentials::CredentialVerifier;
pub use jwt::{AccessClaims, TokenIssuer, TokenVerifier};
pub use password::PasswordHasher;
pub use session::{DeviceInfo, IssuedTokens, SessionManager, SessionStore, UserDirectory};
