//! JWT access token issuance and validation.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::AccessClaims;
pub use decoder::TokenVerifier;
pub use encoder::TokenIssuer;
