//! Repository implementations for database access.

pub mod refresh_token;
pub mod user;

pub use refresh_token::RefreshTokenRepository;
pub use user::UserRepository;
