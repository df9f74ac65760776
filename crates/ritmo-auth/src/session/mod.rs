//! Refresh token session management.

pub mod cleanup;
pub mod manager;
pub mod store;

pub use cleanup::SessionCleanup;
pub use manager::{DeviceInfo, IssuedTokens, SessionManager};
pub use store::{PgSessionStore, PgUserDirectory, SessionStore, UserDirectory};
