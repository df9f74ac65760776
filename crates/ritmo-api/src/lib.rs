//! # ritmo-api
//!
//! HTTP API layer: routing, handlers, extractors, cookies, and DTOs.

pub mod cookies;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
