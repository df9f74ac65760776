//! # ritmo-core
//!
//! Core crate for the Ritmo auth service. Contains the configuration
//! schemas and the unified error system.
//!
//! This crate has **no** internal dependencies on other Ritmo crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
