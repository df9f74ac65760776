//! # ritmo-entity
//!
//! Domain and persistence models shared across the Ritmo crates.

pub mod session;
pub mod user;
