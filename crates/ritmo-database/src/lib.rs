//! # ritmo-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for the Ritmo entities.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
