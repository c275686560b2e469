//! Database module - MySQL implementations using SQLx
//!
//! Provides the connection pool and the repository implementations backing
//! the core issuance and verification engines.

pub mod connection;
pub mod mysql;

pub use connection::DatabasePool;
pub use mysql::{MySqlCodeRepository, MySqlRealmRepository};
