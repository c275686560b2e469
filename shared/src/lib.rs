//! Shared utilities and common types for the CodeVerify server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types (server, database, cache, quota, token signing)
//! - Utility functions (phone masking for logs)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, DatabaseConfig, QuotaConfig, ServerConfig, SigningConfig,
};
pub use utils::phone;
