//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `server` - HTTP server configuration
//! - `database` - Database connection and pool configuration
//! - `cache` - Redis configuration
//! - `quota` - Realm quota enforcement and key derivation
//! - `signing` - ES256 token signing configuration

pub mod cache;
pub mod database;
pub mod quota;
pub mod server;
pub mod signing;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use quota::QuotaConfig;
pub use server::ServerConfig;
pub use signing::SigningConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Quota configuration
    pub quota: QuotaConfig,

    /// Token signing configuration
    pub signing: SigningConfig,
}

impl AppConfig {
    /// Build the full configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            quota: QuotaConfig::from_env(),
            signing: SigningConfig::from_env(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            quota: QuotaConfig::default(),
            signing: SigningConfig::default(),
        }
    }
}
