//! MySQL connection pool management.

use std::time::Duration;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::info;

use cv_shared::config::DatabaseConfig;

use crate::InfrastructureError;

/// Wrapper around the SQLx MySQL pool
///
/// Cheap to clone; all repository implementations share one pool.
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
}

impl DatabasePool {
    /// Connect to MySQL with the configured pool limits
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, InfrastructureError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .connect(&config.url)
            .await?;

        info!(
            max_connections = config.max_connections,
            "database pool established"
        );
        Ok(Self { pool })
    }

    /// The underlying pool, for repository construction
    pub fn pool(&self) -> MySqlPool {
        self.pool.clone()
    }

    /// Round-trip the database to confirm the pool is usable
    pub async fn health_check(&self) -> Result<(), InfrastructureError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
