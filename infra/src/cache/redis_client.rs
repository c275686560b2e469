//! Redis connection management.

use std::time::Duration;

use redis::aio::MultiplexedConnection;
use tracing::info;

use cv_shared::config::CacheConfig;

use crate::InfrastructureError;

/// Shared Redis connection
///
/// Wraps a multiplexed async connection; cheap to clone and safe to share
/// across request handlers.
#[derive(Clone)]
pub struct RedisClient {
    conn: MultiplexedConnection,
}

impl RedisClient {
    /// Connect to Redis with the configured timeout
    pub async fn connect(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        let client = redis::Client::open(config.url.as_str())?;
        let conn = tokio::time::timeout(
            Duration::from_secs(config.connect_timeout),
            client.get_multiplexed_tokio_connection(),
        )
        .await
        .map_err(|_| {
            InfrastructureError::Config(format!(
                "redis connection timed out after {}s",
                config.connect_timeout
            ))
        })??;

        info!("redis connection established");
        Ok(Self { conn })
    }

    /// A clone of the underlying connection
    pub fn connection(&self) -> MultiplexedConnection {
        self.conn.clone()
    }

    /// Round-trip the server to confirm the connection is usable
    pub async fn ping(&self) -> Result<(), InfrastructureError> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await?;
        Ok(())
    }
}
