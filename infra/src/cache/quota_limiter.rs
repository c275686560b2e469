//! Redis-backed realm quota limiter.
//!
//! One counter per derived quota key, incremented atomically by a Lua
//! script so concurrent takes across processes never lose updates. The
//! counter's TTL is the quota window; when it expires the realm starts a
//! fresh window.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use redis::Script;

use cv_core::errors::QuotaError;
use cv_core::services::quota::{QuotaLimiter, QuotaTake};
use cv_shared::config::QuotaConfig;

use crate::cache::RedisClient;

/// INCR the counter, start the window on first take, report count and TTL.
const TAKE_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
  redis.call('EXPIRE', KEYS[1], ARGV[1])
end
local ttl = redis.call('TTL', KEYS[1])
return {count, ttl}
"#;

/// Redis implementation of QuotaLimiter
pub struct RedisQuotaLimiter {
    client: RedisClient,
    script: Script,
    limit: u64,
    window_seconds: u64,
}

impl RedisQuotaLimiter {
    /// Create a limiter over an established Redis connection
    pub fn new(client: RedisClient, config: &QuotaConfig) -> Self {
        Self {
            client,
            script: Script::new(TAKE_SCRIPT),
            limit: config.limit,
            window_seconds: config.window_seconds,
        }
    }
}

#[async_trait]
impl QuotaLimiter for RedisQuotaLimiter {
    async fn take(&self, key: &str) -> Result<QuotaTake, QuotaError> {
        let mut conn = self.client.connection();
        let (count, ttl): (u64, i64) = self
            .script
            .key(key)
            .arg(self.window_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| QuotaError::Backend {
                message: e.to_string(),
            })?;

        Ok(QuotaTake {
            granted: count <= self.limit,
            remaining: self.limit.saturating_sub(count),
            reset_at: Utc::now() + Duration::seconds(ttl.max(0)),
        })
    }
}
