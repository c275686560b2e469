//! Cache module - Redis client and the realm quota limiter.

pub mod quota_limiter;
pub mod redis_client;

pub use quota_limiter::RedisQuotaLimiter;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use cv_shared::config::CacheConfig;
