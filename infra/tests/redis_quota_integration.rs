//! Redis quota limiter integration tests.
//!
//! Require a live Redis at `REDIS_URL` (default localhost); run with
//! `cargo test -p cv_infra -- --ignored`.

use cv_core::services::quota::QuotaLimiter;
use cv_infra::cache::{RedisClient, RedisQuotaLimiter};
use cv_shared::config::{CacheConfig, QuotaConfig};
use uuid::Uuid;

async fn limiter(limit: u64, window_seconds: u64) -> RedisQuotaLimiter {
    let client = RedisClient::connect(&CacheConfig::from_env())
        .await
        .expect("redis must be reachable for ignored integration tests");
    RedisQuotaLimiter::new(
        client,
        &QuotaConfig {
            limit,
            window_seconds,
            ..QuotaConfig::default()
        },
    )
}

fn unique_key() -> String {
    format!("realm:test-{}", Uuid::new_v4())
}

#[tokio::test]
#[ignore]
async fn test_takes_within_limit_are_granted() {
    let limiter = limiter(3, 60).await;
    let key = unique_key();

    for expected_remaining in [2u64, 1, 0] {
        let take = limiter.take(&key).await.unwrap();
        assert!(take.granted);
        assert_eq!(take.remaining, expected_remaining);
    }

    let take = limiter.take(&key).await.unwrap();
    assert!(!take.granted);
    assert_eq!(take.remaining, 0);
}

#[tokio::test]
#[ignore]
async fn test_window_reset_restores_quota() {
    let limiter = limiter(1, 1).await;
    let key = unique_key();

    assert!(limiter.take(&key).await.unwrap().granted);
    assert!(!limiter.take(&key).await.unwrap().granted);

    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    assert!(limiter.take(&key).await.unwrap().granted);
}

#[tokio::test]
#[ignore]
async fn test_keys_are_independent() {
    let limiter = limiter(1, 60).await;
    let a = unique_key();
    let b = unique_key();

    assert!(limiter.take(&a).await.unwrap().granted);
    assert!(!limiter.take(&a).await.unwrap().granted);
    assert!(limiter.take(&b).await.unwrap().granted);
}
