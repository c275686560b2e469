//! In-memory implementation of QuotaLimiter for testing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::errors::QuotaError;

use super::{QuotaLimiter, QuotaTake};

/// Counting quota limiter with a fixed window limit
pub struct MockQuotaLimiter {
    limit: u64,
    taken: AtomicU64,
    fail: AtomicBool,
}

impl MockQuotaLimiter {
    /// Create a limiter that grants at most `limit` takes
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit,
            taken: AtomicU64::new(0),
            fail: AtomicBool::new(false),
        }
    }

    /// Create a limiter that never runs out
    pub fn unlimited() -> Self {
        Self::with_limit(u64::MAX)
    }

    /// Make every subsequent take fail with a backend error
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Units taken so far, granted or not
    pub fn takes(&self) -> u64 {
        self.taken.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuotaLimiter for MockQuotaLimiter {
    async fn take(&self, _key: &str) -> Result<QuotaTake, QuotaError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(QuotaError::Backend {
                message: "mock limiter failure".to_string(),
            });
        }
        let used = self.taken.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(QuotaTake {
            granted: used <= self.limit,
            remaining: self.limit.saturating_sub(used),
            reset_at: Utc::now() + Duration::hours(24),
        })
    }
}
