//! Realm quota limiting: trait seam and quota-key derivation.
//!
//! The limiter itself lives in infrastructure (Redis-backed); the engine
//! consumes it through `QuotaLimiter`. The per-realm counter is shared
//! across processes, so `take` must be atomic in the backend.

pub mod mock;

pub use mock::MockQuotaLimiter;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::errors::QuotaError;

type HmacSha256 = Hmac<Sha256>;

/// Outcome of one quota `take`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaTake {
    /// Whether the unit was granted
    pub granted: bool,
    /// Units remaining in the current window
    pub remaining: u64,
    /// When the window resets
    pub reset_at: DateTime<Utc>,
}

/// Atomic token-bucket-like limiter keyed by derived quota key
#[async_trait]
pub trait QuotaLimiter: Send + Sync {
    /// Attempt to consume one unit for `key`
    ///
    /// # Returns
    /// * `Ok(QuotaTake)` - The take was recorded; `granted` says whether the
    ///   unit fit in the window
    /// * `Err(QuotaError)` - Limiter infrastructure failure
    async fn take(&self, key: &str) -> Result<QuotaTake, QuotaError>;
}

/// Derive the quota key for a realm
///
/// HMAC-SHA256 over the realm id with a deployment-wide secret, so realm
/// identifiers never appear in the limiter backend's keyspace.
pub fn derive_quota_key(secret: &str, realm_id: Uuid) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(realm_id.as_bytes());
    format!("realm:{}", hex::encode(mac.finalize().into_bytes()))
}
