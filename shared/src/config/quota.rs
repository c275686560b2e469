//! Realm quota configuration module

use serde::{Deserialize, Serialize};

/// Configuration for realm abuse-prevention quotas
///
/// Quota keys are derived per realm with an HMAC over the realm identity,
/// so realm IDs never appear in the limiter backend. When `enforce` is off,
/// exhausted quotas are logged but requests are allowed through; this is a
/// deliberate soft-enforcement mode used while monitoring a new rollout.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuotaConfig {
    /// Enforce quota exhaustion as an error (429). When false, exhaustion
    /// is only logged and the request proceeds.
    #[serde(default = "default_enforce")]
    pub enforce: bool,

    /// Deployment-wide secret used to derive per-realm quota keys (hex or
    /// raw string, HMAC-SHA256 key material)
    pub key_derivation_secret: String,

    /// Units granted per realm per window
    #[serde(default = "default_limit")]
    pub limit: u64,

    /// Quota window in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            enforce: default_enforce(),
            key_derivation_secret: String::new(),
            limit: default_limit(),
            window_seconds: default_window_seconds(),
        }
    }
}

impl QuotaConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let enforce = std::env::var("QUOTA_ENFORCE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or_else(|_| default_enforce());
        let key_derivation_secret = std::env::var("QUOTA_KEY_SECRET").unwrap_or_default();
        let limit = std::env::var("QUOTA_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_limit);
        let window_seconds = std::env::var("QUOTA_WINDOW_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_window_seconds);

        Self {
            enforce,
            key_derivation_secret,
            limit,
            window_seconds,
        }
    }
}

fn default_enforce() -> bool {
    true
}

fn default_limit() -> u64 {
    100
}

fn default_window_seconds() -> u64 {
    86_400 // one day
}
