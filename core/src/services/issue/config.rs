//! Issuance engine configuration.

use cv_shared::config::QuotaConfig;

/// Configuration for the code issuance engine
#[derive(Debug, Clone)]
pub struct IssueConfig {
    /// How many times to regenerate codes after a uniqueness collision
    pub collision_retry_count: u32,

    /// Whether quota exhaustion blocks issuance (429) or is only logged
    pub enforce_quotas: bool,

    /// Deployment-wide secret for quota-key derivation
    pub quota_key_secret: String,
}

impl IssueConfig {
    /// Build from the shared quota configuration
    pub fn from_quota(quota: &QuotaConfig) -> Self {
        Self {
            collision_retry_count: default_collision_retry_count(),
            enforce_quotas: quota.enforce,
            quota_key_secret: quota.key_derivation_secret.clone(),
        }
    }
}

impl Default for IssueConfig {
    fn default() -> Self {
        Self {
            collision_retry_count: default_collision_retry_count(),
            enforce_quotas: true,
            quota_key_secret: String::new(),
        }
    }
}

fn default_collision_retry_count() -> u32 {
    3
}
