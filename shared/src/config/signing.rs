//! Token signing configuration module

use serde::{Deserialize, Serialize};

/// Configuration for ES256 verification-token signing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SigningConfig {
    /// Identifier of the active signing key, emitted as the JWT `kid` header
    pub active_key_id: String,

    /// Path to the PEM-encoded EC P-256 private key
    pub private_key_path: String,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Verification token lifetime in minutes
    #[serde(default = "default_token_duration_minutes")]
    pub token_duration_minutes: i64,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            active_key_id: String::from("v1"),
            private_key_path: String::from("keys/token-signing.pem"),
            issuer: String::from("codeverify"),
            audience: String::from("codeverify"),
            token_duration_minutes: default_token_duration_minutes(),
        }
    }
}

impl SigningConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let active_key_id =
            std::env::var("SIGNING_KEY_ID").unwrap_or_else(|_| "v1".to_string());
        let private_key_path = std::env::var("SIGNING_PRIVATE_KEY_PATH")
            .unwrap_or_else(|_| "keys/token-signing.pem".to_string());
        let issuer = std::env::var("TOKEN_ISSUER").unwrap_or_else(|_| "codeverify".to_string());
        let audience =
            std::env::var("TOKEN_AUDIENCE").unwrap_or_else(|_| "codeverify".to_string());
        let token_duration_minutes = std::env::var("TOKEN_DURATION_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_token_duration_minutes);

        Self {
            active_key_id,
            private_key_path,
            issuer,
            audience,
            token_duration_minutes,
        }
    }
}

fn default_token_duration_minutes() -> i64 {
    24 * 60
}
