//! Twilio SMS sender.
//!
//! Implements the core `SmsSender` seam over the Twilio API with E.164
//! validation and bounded retry on rate-limit and server errors. Phone
//! numbers are masked in every log line.

use async_trait::async_trait;
use phonenumber::{Mode, PhoneNumber};
use std::time::Duration;
use tracing::{debug, info, warn};
use twilio::{Client, OutboundMessage};

use cv_core::errors::SmsError;
use cv_core::services::sms::SmsSender;
use cv_shared::phone::mask_phone;

use crate::InfrastructureError;

/// Twilio SMS service configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// From phone number (must be a Twilio phone number)
    pub from_number: String,
    /// Maximum attempts for retryable failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds, doubled per attempt
    pub retry_delay_ms: u64,
}

impl TwilioConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID")
            .map_err(|_| InfrastructureError::Config("TWILIO_ACCOUNT_SID not set".to_string()))?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN")
            .map_err(|_| InfrastructureError::Config("TWILIO_AUTH_TOKEN not set".to_string()))?;
        let from_number = std::env::var("TWILIO_FROM_NUMBER")
            .map_err(|_| InfrastructureError::Config("TWILIO_FROM_NUMBER not set".to_string()))?;

        if !from_number.starts_with('+') {
            return Err(InfrastructureError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        Ok(Self {
            account_sid,
            auth_token,
            from_number,
            max_retries: std::env::var("TWILIO_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: std::env::var("TWILIO_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
        })
    }
}

/// Twilio implementation of the SmsSender seam
pub struct TwilioSmsSender {
    client: Client,
    config: TwilioConfig,
}

impl TwilioSmsSender {
    /// Create a new Twilio sender
    pub fn new(config: TwilioConfig) -> Self {
        let client = Client::new(&config.account_sid, &config.auth_token);
        info!(
            from = %mask_phone(&config.from_number),
            "twilio sms sender initialized"
        );
        Self { client, config }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Ok(Self::new(TwilioConfig::from_env()?))
    }
}

/// Validate and normalize a destination number to E.164
fn normalize_phone(phone: &str) -> Result<String, SmsError> {
    if !phone.starts_with('+') {
        return Err(SmsError::Delivery {
            message: "phone number must be in E.164 format (e.g. +14155552671)".to_string(),
        });
    }
    match phone.parse::<PhoneNumber>() {
        Ok(parsed) => Ok(parsed.format().mode(Mode::E164).to_string()),
        Err(e) => Err(SmsError::Delivery {
            message: format!("invalid phone number: {e}"),
        }),
    }
}

/// Whether a Twilio failure is worth retrying
fn is_retryable(message: &str) -> bool {
    message.contains("429")
        || message.contains("rate")
        || message.contains("500")
        || message.contains("502")
        || message.contains("503")
        || message.contains("504")
}

#[async_trait]
impl SmsSender for TwilioSmsSender {
    async fn send(&self, to: &str, message: &str) -> Result<(), SmsError> {
        let to = normalize_phone(to)?;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        for attempt in 1..=self.config.max_retries.max(1) {
            debug!(
                attempt,
                to = %mask_phone(&to),
                "sending sms via twilio"
            );
            let outbound = OutboundMessage::new(&self.config.from_number, &to, message);
            match self.client.send_message(outbound).await {
                Ok(response) => {
                    info!(
                        to = %mask_phone(&to),
                        sid = %response.sid,
                        "sms delivered"
                    );
                    return Ok(());
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    if attempt >= self.config.max_retries || !is_retryable(&error_msg) {
                        return Err(SmsError::Delivery { message: error_msg });
                    }
                    warn!(
                        attempt,
                        to = %mask_phone(&to),
                        delay_ms = delay.as_millis() as u64,
                        "retryable twilio failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
        // max_retries >= 1 makes the loop return before reaching here
        Err(SmsError::Delivery {
            message: "sms retries exhausted".to_string(),
        })
    }

    fn provider_name(&self) -> &str {
        "twilio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_valid_e164() {
        assert_eq!(normalize_phone("+14155552671").unwrap(), "+14155552671");
    }

    #[test]
    fn test_normalize_rejects_missing_plus() {
        assert!(normalize_phone("4155552671").is_err());
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_phone("+notanumber").is_err());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable("HTTP 429 Too Many Requests"));
        assert!(is_retryable("server error: 503"));
        assert!(!is_retryable("HTTP 400 invalid 'To' number"));
    }
}
