//! Logging SMS sender for development deployments.

use async_trait::async_trait;
use tracing::info;

use cv_core::errors::SmsError;
use cv_core::services::sms::SmsSender;
use cv_shared::phone::mask_phone;

/// Writes outgoing messages to the log instead of sending them
#[derive(Default)]
pub struct LoggingSmsSender;

impl LoggingSmsSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SmsSender for LoggingSmsSender {
    async fn send(&self, to: &str, message: &str) -> Result<(), SmsError> {
        info!(to = %mask_phone(to), message, "sms (logging provider, not delivered)");
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "logging"
    }
}
