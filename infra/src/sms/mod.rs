//! SMS delivery implementations.
//!
//! The provider is chosen once at startup from `SMS_PROVIDER`; deployments
//! without one run with no sender, and the issuance engine rejects
//! phone-bearing requests up front.

pub mod logging;
pub mod twilio;

pub use logging::LoggingSmsSender;
pub use twilio::{TwilioConfig, TwilioSmsSender};

use std::sync::Arc;

use cv_core::services::sms::SmsSender;

use crate::InfrastructureError;

/// Build the configured SMS sender, if any
///
/// `SMS_PROVIDER` selects `twilio` (credentials from `TWILIO_*` variables)
/// or `logging` (messages written to the log, for development). Unset or
/// `none` disables delivery entirely.
pub fn create_sms_sender() -> Result<Option<Arc<dyn SmsSender>>, InfrastructureError> {
    match std::env::var("SMS_PROVIDER").ok().as_deref() {
        Some("twilio") => Ok(Some(Arc::new(TwilioSmsSender::from_env()?))),
        Some("logging") => Ok(Some(Arc::new(LoggingSmsSender::new()))),
        None | Some("") | Some("none") => Ok(None),
        Some(other) => Err(InfrastructureError::Config(format!(
            "unknown SMS provider: {other}"
        ))),
    }
}
