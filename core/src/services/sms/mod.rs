//! SMS delivery seam: sender trait, template rendering, PII scrubbing.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SmsError;

/// Matches loosely formatted phone numbers (7+ digits with optional
/// separators) inside provider error text.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\d[\d\s().-]{5,}\d").expect("static regex")
});

/// Provider-agnostic SMS sender
///
/// Implementations live in infrastructure (Twilio, mock). Send failures
/// trigger compensating deletion of the just-created code in the engine.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `message` to `to` (E.164)
    async fn send(&self, to: &str, message: &str) -> Result<(), SmsError>;

    /// Human-readable provider name for logs
    fn provider_name(&self) -> &str;
}

/// Render a realm SMS template
///
/// Supported placeholders: `[code]`, `[longcode]`, `[expires]` (minutes
/// until short expiry), `[longexpires]` (minutes until long expiry).
pub fn render_template(
    template: &str,
    code: &str,
    long_code: &str,
    expires_minutes: i64,
    long_expires_minutes: i64,
) -> String {
    template
        .replace("[code]", code)
        .replace("[longcode]", long_code)
        .replace("[expires]", &expires_minutes.to_string())
        .replace("[longexpires]", &long_expires_minutes.to_string())
}

/// Redact a destination phone number from provider error text
///
/// Some providers echo the destination number back in their error strings;
/// those strings end up in operational logs, so the number is scrubbed
/// first. Redacts both the exact number and any loosely formatted phone
/// pattern, since providers reformat numbers in their messages.
pub fn scrub_phone(text: &str, phone: &str) -> String {
    let exact = text.replace(phone, "[redacted]");
    PHONE_PATTERN.replace_all(&exact, "[redacted]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template_all_placeholders() {
        let rendered = render_template(
            "Code [code] or link [longcode]; valid [expires]m / [longexpires]m",
            "12345678",
            "ABCD1234EFGH5678",
            15,
            1440,
        );
        assert_eq!(
            rendered,
            "Code 12345678 or link ABCD1234EFGH5678; valid 15m / 1440m"
        );
    }

    #[test]
    fn test_render_template_without_placeholders() {
        assert_eq!(
            render_template("static text", "1", "2", 3, 4),
            "static text"
        );
    }

    #[test]
    fn test_scrub_exact_phone() {
        let scrubbed = scrub_phone(
            "The 'To' number +14155552671 is not a valid phone number",
            "+14155552671",
        );
        assert!(!scrubbed.contains("4155552671"));
        assert!(scrubbed.contains("[redacted]"));
    }

    #[test]
    fn test_scrub_reformatted_phone() {
        // Provider reformatted the number; pattern-based redaction still
        // catches it.
        let scrubbed = scrub_phone(
            "Cannot route to (415) 555-2671, unreachable carrier",
            "+14155552671",
        );
        assert!(!scrubbed.contains("555-2671"));
        assert!(scrubbed.contains("[redacted]"));
    }

    #[test]
    fn test_scrub_preserves_non_phone_text() {
        let scrubbed = scrub_phone("HTTP 429 from upstream", "+14155552671");
        assert_eq!(scrubbed, "HTTP 429 from upstream");
    }
}
