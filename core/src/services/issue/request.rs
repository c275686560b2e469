//! Issuance request and result value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One code issuance request, as handed to the engine
///
/// String fields arrive raw from the wire; the engine owns their semantic
/// validation (test type set membership, date parsing, UUID sanitizing).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueRequest {
    /// Raw test type string, validated case-insensitively
    pub test_type: String,

    /// Optional symptom onset date, `YYYY-MM-DD`
    pub symptom_date: Option<String>,

    /// Optional test date, `YYYY-MM-DD`
    pub test_date: Option<String>,

    /// Client timezone offset in minutes, applied when computing "today"
    pub tz_offset_minutes: i32,

    /// Optional destination phone number for SMS delivery
    pub phone: Option<String>,

    /// Optional client-supplied idempotency UUID
    pub request_uuid: Option<String>,

    /// Optional external issuer reference carried through to the record
    pub external_issuer_id: Option<String>,

    /// Optional label selecting an alternate realm SMS template
    pub sms_template_label: Option<String>,
}

impl IssueRequest {
    /// Convenience constructor for the common fields
    pub fn new(test_type: impl Into<String>) -> Self {
        Self {
            test_type: test_type.into(),
            ..Default::default()
        }
    }

    /// The phone number, if present and non-empty
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

/// Reference to a successfully persisted code, returned by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedCode {
    /// Row id of the persisted code
    pub id: Uuid,

    /// Idempotency UUID (client-supplied or server-generated)
    pub request_uuid: Uuid,

    /// Short code value
    pub code: String,

    /// Long code value
    pub long_code: String,

    /// Short code expiry
    pub expires_at: DateTime<Utc>,

    /// Long code expiry
    pub long_expires_at: DateTime<Utc>,

    /// Destination phone, when SMS delivery was requested
    pub phone: Option<String>,

    /// Template label requested for delivery
    pub sms_template_label: Option<String>,
}
