//! Verification code entity, the central record of the issuance pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Actor, TestType};

/// A short-lived one-time verification code attesting to a test result
///
/// Short and long code are two handles on the same record: the short code is
/// read to a patient over the phone, the long code is embedded in SMS links.
/// Uniqueness of both (and of `request_uuid` per realm) is enforced by the
/// persistence layer's unique indexes, not by in-process locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Unique identifier for the record
    pub id: Uuid,

    /// Realm this code belongs to
    pub realm_id: Uuid,

    /// Short, human-readable code
    pub code: String,

    /// Longer alphanumeric code for SMS links
    pub long_code: String,

    /// Test type being attested
    pub test_type: TestType,

    /// Onset-of-symptoms date, if provided
    pub symptom_date: Option<NaiveDate>,

    /// Test date, if provided
    pub test_date: Option<NaiveDate>,

    /// When the short code stops being redeemable
    pub expires_at: DateTime<Utc>,

    /// When the long code stops being redeemable
    pub long_expires_at: DateTime<Utc>,

    /// Whether the code has been exchanged for a token
    pub claimed: bool,

    /// Who issued the code
    pub issuing_actor: Actor,

    /// Caller-supplied external issuer reference, if any
    pub issuing_external_id: Option<String>,

    /// Idempotency UUID, unique per realm
    pub request_uuid: Uuid,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    /// Whether the short code has expired at `now`
    pub fn short_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the long code has expired at `now`
    pub fn long_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.long_expires_at
    }

    /// Expiry that applies when the record was located by `value`
    ///
    /// The two codes share one row but carry different lifetimes; redemption
    /// checks the lifetime of whichever handle the caller presented.
    pub fn applicable_expiry(&self, value: &str) -> DateTime<Utc> {
        if value == self.long_code {
            self.long_expires_at
        } else {
            self.expires_at
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_code() -> VerificationCode {
        let now = Utc::now();
        VerificationCode {
            id: Uuid::new_v4(),
            realm_id: Uuid::new_v4(),
            code: "12345678".to_string(),
            long_code: "ABCDEFGH12345678".to_string(),
            test_type: TestType::Confirmed,
            symptom_date: None,
            test_date: None,
            expires_at: now + Duration::minutes(15),
            long_expires_at: now + Duration::hours(24),
            claimed: false,
            issuing_actor: Actor::System,
            issuing_external_id: None,
            request_uuid: Uuid::new_v4(),
            created_at: now,
        }
    }

    #[test]
    fn test_expiry_checks() {
        let code = sample_code();
        let now = Utc::now();
        assert!(!code.short_expired(now));
        assert!(!code.long_expired(now));
        assert!(code.short_expired(now + Duration::minutes(16)));
        assert!(!code.long_expired(now + Duration::minutes(16)));
        assert!(code.long_expired(now + Duration::hours(25)));
    }

    #[test]
    fn test_applicable_expiry_picks_handle() {
        let code = sample_code();
        assert_eq!(code.applicable_expiry("12345678"), code.expires_at);
        assert_eq!(
            code.applicable_expiry("ABCDEFGH12345678"),
            code.long_expires_at
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        let code = sample_code();
        let json = serde_json::to_string(&code).unwrap();
        let back: VerificationCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
