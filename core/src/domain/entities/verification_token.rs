//! Verification token entity, issued when a code is redeemed.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::TestType;

/// Long-lived credential created exactly once per successful redemption
///
/// The token id doubles as the JWT `jti` claim. Re-creation for the same
/// code is prevented by the code's `claimed` flag, flipped in the same
/// transaction that inserts this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationToken {
    /// Unique identifier, also the JWT `jti`
    pub id: Uuid,

    /// Realm the redeemed code belonged to
    pub realm_id: Uuid,

    /// Test type carried over from the code
    pub test_type: TestType,

    /// Symptom date carried over from the code
    pub symptom_date: Option<NaiveDate>,

    /// Test date carried over from the code
    pub test_date: Option<NaiveDate>,

    /// Opaque subject string, `testtype.symptomdate.testdate`
    pub subject: String,

    /// Token expiry
    pub expires_at: DateTime<Utc>,

    /// Timestamp when the token was created
    pub created_at: DateTime<Utc>,
}

impl VerificationToken {
    /// Build a token from a redeemed code's attributes
    pub fn new(
        realm_id: Uuid,
        test_type: TestType,
        symptom_date: Option<NaiveDate>,
        test_date: Option<NaiveDate>,
        duration: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            realm_id,
            test_type,
            symptom_date,
            test_date,
            subject: Self::format_subject(test_type, symptom_date, test_date),
            expires_at: now + duration,
            created_at: now,
        }
    }

    /// Opaque subject string derived from the code's attributes
    ///
    /// Absent dates render as empty segments so the downstream certificate
    /// issuer can split on `.` unconditionally.
    pub fn format_subject(
        test_type: TestType,
        symptom_date: Option<NaiveDate>,
        test_date: Option<NaiveDate>,
    ) -> String {
        format!(
            "{}.{}.{}",
            test_type,
            symptom_date.map(|d| d.to_string()).unwrap_or_default(),
            test_date.map(|d| d.to_string()).unwrap_or_default(),
        )
    }

    /// Whether the token has expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_format_with_dates() {
        let symptom = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let subject = VerificationToken::format_subject(TestType::Confirmed, Some(symptom), None);
        assert_eq!(subject, "confirmed.2025-03-14.");
    }

    #[test]
    fn test_subject_format_without_dates() {
        let subject = VerificationToken::format_subject(TestType::Likely, None, None);
        assert_eq!(subject, "likely..");
    }

    #[test]
    fn test_new_token_expiry() {
        let token = VerificationToken::new(
            Uuid::new_v4(),
            TestType::Negative,
            None,
            None,
            Duration::hours(24),
        );
        assert!(!token.is_expired(Utc::now()));
        assert!(token.is_expired(Utc::now() + Duration::hours(25)));
        assert_eq!(token.subject, "negative..");
    }
}
