//! Issuance engine error type with HTTP status, stable code and blame.

use thiserror::Error;

use super::codes;
use super::types::{QuotaError, StoreError};
use super::Blame;

/// Which date field a validation failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Symptom,
    Test,
}

impl DateField {
    /// Wire name of the field, as it appears in request bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::Symptom => "symptomDate",
            DateField::Test => "testDate",
        }
    }
}

impl std::fmt::Display for DateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure modes of `IssueService::issue`
///
/// Every variant carries an HTTP status, a stable error code, and a blame
/// classification. The blame drives alerting: server-blame failures page,
/// client-blame failures are request noise.
#[derive(Error, Debug)]
pub enum IssueError {
    #[error("a symptom date or test date is required")]
    MissingDate,

    #[error("invalid test type: {value}")]
    InvalidTestType { value: String },

    #[error("test type {value} is not allowed for this realm")]
    UnsupportedTestType { value: String },

    #[error("a phone number was provided but no SMS provider is configured")]
    SmsNotConfigured,

    #[error("{field}: {message}")]
    InvalidDate { field: DateField, message: String },

    #[error("unparsable request: {message}")]
    UnparsableRequest { message: String },

    #[error("a code has already been issued for this request UUID")]
    UuidConflict,

    #[error("realm quota exceeded")]
    QuotaExceeded,

    #[error("batch exceeds the maximum of {max} requests")]
    BatchTooLarge { max: usize },

    #[error("sms delivery failed: {message}")]
    SmsFailure { message: String },

    #[error("could not generate a unique code")]
    CollisionRetriesExhausted,

    #[error("code generation failed: {message}")]
    CodeGeneration { message: String },

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IssueError {
    /// HTTP status the API layer should respond with
    pub fn http_status(&self) -> u16 {
        match self {
            IssueError::MissingDate
            | IssueError::InvalidTestType { .. }
            | IssueError::UnsupportedTestType { .. }
            | IssueError::SmsNotConfigured
            | IssueError::InvalidDate { .. }
            | IssueError::UnparsableRequest { .. }
            | IssueError::BatchTooLarge { .. }
            | IssueError::SmsFailure { .. } => 400,
            IssueError::UuidConflict => 409,
            IssueError::QuotaExceeded => 429,
            IssueError::CollisionRetriesExhausted
            | IssueError::CodeGeneration { .. }
            | IssueError::Quota(_)
            | IssueError::Store(_) => 500,
        }
    }

    /// Stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            IssueError::MissingDate => codes::MISSING_DATE,
            IssueError::InvalidTestType { .. } => codes::INVALID_TEST_TYPE,
            IssueError::UnsupportedTestType { .. } => codes::UNSUPPORTED_TEST_TYPE,
            IssueError::SmsNotConfigured => codes::SMS_NOT_CONFIGURED,
            IssueError::InvalidDate { .. } => codes::INVALID_DATE,
            IssueError::UnparsableRequest { .. } => codes::UNPARSABLE_REQUEST,
            IssueError::UuidConflict => codes::UUID_ALREADY_EXISTS,
            IssueError::QuotaExceeded => codes::QUOTA_EXCEEDED,
            IssueError::BatchTooLarge { .. } => codes::BATCH_TOO_LARGE,
            IssueError::SmsFailure { .. } => codes::SMS_FAILURE,
            IssueError::CollisionRetriesExhausted
            | IssueError::CodeGeneration { .. }
            | IssueError::Quota(_)
            | IssueError::Store(_) => codes::INTERNAL_SERVER_ERROR,
        }
    }

    /// Observability classification for this failure
    pub fn blame(&self) -> Blame {
        match self.http_status() {
            500 => Blame::Server,
            _ => Blame::Client,
        }
    }

    /// Message safe to return to the caller
    ///
    /// Client-blame messages render verbatim; server-blame causes are logged
    /// internally and replaced with a generic message.
    pub fn public_message(&self) -> String {
        match self.blame() {
            Blame::Server => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code_mapping() {
        assert_eq!(IssueError::MissingDate.http_status(), 400);
        assert_eq!(IssueError::MissingDate.error_code(), "missing_date");
        assert_eq!(IssueError::UuidConflict.http_status(), 409);
        assert_eq!(IssueError::UuidConflict.error_code(), "uuid_already_exists");
        assert_eq!(IssueError::QuotaExceeded.http_status(), 429);
        assert_eq!(IssueError::QuotaExceeded.error_code(), "quota_exceeded");
        assert_eq!(IssueError::CollisionRetriesExhausted.http_status(), 500);
    }

    #[test]
    fn test_blame_classification() {
        assert_eq!(IssueError::MissingDate.blame(), Blame::Client);
        assert_eq!(
            IssueError::Store(StoreError::Storage {
                message: "db down".to_string()
            })
            .blame(),
            Blame::Server
        );
    }

    #[test]
    fn test_server_errors_do_not_leak() {
        let err = IssueError::Store(StoreError::Storage {
            message: "mysql driver: table 'codes' is corrupted".to_string(),
        });
        assert_eq!(err.public_message(), "internal server error");

        let client = IssueError::InvalidTestType {
            value: "positive".to_string(),
        };
        assert!(client.public_message().contains("positive"));
    }

    #[test]
    fn test_date_field_wire_names() {
        assert_eq!(DateField::Symptom.as_str(), "symptomDate");
        assert_eq!(DateField::Test.as_str(), "testDate");
    }
}
