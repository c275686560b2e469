//! Verification/exchange engine error types.

use thiserror::Error;

use super::codes;
use super::types::{SigningError, StoreError};
use super::Blame;

/// Failure modes of the atomic redemption step
///
/// Returned by `CodeRepository::redeem`; the distinction between the four
/// client-visible kinds is part of the API contract.
#[derive(Error, Debug)]
pub enum RedeemError {
    #[error("code not found")]
    NotFound,

    #[error("code expired")]
    Expired,

    #[error("code already used")]
    AlreadyUsed,

    #[error("test type not accepted by caller")]
    UnsupportedTestType,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure modes of `VerifyService::verify_and_issue_token`
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("code not found")]
    NotFound,

    #[error("code expired")]
    Expired,

    #[error("code already used")]
    AlreadyUsed,

    #[error("test type not accepted by caller")]
    UnsupportedTestType,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}

impl From<RedeemError> for VerifyError {
    fn from(err: RedeemError) -> Self {
        match err {
            RedeemError::NotFound => VerifyError::NotFound,
            RedeemError::Expired => VerifyError::Expired,
            RedeemError::AlreadyUsed => VerifyError::AlreadyUsed,
            RedeemError::UnsupportedTestType => VerifyError::UnsupportedTestType,
            RedeemError::Store(e) => VerifyError::Store(e),
        }
    }
}

impl VerifyError {
    /// HTTP status the API layer should respond with
    pub fn http_status(&self) -> u16 {
        match self {
            VerifyError::NotFound | VerifyError::Expired | VerifyError::AlreadyUsed => 400,
            VerifyError::UnsupportedTestType => 412,
            VerifyError::Store(_) | VerifyError::Signing(_) => 500,
        }
    }

    /// Stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            VerifyError::NotFound => codes::CODE_NOT_FOUND,
            VerifyError::Expired => codes::CODE_EXPIRED,
            VerifyError::AlreadyUsed => codes::CODE_USED,
            VerifyError::UnsupportedTestType => codes::UNSUPPORTED_TEST_TYPE,
            VerifyError::Signing(_) => codes::TOKEN_SIGNING_FAILED,
            VerifyError::Store(_) => codes::INTERNAL_SERVER_ERROR,
        }
    }

    /// Observability classification for this failure
    pub fn blame(&self) -> Blame {
        match self {
            VerifyError::Store(_) | VerifyError::Signing(_) => Blame::Server,
            _ => Blame::Client,
        }
    }

    /// Message safe to return to the caller
    ///
    /// Signing failures in particular must not leak key material or paths.
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
    fn test_status_mapping() {
        assert_eq!(VerifyError::NotFound.http_status(), 400);
        assert_eq!(VerifyError::Expired.http_status(), 400);
        assert_eq!(VerifyError::AlreadyUsed.http_status(), 400);
        assert_eq!(VerifyError::UnsupportedTestType.http_status(), 412);
    }

    #[test]
    fn test_signing_failure_is_generic_to_clients() {
        let err = VerifyError::Signing(SigningError::KeyUnavailable {
            message: "/etc/keys/es256-v2.pem: permission denied".to_string(),
        });
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.error_code(), "token_signing_failed");
        assert_eq!(err.blame(), Blame::Server);
        assert!(!err.public_message().contains("pem"));
    }

    #[test]
    fn test_redeem_to_verify_conversion() {
        let err: VerifyError = RedeemError::AlreadyUsed.into();
        assert_eq!(err.error_code(), "code_used");
    }
}
