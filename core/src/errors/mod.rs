//! Typed errors for the issuance and verification engines.
//!
//! Client errors are safe to render verbatim; server errors render a
//! generic message while the detailed cause is logged internally.

pub mod codes;

mod issue;
mod types;
mod verify;

pub use issue::{DateField, IssueError};
pub use types::{CodeConstraint, QuotaError, SigningError, SmsError, StoreError};
pub use verify::{RedeemError, VerifyError};

use serde::{Deserialize, Serialize};

/// Observability classification of a request outcome
///
/// Drives the warn/error log split and the server-fault alerting metrics:
/// a spike in `Server` blame pages someone, a spike in `Client` blame does
/// not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blame {
    /// Successful request, nobody at fault
    None,
    /// The caller sent something invalid or hit a policy limit
    Client,
    /// Our infrastructure failed
    Server,
}

/// Result of one issuance attempt
pub type IssueResult<T> = Result<T, IssueError>;

/// Result of one verification/exchange attempt
pub type VerifyResult<T> = Result<T, VerifyError>;
