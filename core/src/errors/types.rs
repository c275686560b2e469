//! Error types for the engines' external collaborators.
//!
//! Persistence, quota, SMS and signing failures each get their own enum so
//! the engines can map them to HTTP behavior without inspecting error text.

use thiserror::Error;

/// Unique index the persistence layer reports a violation for
///
/// Infrastructure maps the database driver's duplicate-key error to one of
/// these exactly once; the engines never substring-match storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeConstraint {
    /// Short code collided with a live row
    ShortCode,
    /// Long code collided with a live row
    LongCode,
    /// Request UUID already present in the realm
    RequestUuid,
}

/// Persistence-layer errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated: {0:?}")]
    Constraint(CodeConstraint),

    #[error("record not found")]
    NotFound,

    #[error("storage failure: {message}")]
    Storage { message: String },
}

/// Quota limiter infrastructure errors
#[derive(Error, Debug)]
pub enum QuotaError {
    #[error("quota backend failure: {message}")]
    Backend { message: String },
}

/// SMS provider errors
///
/// Provider error strings may echo the destination number; they must be
/// scrubbed before logging (see `services::sms::scrub_phone`).
#[derive(Error, Debug)]
pub enum SmsError {
    #[error("sms delivery failed: {message}")]
    Delivery { message: String },
}

/// Token signer errors
///
/// Never surfaced verbatim to clients: the message may reference key files
/// or key-management internals.
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("signing key unavailable: {message}")]
    KeyUnavailable { message: String },

    #[error("token signing failed: {message}")]
    Signing { message: String },
}
