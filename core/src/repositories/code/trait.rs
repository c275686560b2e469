//! Code repository trait defining the interface for verification code persistence.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::{VerificationCode, VerificationToken};
use crate::domain::value_objects::TestTypeSet;
use crate::errors::{RedeemError, StoreError};

/// Repository trait for verification code persistence
///
/// Implementations enforce three unique indexes — short code, long code,
/// and (realm, request UUID) — and report violations as
/// `StoreError::Constraint` with the index that fired. The indexes are the
/// only concurrency control for code collisions; the issuance engine's
/// retry loop compensates for race losses.
#[async_trait]
pub trait CodeRepository: Send + Sync {
    /// Persist a new verification code
    ///
    /// # Returns
    /// * `Ok(())` - Row inserted
    /// * `Err(StoreError::Constraint(_))` - A unique index was violated
    /// * `Err(StoreError::Storage { .. })` - Infrastructure failure
    async fn insert(&self, code: &VerificationCode) -> Result<(), StoreError>;

    /// Find a code by its idempotency UUID within a realm
    async fn find_by_request_uuid(
        &self,
        realm_id: Uuid,
        request_uuid: Uuid,
    ) -> Result<Option<VerificationCode>, StoreError>;

    /// Find a code by its short or long value within a realm
    async fn find_by_code(
        &self,
        realm_id: Uuid,
        code: &str,
    ) -> Result<Option<VerificationCode>, StoreError>;

    /// Hard-delete a code row (compensation after failed SMS delivery)
    ///
    /// # Returns
    /// * `Ok(true)` - Row deleted
    /// * `Ok(false)` - No row with that id
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Hard-delete unclaimed rows whose long expiry passed before `before`
    ///
    /// Keeps the uniqueness invariant meaningful ("unique among non-expired,
    /// non-deleted"). Scheduled by the surrounding deployment, not by this
    /// core.
    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Atomically redeem a code and create its verification token
    ///
    /// Locates the code by short or long value within the realm, checks the
    /// applicable expiry, the `claimed` flag and the caller's accepted test
    /// types, then flips `claimed` and inserts the token row — all as one
    /// transactional unit. Concurrent redemptions of the same code must
    /// yield exactly one success.
    ///
    /// # Returns
    /// * `Ok(VerificationToken)` - Code claimed, token created
    /// * `Err(RedeemError)` - One of the four client-visible failure kinds,
    ///   or a wrapped storage failure
    async fn redeem(
        &self,
        realm_id: Uuid,
        code: &str,
        accepted: &TestTypeSet,
        token_duration: Duration,
    ) -> Result<VerificationToken, RedeemError>;
}
