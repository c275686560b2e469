//! In-memory implementation of CodeRepository for testing.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{VerificationCode, VerificationToken};
use crate::domain::value_objects::TestTypeSet;
use crate::errors::{CodeConstraint, RedeemError, StoreError};

use super::trait_::CodeRepository;

/// In-memory code repository emulating the MySQL unique indexes
///
/// All writes go through a single `RwLock`, which gives `redeem` the same
/// at-most-once guarantee the production transaction gives.
pub struct MockCodeRepository {
    codes: Arc<RwLock<HashMap<Uuid, VerificationCode>>>,
    tokens: Arc<RwLock<Vec<VerificationToken>>>,
    fail: AtomicBool,
}

impl MockCodeRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self {
            codes: Arc::new(RwLock::new(HashMap::new())),
            tokens: Arc::new(RwLock::new(Vec::new())),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent operation fail with a storage error
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of stored code rows
    pub async fn code_count(&self) -> usize {
        self.codes.read().await.len()
    }

    /// Snapshot of issued tokens
    pub async fn tokens(&self) -> Vec<VerificationToken> {
        self.tokens.read().await.clone()
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Storage {
                message: "mock storage failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MockCodeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CodeRepository for MockCodeRepository {
    async fn insert(&self, code: &VerificationCode) -> Result<(), StoreError> {
        self.check_failure()?;
        let mut codes = self.codes.write().await;

        // Same precedence as the MySQL indexes: request UUID first, then
        // the code values.
        if codes
            .values()
            .any(|c| c.realm_id == code.realm_id && c.request_uuid == code.request_uuid)
        {
            return Err(StoreError::Constraint(CodeConstraint::RequestUuid));
        }
        if codes.values().any(|c| c.code == code.code) {
            return Err(StoreError::Constraint(CodeConstraint::ShortCode));
        }
        if codes.values().any(|c| c.long_code == code.long_code) {
            return Err(StoreError::Constraint(CodeConstraint::LongCode));
        }

        codes.insert(code.id, code.clone());
        Ok(())
    }

    async fn find_by_request_uuid(
        &self,
        realm_id: Uuid,
        request_uuid: Uuid,
    ) -> Result<Option<VerificationCode>, StoreError> {
        self.check_failure()?;
        let codes = self.codes.read().await;
        Ok(codes
            .values()
            .find(|c| c.realm_id == realm_id && c.request_uuid == request_uuid)
            .cloned())
    }

    async fn find_by_code(
        &self,
        realm_id: Uuid,
        code: &str,
    ) -> Result<Option<VerificationCode>, StoreError> {
        self.check_failure()?;
        let codes = self.codes.read().await;
        Ok(codes
            .values()
            .find(|c| c.realm_id == realm_id && (c.code == code || c.long_code == code))
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check_failure()?;
        let mut codes = self.codes.write().await;
        Ok(codes.remove(&id).is_some())
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        self.check_failure()?;
        let mut codes = self.codes.write().await;
        let initial = codes.len();
        codes.retain(|_, c| c.claimed || c.long_expires_at >= before);
        Ok((initial - codes.len()) as u64)
    }

    async fn redeem(
        &self,
        realm_id: Uuid,
        code: &str,
        accepted: &TestTypeSet,
        token_duration: Duration,
    ) -> Result<VerificationToken, RedeemError> {
        self.check_failure().map_err(RedeemError::Store)?;

        // The write lock spans find + checks + claim + token insert,
        // mirroring the production SELECT ... FOR UPDATE transaction.
        let mut codes = self.codes.write().await;

        let row = codes
            .values_mut()
            .find(|c| c.realm_id == realm_id && (c.code == code || c.long_code == code))
            .ok_or(RedeemError::NotFound)?;

        let now = Utc::now();
        if now > row.applicable_expiry(code) {
            return Err(RedeemError::Expired);
        }
        if row.claimed {
            return Err(RedeemError::AlreadyUsed);
        }
        if !accepted.contains(row.test_type) {
            return Err(RedeemError::UnsupportedTestType);
        }

        row.claimed = true;
        let token = VerificationToken::new(
            row.realm_id,
            row.test_type,
            row.symptom_date,
            row.test_date,
            token_duration,
        );
        self.tokens.write().await.push(token.clone());
        Ok(token)
    }
}
