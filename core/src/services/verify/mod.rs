//! Code verification and token exchange engine.

mod signer;

#[cfg(test)]
mod tests;

pub use signer::{Es256Signer, TokenClaims, TokenSigner};

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::domain::value_objects::{TestType, TestTypeSet};
use crate::errors::{VerifyError, VerifyResult};
use crate::repositories::CodeRepository;

/// Token issuance parameters, fixed per deployment
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// JWT `iss` claim
    pub issuer: String,
    /// JWT `aud` claim
    pub audience: String,
    /// Token lifetime in minutes
    pub token_duration_minutes: i64,
}

impl TokenConfig {
    /// Token lifetime
    pub fn token_duration(&self) -> Duration {
        Duration::minutes(self.token_duration_minutes)
    }
}

/// Result of a successful code redemption
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedCode {
    /// Test type the code attested to
    pub test_type: TestType,
    /// Symptom date carried over from the code
    pub symptom_date: Option<NaiveDate>,
    /// Test date carried over from the code
    pub test_date: Option<NaiveDate>,
    /// Signed verification token, compact JWT
    pub token: String,
    /// When the token expires
    pub token_expires_at: DateTime<Utc>,
}

/// Exchanges verification codes for signed tokens
///
/// Redemption atomicity lives in the repository: `redeem` claims the code
/// and creates the token record in one transactional unit, so concurrent
/// exchanges of the same code yield exactly one success. Signing happens
/// after the claim; a signing failure therefore burns the code, which is
/// the accepted trade against double issuance.
pub struct VerifyService<C, K>
where
    C: CodeRepository,
    K: TokenSigner,
{
    codes: Arc<C>,
    signer: Arc<K>,
    config: TokenConfig,
}

impl<C, K> VerifyService<C, K>
where
    C: CodeRepository,
    K: TokenSigner,
{
    /// Create a new verification service
    pub fn new(codes: Arc<C>, signer: Arc<K>, config: TokenConfig) -> Self {
        Self {
            codes,
            signer,
            config,
        }
    }

    /// Redeem a code and sign its verification token
    ///
    /// # Arguments
    /// * `realm_id` - Realm of the calling API key
    /// * `code` - Short or long code value, whitespace-tolerant
    /// * `accepted` - Test types the caller is willing to receive
    ///
    /// # Returns
    /// * `Ok(VerifiedCode)` - Code claimed, token signed
    /// * `Err(VerifyError)` - Not found, expired, already used, test type
    ///   not accepted, or a storage/signing failure
    pub async fn verify_and_issue_token(
        &self,
        realm_id: Uuid,
        code: &str,
        accepted: &TestTypeSet,
    ) -> VerifyResult<VerifiedCode> {
        let code = code.trim();
        if code.is_empty() {
            return Err(VerifyError::NotFound);
        }

        let token = self
            .codes
            .redeem(realm_id, code, accepted, self.config.token_duration())
            .await?;

        let claims = TokenClaims {
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: token.expires_at.timestamp(),
            iat: token.created_at.timestamp(),
            jti: token.id.to_string(),
            sub: token.subject.clone(),
        };
        let jwt = self.signer.sign(&claims)?;

        info!(
            %realm_id,
            token_id = %token.id,
            key_id = self.signer.key_id(),
            "verification code exchanged for token"
        );

        Ok(VerifiedCode {
            test_type: token.test_type,
            symptom_date: token.symptom_date,
            test_date: token.test_date,
            token: jwt,
            token_expires_at: token.expires_at,
        })
    }
}
