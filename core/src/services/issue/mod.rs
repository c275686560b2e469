//! Code issuance engine.
//!
//! Validates issuance requests against realm policy, enforces idempotency
//! and quota, generates collision-free code pairs and drives SMS delivery
//! with compensating deletion on failure.

mod batch;
mod config;
mod request;
mod retry;

#[cfg(test)]
mod tests;

pub use batch::{BatchOutcome, MAX_BATCH_SIZE};
pub use config::IssueConfig;
pub use request::{IssueRequest, IssuedCode};

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::entities::{Realm, VerificationCode};
use crate::domain::value_objects::{Actor, TestType};
use crate::errors::{CodeConstraint, DateField, IssueError, IssueResult, StoreError};
use crate::repositories::CodeRepository;
use crate::services::code_generator::{generate_alphanumeric, generate_digits};
use crate::services::quota::{derive_quota_key, QuotaLimiter};
use crate::services::sms::{render_template, scrub_phone, SmsSender};

use retry::{retry_collisions, AttemptOutcome, RetryFailure};

/// Issues verification codes on behalf of a realm
///
/// Generic over its three seams so tests can drive it entirely in memory.
/// The SMS sender is optional at construction; deployments without a
/// provider reject phone-bearing requests up front.
pub struct IssueService<C, Q, S>
where
    C: CodeRepository,
    Q: QuotaLimiter,
    S: SmsSender + ?Sized,
{
    codes: Arc<C>,
    quota: Arc<Q>,
    sms: Option<Arc<S>>,
    config: IssueConfig,
}

impl<C, Q, S> IssueService<C, Q, S>
where
    C: CodeRepository,
    Q: QuotaLimiter,
    S: SmsSender + ?Sized,
{
    /// Create a new issuance service
    pub fn new(codes: Arc<C>, quota: Arc<Q>, sms: Option<Arc<S>>, config: IssueConfig) -> Self {
        Self {
            codes,
            quota,
            sms,
            config,
        }
    }

    /// Issue one verification code and deliver it if a phone was given
    ///
    /// # Arguments
    /// * `realm` - Policy of the calling realm
    /// * `actor` - Who is issuing (API app, user, or system)
    /// * `request` - The raw issuance request
    ///
    /// # Returns
    /// * `Ok(IssuedCode)` - Code persisted (and delivered, when requested)
    /// * `Err(IssueError)` - Validation, conflict, quota, storage or
    ///   delivery failure; a delivery failure deletes the persisted code
    pub async fn issue(
        &self,
        realm: &Realm,
        actor: &Actor,
        request: &IssueRequest,
    ) -> IssueResult<IssuedCode> {
        let issued = self.issue_code(realm, actor, request).await?;
        self.deliver(realm, issued).await
    }

    /// Validate and persist a code without delivering it
    ///
    /// This is the first phase of `issue`; batch issuance calls it for every
    /// request before fanning out deliveries.
    pub(crate) async fn issue_code(
        &self,
        realm: &Realm,
        actor: &Actor,
        request: &IssueRequest,
    ) -> IssueResult<IssuedCode> {
        let phone = request.phone();

        // Step 1: A date is required when realm policy says so
        if realm.require_date && request.symptom_date.is_none() && request.test_date.is_none() {
            return Err(IssueError::MissingDate);
        }

        // Step 2: Parse the test type
        let test_type = TestType::parse(&request.test_type).ok_or_else(|| {
            IssueError::InvalidTestType {
                value: request.test_type.clone(),
            }
        })?;

        // Step 3: The realm must allow that test type
        if !realm.allowed_test_types.contains(test_type) {
            return Err(IssueError::UnsupportedTestType {
                value: test_type.as_str().to_string(),
            });
        }

        // Step 4: Delivery must be possible before anything is persisted
        if phone.is_some() {
            if self.sms.is_none() {
                return Err(IssueError::SmsNotConfigured);
            }
            if realm
                .sms_template(request.sms_template_label.as_deref())
                .is_none()
            {
                return Err(IssueError::SmsNotConfigured);
            }
        }

        // Step 5: Validate dates against the caller's local today
        let today = local_today(request.tz_offset_minutes);
        let earliest = today - Duration::days(realm.max_symptom_age_days);
        let symptom_date = request
            .symptom_date
            .as_deref()
            .map(|raw| parse_date(DateField::Symptom, raw, earliest, today))
            .transpose()?;
        let test_date = request
            .test_date
            .as_deref()
            .map(|raw| parse_date(DateField::Test, raw, earliest, today))
            .transpose()?;

        // Step 6: Idempotency check, before quota is spent
        let (request_uuid, client_supplied) = sanitize_request_uuid(request.request_uuid.as_deref())?;
        if client_supplied {
            let existing = self
                .codes
                .find_by_request_uuid(realm.id, request_uuid)
                .await?;
            if existing.is_some() {
                return Err(IssueError::UuidConflict);
            }
        }

        // Step 7: Spend one quota unit
        if realm.abuse_prevention_enabled {
            let key = derive_quota_key(&self.config.quota_key_secret, realm.id);
            let take = self.quota.take(&key).await?;
            if !take.granted {
                if self.config.enforce_quotas {
                    return Err(IssueError::QuotaExceeded);
                }
                warn!(
                    realm = %realm.name,
                    reset_at = %take.reset_at,
                    "realm exceeded its quota; enforcement is disabled, issuing anyway"
                );
            }
        }

        // Step 8: Compute expiries; without delivery the long code gains
        // nothing and gets the short lifetime
        let now = Utc::now();
        let expires_at = now + realm.code_duration();
        let long_expires_at = if phone.is_some() {
            now + realm.long_code_duration()
        } else {
            expires_at
        };

        // Step 9: Generate and persist, retrying uniqueness collisions
        let prototype = VerificationCode {
            id: Uuid::new_v4(),
            realm_id: realm.id,
            code: String::new(),
            long_code: String::new(),
            test_type,
            symptom_date,
            test_date,
            expires_at,
            long_expires_at,
            claimed: false,
            issuing_actor: actor.clone(),
            issuing_external_id: request.external_issuer_id.clone(),
            request_uuid,
            created_at: now,
        };
        let codes = Arc::clone(&self.codes);
        let short_length = realm.code_length;
        let long_length = realm.long_code_length;
        let alphanumeric = realm.alphanumeric_codes;

        let persisted = retry_collisions(self.config.collision_retry_count + 1, |attempt| {
            let codes = Arc::clone(&codes);
            let mut row = prototype.clone();
            async move {
                let generated = if alphanumeric {
                    generate_alphanumeric(short_length)
                } else {
                    generate_digits(short_length)
                }
                .and_then(|short| generate_alphanumeric(long_length).map(|long| (short, long)));
                let (short, long) = match generated {
                    Ok(pair) => pair,
                    Err(e) => {
                        return AttemptOutcome::Fatal(IssueError::CodeGeneration {
                            message: e.to_string(),
                        })
                    }
                };
                row.code = short;
                row.long_code = long;
                match codes.insert(&row).await {
                    Ok(()) => AttemptOutcome::Done(row),
                    Err(StoreError::Constraint(CodeConstraint::ShortCode))
                    | Err(StoreError::Constraint(CodeConstraint::LongCode)) => {
                        warn!(attempt, "code collision on insert, regenerating");
                        AttemptOutcome::Collision
                    }
                    Err(StoreError::Constraint(CodeConstraint::RequestUuid)) => {
                        AttemptOutcome::Conflict
                    }
                    Err(e) => AttemptOutcome::Fatal(IssueError::Store(e)),
                }
            }
        })
        .await
        .map_err(|failure| match failure {
            RetryFailure::RetriesExhausted => IssueError::CollisionRetriesExhausted,
            RetryFailure::Conflict => IssueError::UuidConflict,
            RetryFailure::Fatal(e) => e,
        })?;

        info!(realm = %realm.name, code_id = %persisted.id, "verification code issued");

        Ok(IssuedCode {
            id: persisted.id,
            request_uuid: persisted.request_uuid,
            code: persisted.code,
            long_code: persisted.long_code,
            expires_at: persisted.expires_at,
            long_expires_at: persisted.long_expires_at,
            phone: phone.map(str::to_string),
            sms_template_label: request.sms_template_label.clone(),
        })
    }

    /// Send the SMS for an issued code, deleting the code if delivery fails
    ///
    /// A code that was never received must not stay redeemable, so delivery
    /// failure compensates by hard-deleting the row and surfaces as a
    /// client-visible `sms_failure`.
    pub(crate) async fn deliver(&self, realm: &Realm, issued: IssuedCode) -> IssueResult<IssuedCode> {
        let Some(phone) = issued.phone.clone() else {
            return Ok(issued);
        };
        // Step 4 guaranteed both of these while validating
        let sender = self.sms.as_ref().ok_or(IssueError::SmsNotConfigured)?;
        let template = realm
            .sms_template(issued.sms_template_label.as_deref())
            .ok_or(IssueError::SmsNotConfigured)?;

        let now = Utc::now();
        let message = render_template(
            template,
            &issued.code,
            &issued.long_code,
            (issued.expires_at - now).num_minutes(),
            (issued.long_expires_at - now).num_minutes(),
        );

        match sender.send(&phone, &message).await {
            Ok(()) => Ok(issued),
            Err(e) => {
                let scrubbed = scrub_phone(&e.to_string(), &phone);
                error!(
                    provider = sender.provider_name(),
                    code_id = %issued.id,
                    error = %scrubbed,
                    "sms delivery failed, deleting undelivered code"
                );
                if let Err(delete_err) = self.codes.delete(issued.id).await {
                    error!(
                        code_id = %issued.id,
                        error = %delete_err,
                        "failed to delete code after sms failure"
                    );
                }
                Err(IssueError::SmsFailure { message: scrubbed })
            }
        }
    }

    /// Purge unclaimed codes whose long expiry passed before now
    pub async fn purge_expired(&self) -> Result<u64, IssueError> {
        let purged = self.codes.purge_expired(Utc::now()).await?;
        if purged > 0 {
            info!(purged, "purged expired verification codes");
        }
        Ok(purged)
    }
}

/// Today's date in the caller's local timezone
fn local_today(tz_offset_minutes: i32) -> NaiveDate {
    (Utc::now() + Duration::minutes(i64::from(tz_offset_minutes))).date_naive()
}

/// Parse a `YYYY-MM-DD` date and check it lies within the accepted window
fn parse_date(
    field: DateField,
    raw: &str,
    earliest: NaiveDate,
    latest: NaiveDate,
) -> IssueResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        IssueError::InvalidDate {
            field,
            message: format!("'{}' is not a valid YYYY-MM-DD date", raw.trim()),
        }
    })?;
    if date < earliest || date > latest {
        return Err(IssueError::InvalidDate {
            field,
            message: format!("must be between {earliest} and {latest}"),
        });
    }
    Ok(date)
}

/// Normalize the client-supplied idempotency UUID
///
/// Whitespace and control characters are stripped before parsing. An absent
/// or empty value gets a server-generated UUID; a present but unparsable
/// value is a client error.
fn sanitize_request_uuid(raw: Option<&str>) -> IssueResult<(Uuid, bool)> {
    let cleaned: String = match raw {
        None => String::new(),
        Some(s) => s.trim().chars().filter(|c| !c.is_control()).collect(),
    };
    if cleaned.is_empty() {
        return Ok((Uuid::new_v4(), false));
    }
    let parsed = Uuid::parse_str(&cleaned).map_err(|_| IssueError::UnparsableRequest {
        message: "request contains an invalid UUID".to_string(),
    })?;
    Ok((parsed, true))
}
