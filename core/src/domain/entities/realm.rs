//! Realm entity carrying per-tenant issuance policy.
//!
//! Realms are referenced, not owned, by the engines: the HTTP layer resolves
//! the calling realm (via API key) and hands a fully-hydrated `Realm` value
//! to each issuance or verification call. The engines never query realms.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::value_objects::TestTypeSet;

/// Default short code length in digits
pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Default long code length in alphanumeric characters
pub const DEFAULT_LONG_CODE_LENGTH: usize = 16;

/// Default short code lifetime in minutes
pub const DEFAULT_CODE_DURATION_MINUTES: i64 = 15;

/// Default long code lifetime in minutes (24 hours)
pub const DEFAULT_LONG_CODE_DURATION_MINUTES: i64 = 24 * 60;

/// Default allowed age for symptom/test dates, in days
pub const DEFAULT_MAX_SYMPTOM_AGE_DAYS: i64 = 14;

/// Per-tenant policy record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Realm {
    /// Unique identifier for the realm
    pub id: Uuid,

    /// Human-readable realm name
    pub name: String,

    /// Test types this realm may attest to
    pub allowed_test_types: TestTypeSet,

    /// Whether issuance requires a symptom or test date
    pub require_date: bool,

    /// Short code length in characters
    pub code_length: usize,

    /// Long code length in characters
    pub long_code_length: usize,

    /// Short code lifetime in minutes
    pub code_duration_minutes: i64,

    /// Long code lifetime in minutes
    pub long_code_duration_minutes: i64,

    /// Use uppercase alphanumerics instead of digits for the short code
    pub alphanumeric_codes: bool,

    /// Whether quota-based abuse prevention applies to this realm
    pub abuse_prevention_enabled: bool,

    /// How far in the past a symptom/test date may lie, in days (inclusive)
    pub max_symptom_age_days: i64,

    /// Default SMS template body
    pub sms_text_template: String,

    /// Labeled alternate SMS templates
    pub sms_text_alternate_templates: HashMap<String, String>,

    /// SHA-256 hex digest of the realm's API key
    pub api_key_hash: String,
}

impl Realm {
    /// Create a realm with default policy
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            allowed_test_types: TestTypeSet::all(),
            require_date: false,
            code_length: DEFAULT_CODE_LENGTH,
            long_code_length: DEFAULT_LONG_CODE_LENGTH,
            code_duration_minutes: DEFAULT_CODE_DURATION_MINUTES,
            long_code_duration_minutes: DEFAULT_LONG_CODE_DURATION_MINUTES,
            alphanumeric_codes: false,
            abuse_prevention_enabled: false,
            max_symptom_age_days: DEFAULT_MAX_SYMPTOM_AGE_DAYS,
            sms_text_template: String::from(
                "Your verification code is [code]. It expires in [expires] minutes.",
            ),
            sms_text_alternate_templates: HashMap::new(),
            api_key_hash: String::new(),
        }
    }

    /// Short code lifetime
    pub fn code_duration(&self) -> Duration {
        Duration::minutes(self.code_duration_minutes)
    }

    /// Long code lifetime
    pub fn long_code_duration(&self) -> Duration {
        Duration::minutes(self.long_code_duration_minutes)
    }

    /// Resolve the SMS template body, optionally by label
    ///
    /// Returns `None` when a label is given but no template carries it;
    /// the caller treats that as a configuration error for the request.
    pub fn sms_template(&self, label: Option<&str>) -> Option<&str> {
        match label {
            None => Some(self.sms_text_template.as_str()),
            Some(l) => self
                .sms_text_alternate_templates
                .get(l)
                .map(|s| s.as_str()),
        }
    }
}
