//! MySQL implementation of the RealmRepository trait.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use cv_core::domain::entities::Realm;
use cv_core::domain::value_objects::{TestType, TestTypeSet};
use cv_core::errors::StoreError;
use cv_core::repositories::RealmRepository;

const REALM_COLUMNS: &str = "id, name, allow_confirmed, allow_likely, allow_negative, \
     require_date, code_length, long_code_length, code_duration_minutes, \
     long_code_duration_minutes, alphanumeric_codes, abuse_prevention_enabled, \
     max_symptom_age_days, sms_text_template, sms_text_alternate_templates, api_key_hash";

/// MySQL implementation of RealmRepository
pub struct MySqlRealmRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRealmRepository {
    /// Create a new MySQL realm repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_one(
        &self,
        query: &str,
        bind: &str,
    ) -> Result<Option<Realm>, StoreError> {
        let result = sqlx::query(query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        match result {
            Some(row) => Ok(Some(row_to_realm(&row)?)),
            None => Ok(None),
        }
    }
}

fn storage_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Storage {
        message: e.to_string(),
    }
}

fn allowed_types(confirmed: bool, likely: bool, negative: bool) -> TestTypeSet {
    let mut set = TestTypeSet::none();
    if confirmed {
        set = set.with(TestType::Confirmed);
    }
    if likely {
        set = set.with(TestType::Likely);
    }
    if negative {
        set = set.with(TestType::Negative);
    }
    set
}

/// Convert a database row to a Realm entity
fn row_to_realm(row: &sqlx::mysql::MySqlRow) -> Result<Realm, StoreError> {
    let id: String = row.try_get("id").map_err(storage_error)?;
    let allow_confirmed: bool = row.try_get("allow_confirmed").map_err(storage_error)?;
    let allow_likely: bool = row.try_get("allow_likely").map_err(storage_error)?;
    let allow_negative: bool = row.try_get("allow_negative").map_err(storage_error)?;
    let code_length: u32 = row.try_get("code_length").map_err(storage_error)?;
    let long_code_length: u32 = row.try_get("long_code_length").map_err(storage_error)?;
    let templates_json: Option<String> = row
        .try_get("sms_text_alternate_templates")
        .map_err(storage_error)?;
    let alternate_templates: HashMap<String, String> = match templates_json {
        Some(json) => serde_json::from_str(&json).map_err(storage_error)?,
        None => HashMap::new(),
    };

    Ok(Realm {
        id: Uuid::parse_str(&id).map_err(storage_error)?,
        name: row.try_get("name").map_err(storage_error)?,
        allowed_test_types: allowed_types(allow_confirmed, allow_likely, allow_negative),
        require_date: row.try_get("require_date").map_err(storage_error)?,
        code_length: code_length as usize,
        long_code_length: long_code_length as usize,
        code_duration_minutes: row
            .try_get("code_duration_minutes")
            .map_err(storage_error)?,
        long_code_duration_minutes: row
            .try_get("long_code_duration_minutes")
            .map_err(storage_error)?,
        alphanumeric_codes: row.try_get("alphanumeric_codes").map_err(storage_error)?,
        abuse_prevention_enabled: row
            .try_get("abuse_prevention_enabled")
            .map_err(storage_error)?,
        max_symptom_age_days: row.try_get("max_symptom_age_days").map_err(storage_error)?,
        sms_text_template: row.try_get("sms_text_template").map_err(storage_error)?,
        sms_text_alternate_templates: alternate_templates,
        api_key_hash: row.try_get("api_key_hash").map_err(storage_error)?,
    })
}

#[async_trait]
impl RealmRepository for MySqlRealmRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Realm>, StoreError> {
        let query = format!("SELECT {REALM_COLUMNS} FROM realms WHERE id = ? LIMIT 1");
        self.fetch_one(&query, &id.to_string()).await
    }

    async fn find_by_api_key_hash(&self, hash: &str) -> Result<Option<Realm>, StoreError> {
        let query = format!("SELECT {REALM_COLUMNS} FROM realms WHERE api_key_hash = ? LIMIT 1");
        self.fetch_one(&query, hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types_from_flags() {
        let set = allowed_types(true, false, true);
        assert!(set.contains(TestType::Confirmed));
        assert!(!set.contains(TestType::Likely));
        assert!(set.contains(TestType::Negative));
        assert!(allowed_types(false, false, false).is_empty());
    }
}
