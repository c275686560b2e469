//! MySQL implementation of the CodeRepository trait.
//!
//! Uniqueness of short codes, long codes and per-realm request UUIDs is
//! enforced by the `uq_codes_*` indexes; duplicate-key errors are mapped to
//! `StoreError::Constraint` exactly here, never by the engines. Redemption
//! runs as a `SELECT ... FOR UPDATE` transaction so concurrent exchanges of
//! one code yield exactly one success.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use cv_core::domain::entities::{VerificationCode, VerificationToken};
use cv_core::domain::value_objects::{Actor, TestType, TestTypeSet};
use cv_core::errors::{CodeConstraint, RedeemError, StoreError};
use cv_core::repositories::CodeRepository;

const CODE_COLUMNS: &str = "id, realm_id, code, long_code, test_type, symptom_date, test_date, \
     expires_at, long_expires_at, claimed, actor_kind, actor_id, issuing_external_id, \
     request_uuid, created_at";

/// MySQL implementation of CodeRepository
pub struct MySqlCodeRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlCodeRepository {
    /// Create a new MySQL code repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// MySQL driver code for a duplicate-key violation (ER_DUP_ENTRY)
const ER_DUP_ENTRY: &str = "1062";

/// Map a duplicate-key message to the index that fired
///
/// The 1062 message names the violated key, e.g.
/// `Duplicate entry '12345678' for key 'verification_codes.uq_codes_code'`.
/// `uq_codes_code` is a substring of the other two index names, so it is
/// checked last.
fn constraint_for_index(message: &str) -> Option<CodeConstraint> {
    if message.contains("uq_codes_request_uuid") {
        Some(CodeConstraint::RequestUuid)
    } else if message.contains("uq_codes_long_code") {
        Some(CodeConstraint::LongCode)
    } else if message.contains("uq_codes_code") {
        Some(CodeConstraint::ShortCode)
    } else {
        None
    }
}

fn map_store_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some(ER_DUP_ENTRY) {
            if let Some(constraint) = constraint_for_index(db.message()) {
                return StoreError::Constraint(constraint);
            }
        }
    }
    StoreError::Storage {
        message: e.to_string(),
    }
}

fn storage_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Storage {
        message: e.to_string(),
    }
}

fn actor_columns(actor: &Actor) -> (&'static str, Option<String>) {
    match actor {
        Actor::System => ("system", None),
        Actor::ApiApp { app_id } => ("api_app", Some(app_id.to_string())),
        Actor::User { user_id } => ("user", Some(user_id.to_string())),
    }
}

fn actor_from_columns(kind: &str, id: Option<String>) -> Result<Actor, StoreError> {
    let parse_id = |id: Option<String>| -> Result<Uuid, StoreError> {
        let raw = id.ok_or_else(|| storage_error("actor_id missing for non-system actor"))?;
        Uuid::parse_str(&raw).map_err(storage_error)
    };
    match kind {
        "system" => Ok(Actor::System),
        "api_app" => Ok(Actor::ApiApp {
            app_id: parse_id(id)?,
        }),
        "user" => Ok(Actor::User {
            user_id: parse_id(id)?,
        }),
        other => Err(storage_error(format!("unknown actor kind: {other}"))),
    }
}

/// Convert a database row to a VerificationCode entity
fn row_to_code(row: &sqlx::mysql::MySqlRow) -> Result<VerificationCode, StoreError> {
    let id: String = row.try_get("id").map_err(storage_error)?;
    let realm_id: String = row.try_get("realm_id").map_err(storage_error)?;
    let request_uuid: String = row.try_get("request_uuid").map_err(storage_error)?;
    let test_type: String = row.try_get("test_type").map_err(storage_error)?;
    let actor_kind: String = row.try_get("actor_kind").map_err(storage_error)?;
    let actor_id: Option<String> = row.try_get("actor_id").map_err(storage_error)?;

    Ok(VerificationCode {
        id: Uuid::parse_str(&id).map_err(storage_error)?,
        realm_id: Uuid::parse_str(&realm_id).map_err(storage_error)?,
        code: row.try_get("code").map_err(storage_error)?,
        long_code: row.try_get("long_code").map_err(storage_error)?,
        test_type: TestType::parse(&test_type)
            .ok_or_else(|| storage_error(format!("unknown test type: {test_type}")))?,
        symptom_date: row
            .try_get::<Option<NaiveDate>, _>("symptom_date")
            .map_err(storage_error)?,
        test_date: row
            .try_get::<Option<NaiveDate>, _>("test_date")
            .map_err(storage_error)?,
        expires_at: row
            .try_get::<DateTime<Utc>, _>("expires_at")
            .map_err(storage_error)?,
        long_expires_at: row
            .try_get::<DateTime<Utc>, _>("long_expires_at")
            .map_err(storage_error)?,
        claimed: row.try_get("claimed").map_err(storage_error)?,
        issuing_actor: actor_from_columns(&actor_kind, actor_id)?,
        issuing_external_id: row
            .try_get("issuing_external_id")
            .map_err(storage_error)?,
        request_uuid: Uuid::parse_str(&request_uuid).map_err(storage_error)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(storage_error)?,
    })
}

#[async_trait]
impl CodeRepository for MySqlCodeRepository {
    async fn insert(&self, code: &VerificationCode) -> Result<(), StoreError> {
        let (actor_kind, actor_id) = actor_columns(&code.issuing_actor);
        let query = r#"
            INSERT INTO verification_codes (
                id, realm_id, code, long_code, test_type, symptom_date, test_date,
                expires_at, long_expires_at, claimed, actor_kind, actor_id,
                issuing_external_id, request_uuid, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(code.id.to_string())
            .bind(code.realm_id.to_string())
            .bind(&code.code)
            .bind(&code.long_code)
            .bind(code.test_type.as_str())
            .bind(code.symptom_date)
            .bind(code.test_date)
            .bind(code.expires_at)
            .bind(code.long_expires_at)
            .bind(code.claimed)
            .bind(actor_kind)
            .bind(actor_id)
            .bind(&code.issuing_external_id)
            .bind(code.request_uuid.to_string())
            .bind(code.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_store_error)?;

        Ok(())
    }

    async fn find_by_request_uuid(
        &self,
        realm_id: Uuid,
        request_uuid: Uuid,
    ) -> Result<Option<VerificationCode>, StoreError> {
        let query = format!(
            "SELECT {CODE_COLUMNS} FROM verification_codes \
             WHERE realm_id = ? AND request_uuid = ? LIMIT 1"
        );

        let result = sqlx::query(&query)
            .bind(realm_id.to_string())
            .bind(request_uuid.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_store_error)?;

        match result {
            Some(row) => Ok(Some(row_to_code(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_code(
        &self,
        realm_id: Uuid,
        code: &str,
    ) -> Result<Option<VerificationCode>, StoreError> {
        let query = format!(
            "SELECT {CODE_COLUMNS} FROM verification_codes \
             WHERE realm_id = ? AND (code = ? OR long_code = ?) LIMIT 1"
        );

        let result = sqlx::query(&query)
            .bind(realm_id.to_string())
            .bind(code)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_store_error)?;

        match result {
            Some(row) => Ok(Some(row_to_code(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM verification_codes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_store_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM verification_codes WHERE claimed = FALSE AND long_expires_at < ?",
        )
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(map_store_error)?;
        Ok(result.rows_affected())
    }

    async fn redeem(
        &self,
        realm_id: Uuid,
        code: &str,
        accepted: &TestTypeSet,
        token_duration: Duration,
    ) -> Result<VerificationToken, RedeemError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RedeemError::Store(map_store_error(e)))?;

        // Row lock held until commit; a concurrent redeem of the same code
        // blocks here and then observes `claimed`.
        let query = format!(
            "SELECT {CODE_COLUMNS} FROM verification_codes \
             WHERE realm_id = ? AND (code = ? OR long_code = ?) LIMIT 1 FOR UPDATE"
        );
        let row = sqlx::query(&query)
            .bind(realm_id.to_string())
            .bind(code)
            .bind(code)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RedeemError::Store(map_store_error(e)))?
            .ok_or(RedeemError::NotFound)?;
        let record = row_to_code(&row)?;

        let now = Utc::now();
        if now > record.applicable_expiry(code) {
            return Err(RedeemError::Expired);
        }
        if record.claimed {
            return Err(RedeemError::AlreadyUsed);
        }
        if !accepted.contains(record.test_type) {
            return Err(RedeemError::UnsupportedTestType);
        }

        sqlx::query("UPDATE verification_codes SET claimed = TRUE WHERE id = ?")
            .bind(record.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RedeemError::Store(map_store_error(e)))?;

        let token = VerificationToken::new(
            record.realm_id,
            record.test_type,
            record.symptom_date,
            record.test_date,
            token_duration,
        );
        sqlx::query(
            r#"
            INSERT INTO verification_tokens (
                id, realm_id, test_type, symptom_date, test_date, subject,
                expires_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(token.id.to_string())
        .bind(token.realm_id.to_string())
        .bind(token.test_type.as_str())
        .bind(token.symptom_date)
        .bind(token.test_date)
        .bind(&token.subject)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RedeemError::Store(map_store_error(e)))?;

        tx.commit()
            .await
            .map_err(|e| RedeemError::Store(map_store_error(e)))?;

        Ok(token)
    }
}
