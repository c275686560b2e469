//! MySQL code repository integration tests.
//!
//! Require a live MySQL with the schema from `migrations/` applied at
//! `DATABASE_URL`; run with `cargo test -p cv_infra -- --ignored`.

use chrono::{Duration, Utc};
use uuid::Uuid;

use cv_core::domain::entities::VerificationCode;
use cv_core::domain::value_objects::{Actor, TestType, TestTypeSet};
use cv_core::errors::{CodeConstraint, RedeemError, StoreError};
use cv_core::repositories::CodeRepository;
use cv_infra::database::{DatabasePool, MySqlCodeRepository};
use cv_shared::config::DatabaseConfig;

async fn repository() -> MySqlCodeRepository {
    let pool = DatabasePool::connect(&DatabaseConfig::from_env())
        .await
        .expect("mysql must be reachable for ignored integration tests");
    MySqlCodeRepository::new(pool.pool())
}

fn sample_code(realm_id: Uuid) -> VerificationCode {
    let now = Utc::now();
    VerificationCode {
        id: Uuid::new_v4(),
        realm_id,
        code: format!("{:08}", rand::random::<u32>() % 100_000_000),
        long_code: Uuid::new_v4().simple().to_string()[..16].to_uppercase(),
        test_type: TestType::Confirmed,
        symptom_date: None,
        test_date: None,
        expires_at: now + Duration::minutes(15),
        long_expires_at: now + Duration::hours(24),
        claimed: false,
        issuing_actor: Actor::System,
        issuing_external_id: None,
        request_uuid: Uuid::new_v4(),
        created_at: now,
    }
}

#[tokio::test]
#[ignore]
async fn test_insert_and_find_round_trip() {
    let repo = repository().await;
    let realm_id = Uuid::new_v4();
    let code = sample_code(realm_id);

    repo.insert(&code).await.unwrap();

    let by_code = repo.find_by_code(realm_id, &code.code).await.unwrap();
    assert_eq!(by_code.as_ref().map(|c| c.id), Some(code.id));

    let by_long = repo.find_by_code(realm_id, &code.long_code).await.unwrap();
    assert_eq!(by_long.as_ref().map(|c| c.id), Some(code.id));

    let by_uuid = repo
        .find_by_request_uuid(realm_id, code.request_uuid)
        .await
        .unwrap();
    assert_eq!(by_uuid.map(|c| c.id), Some(code.id));

    assert!(repo.delete(code.id).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_code_lookup_is_case_sensitive() {
    let repo = repository().await;
    let realm_id = Uuid::new_v4();
    let code = sample_code(realm_id);
    repo.insert(&code).await.unwrap();

    // The long code is stored uppercase. A lowercased submission must not
    // match: a ci collation would return the row here, and the engine's
    // byte-exact expiry selection would then pick the short expiry for a
    // long-code redemption.
    let miss = repo
        .find_by_code(realm_id, &code.long_code.to_lowercase())
        .await
        .unwrap();
    assert!(miss.is_none());

    let hit = repo.find_by_code(realm_id, &code.long_code).await.unwrap();
    assert_eq!(hit.map(|c| c.id), Some(code.id));

    repo.delete(code.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_duplicate_short_code_reports_constraint() {
    let repo = repository().await;
    let realm_id = Uuid::new_v4();
    let first = sample_code(realm_id);
    repo.insert(&first).await.unwrap();

    let mut duplicate = sample_code(realm_id);
    duplicate.code = first.code.clone();
    let err = repo.insert(&duplicate).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(CodeConstraint::ShortCode)
    ));

    repo.delete(first.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_redeem_is_single_use() {
    let repo = repository().await;
    let realm_id = Uuid::new_v4();
    let code = sample_code(realm_id);
    repo.insert(&code).await.unwrap();

    let token = repo
        .redeem(realm_id, &code.code, &TestTypeSet::all(), Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(token.test_type, TestType::Confirmed);

    let err = repo
        .redeem(realm_id, &code.code, &TestTypeSet::all(), Duration::hours(24))
        .await
        .unwrap_err();
    assert!(matches!(err, RedeemError::AlreadyUsed));
}
