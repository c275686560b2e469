//! Verification engine tests against the in-memory repository.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use uuid::Uuid;

use crate::domain::entities::VerificationCode;
use crate::domain::value_objects::{Actor, TestType, TestTypeSet};
use crate::errors::VerifyError;
use crate::repositories::code::MockCodeRepository;
use crate::repositories::CodeRepository;
use crate::services::verify::{Es256Signer, TokenClaims, TokenConfig, VerifyService};

use super::{TEST_PRIVATE_PEM, TEST_PUBLIC_PEM};

type TestService = VerifyService<MockCodeRepository, Es256Signer>;

fn test_config() -> TokenConfig {
    TokenConfig {
        issuer: "diagnosis-verification".to_string(),
        audience: "exposure-notifications".to_string(),
        token_duration_minutes: 24 * 60,
    }
}

fn service(repo: &Arc<MockCodeRepository>) -> TestService {
    let signer = Arc::new(Es256Signer::from_pem("v1", TEST_PRIVATE_PEM.as_bytes()).unwrap());
    VerifyService::new(Arc::clone(repo), signer, test_config())
}

fn code_row(realm_id: Uuid, code: &str, long_code: &str) -> VerificationCode {
    let now = Utc::now();
    VerificationCode {
        id: Uuid::new_v4(),
        realm_id,
        code: code.to_string(),
        long_code: long_code.to_string(),
        test_type: TestType::Confirmed,
        symptom_date: Utc::now().date_naive().pred_opt(),
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
async fn test_exchange_produces_valid_token() {
    let repo = Arc::new(MockCodeRepository::new());
    let realm_id = Uuid::new_v4();
    let row = code_row(realm_id, "12345678", "ABCDEFGH12345678");
    repo.insert(&row).await.unwrap();
    let service = service(&repo);

    let verified = service
        .verify_and_issue_token(realm_id, "12345678", &TestTypeSet::all())
        .await
        .unwrap();

    assert_eq!(verified.test_type, TestType::Confirmed);
    assert_eq!(verified.symptom_date, row.symptom_date);

    let key = DecodingKey::from_ec_pem(TEST_PUBLIC_PEM.as_bytes()).unwrap();
    let mut validation = Validation::new(Algorithm::ES256);
    validation.set_audience(&["exposure-notifications"]);
    validation.set_issuer(&["diagnosis-verification"]);
    let decoded = decode::<TokenClaims>(&verified.token, &key, &validation).unwrap();

    let expected_sub = format!("confirmed.{}.", row.symptom_date.unwrap());
    assert_eq!(decoded.claims.sub, expected_sub);
    assert_eq!(decoded.claims.exp, verified.token_expires_at.timestamp());

    let tokens = repo.tokens().await;
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].id.to_string(), decoded.claims.jti);
}

#[tokio::test]
async fn test_code_is_single_use() {
    let repo = Arc::new(MockCodeRepository::new());
    let realm_id = Uuid::new_v4();
    repo.insert(&code_row(realm_id, "12345678", "ABCDEFGH12345678"))
        .await
        .unwrap();
    let service = service(&repo);

    service
        .verify_and_issue_token(realm_id, "12345678", &TestTypeSet::all())
        .await
        .unwrap();

    // Neither handle works after the claim.
    let err = service
        .verify_and_issue_token(realm_id, "12345678", &TestTypeSet::all())
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::AlreadyUsed));
    let err = service
        .verify_and_issue_token(realm_id, "ABCDEFGH12345678", &TestTypeSet::all())
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::AlreadyUsed));
    assert_eq!(repo.tokens().await.len(), 1);
}

#[tokio::test]
async fn test_each_handle_uses_its_own_expiry() {
    let repo = Arc::new(MockCodeRepository::new());
    let realm_id = Uuid::new_v4();
    let mut row = code_row(realm_id, "12345678", "ABCDEFGH12345678");
    // Short window already over, long window still open.
    row.expires_at = Utc::now() - Duration::minutes(1);
    repo.insert(&row).await.unwrap();
    let service = service(&repo);

    let err = service
        .verify_and_issue_token(realm_id, "12345678", &TestTypeSet::all())
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::Expired));
    assert_eq!(err.error_code(), "code_expired");

    assert!(service
        .verify_and_issue_token(realm_id, "ABCDEFGH12345678", &TestTypeSet::all())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_unknown_and_foreign_codes_are_not_found() {
    let repo = Arc::new(MockCodeRepository::new());
    let realm_id = Uuid::new_v4();
    repo.insert(&code_row(realm_id, "12345678", "ABCDEFGH12345678"))
        .await
        .unwrap();
    let service = service(&repo);

    let err = service
        .verify_and_issue_token(realm_id, "00000000", &TestTypeSet::all())
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::NotFound));

    // A valid code presented under another realm's key does not exist.
    let err = service
        .verify_and_issue_token(Uuid::new_v4(), "12345678", &TestTypeSet::all())
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::NotFound));

    let err = service
        .verify_and_issue_token(realm_id, "   ", &TestTypeSet::all())
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::NotFound));
}

#[tokio::test]
async fn test_unaccepted_test_type_leaves_code_intact() {
    let repo = Arc::new(MockCodeRepository::new());
    let realm_id = Uuid::new_v4();
    repo.insert(&code_row(realm_id, "12345678", "ABCDEFGH12345678"))
        .await
        .unwrap();
    let service = service(&repo);

    let accepted = TestTypeSet::none().with(TestType::Negative);
    let err = service
        .verify_and_issue_token(realm_id, "12345678", &accepted)
        .await
        .unwrap_err();
    assert!(matches!(err, VerifyError::UnsupportedTestType));
    assert_eq!(err.http_status(), 412);

    // The rejected attempt did not burn the code.
    assert!(service
        .verify_and_issue_token(realm_id, "12345678", &TestTypeSet::all())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_code_value_is_whitespace_tolerant() {
    let repo = Arc::new(MockCodeRepository::new());
    let realm_id = Uuid::new_v4();
    repo.insert(&code_row(realm_id, "12345678", "ABCDEFGH12345678"))
        .await
        .unwrap();
    let service = service(&repo);

    assert!(service
        .verify_and_issue_token(realm_id, " 12345678\n", &TestTypeSet::all())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_concurrent_exchanges_yield_one_success() {
    let repo = Arc::new(MockCodeRepository::new());
    let realm_id = Uuid::new_v4();
    repo.insert(&code_row(realm_id, "12345678", "ABCDEFGH12345678"))
        .await
        .unwrap();
    let service = Arc::new(service(&repo));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .verify_and_issue_token(realm_id, "12345678", &TestTypeSet::all())
                .await
        }));
    }

    let mut successes = 0;
    let mut already_used = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(VerifyError::AlreadyUsed) => already_used += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(already_used, 15);
    assert_eq!(repo.tokens().await.len(), 1);
}
