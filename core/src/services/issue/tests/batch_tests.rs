//! Batch issuance tests.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::Realm;
use crate::domain::value_objects::Actor;
use crate::errors::{Blame, IssueError};
use crate::repositories::code::MockCodeRepository;
use crate::services::issue::{IssueConfig, IssueRequest, IssueService, MAX_BATCH_SIZE};
use crate::services::quota::MockQuotaLimiter;

use super::mocks::MockSmsSender;

type TestService = IssueService<MockCodeRepository, MockQuotaLimiter, MockSmsSender>;

fn service(
    repo: &Arc<MockCodeRepository>,
    quota: &Arc<MockQuotaLimiter>,
    sms: &Arc<MockSmsSender>,
) -> TestService {
    IssueService::new(
        Arc::clone(repo),
        Arc::clone(quota),
        Some(Arc::clone(sms)),
        IssueConfig {
            collision_retry_count: 3,
            enforce_quotas: true,
            quota_key_secret: "test-secret".to_string(),
        },
    )
}

fn request(test_type: &str, phone: Option<&str>) -> IssueRequest {
    IssueRequest {
        symptom_date: Some(Utc::now().date_naive().format("%Y-%m-%d").to_string()),
        phone: phone.map(str::to_string),
        ..IssueRequest::new(test_type)
    }
}

#[tokio::test]
async fn test_batch_all_succeed() {
    let repo = Arc::new(MockCodeRepository::new());
    let quota = Arc::new(MockQuotaLimiter::unlimited());
    let sms = Arc::new(MockSmsSender::new());
    let service = service(&repo, &quota, &sms);
    let realm = Realm::new("health-dept");

    let requests = vec![
        request("confirmed", Some("+14155550001")),
        request("likely", Some("+14155550002")),
        request("negative", None),
    ];
    let outcome = service
        .issue_many(&realm, &Actor::System, &requests)
        .await
        .unwrap();

    assert_eq!(outcome.items.len(), 3);
    assert_eq!(outcome.failure_count, 0);
    assert_eq!(outcome.http_status, 200);
    assert_eq!(repo.code_count().await, 3);
    assert_eq!(sms.sent().await.len(), 2);
}

#[tokio::test]
async fn test_batch_continues_past_client_failures() {
    let repo = Arc::new(MockCodeRepository::new());
    let quota = Arc::new(MockQuotaLimiter::unlimited());
    let sms = Arc::new(MockSmsSender::new());
    let service = service(&repo, &quota, &sms);
    let realm = Realm::new("health-dept");

    let requests = vec![
        request("confirmed", None),
        request("positive", None), // invalid test type
        request("negative", None),
    ];
    let outcome = service
        .issue_many(&realm, &Actor::System, &requests)
        .await
        .unwrap();

    assert_eq!(outcome.failure_count, 1);
    assert_eq!(outcome.http_status, 400);
    assert!(outcome.items[0].is_ok());
    assert!(matches!(
        outcome.items[1],
        Err(IssueError::InvalidTestType { .. })
    ));
    assert!(outcome.items[2].is_ok());
    // Requests after the failed one were still issued.
    assert_eq!(repo.code_count().await, 2);
}

#[tokio::test]
async fn test_batch_size_limits() {
    let repo = Arc::new(MockCodeRepository::new());
    let quota = Arc::new(MockQuotaLimiter::unlimited());
    let sms = Arc::new(MockSmsSender::new());
    let service = service(&repo, &quota, &sms);
    let realm = Realm::new("health-dept");

    let oversize: Vec<IssueRequest> = (0..MAX_BATCH_SIZE + 1)
        .map(|_| request("confirmed", None))
        .collect();
    let err = service
        .issue_many(&realm, &Actor::System, &oversize)
        .await
        .unwrap_err();
    assert!(matches!(err, IssueError::BatchTooLarge { max } if max == MAX_BATCH_SIZE));
    assert_eq!(err.http_status(), 400);

    let err = service
        .issue_many(&realm, &Actor::System, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, IssueError::UnparsableRequest { .. }));

    assert_eq!(repo.code_count().await, 0);
}

#[tokio::test]
async fn test_batch_aborts_on_server_failure() {
    let repo = Arc::new(MockCodeRepository::new());
    let quota = Arc::new(MockQuotaLimiter::unlimited());
    let sms = Arc::new(MockSmsSender::new());
    let service = service(&repo, &quota, &sms);
    let mut realm = Realm::new("health-dept");
    realm.abuse_prevention_enabled = true;
    quota.set_fail(true);

    let requests = vec![request("confirmed", None), request("likely", None)];
    let err = service
        .issue_many(&realm, &Actor::System, &requests)
        .await
        .unwrap_err();
    assert_eq!(err.blame(), Blame::Server);
    assert_eq!(repo.code_count().await, 0);
}

#[tokio::test]
async fn test_batch_idempotency_conflicts_are_per_item() {
    let repo = Arc::new(MockCodeRepository::new());
    let quota = Arc::new(MockQuotaLimiter::unlimited());
    let sms = Arc::new(MockSmsSender::new());
    let service = service(&repo, &quota, &sms);
    let realm = Realm::new("health-dept");

    let uuid = Uuid::new_v4().to_string();
    let mut first = request("confirmed", None);
    first.request_uuid = Some(uuid.clone());
    let mut duplicate = request("likely", None);
    duplicate.request_uuid = Some(uuid);

    let outcome = service
        .issue_many(&realm, &Actor::System, &[first, duplicate, request("negative", None)])
        .await
        .unwrap();

    assert!(outcome.items[0].is_ok());
    assert!(matches!(outcome.items[1], Err(IssueError::UuidConflict)));
    assert!(outcome.items[2].is_ok());
    assert_eq!(outcome.http_status, 409);
}

#[tokio::test]
async fn test_batch_failed_deliveries_delete_their_codes() {
    let repo = Arc::new(MockCodeRepository::new());
    let quota = Arc::new(MockQuotaLimiter::unlimited());
    let sms = Arc::new(MockSmsSender::new());
    let service = service(&repo, &quota, &sms);
    let realm = Realm::new("health-dept");
    sms.set_fail(true);

    let requests = vec![
        request("confirmed", Some("+14155550001")),
        request("likely", None),
    ];
    let outcome = service
        .issue_many(&realm, &Actor::System, &requests)
        .await
        .unwrap();

    assert!(matches!(
        outcome.items[0],
        Err(IssueError::SmsFailure { .. })
    ));
    assert!(outcome.items[1].is_ok());
    assert_eq!(outcome.failure_count, 1);
    // Only the undelivered code was removed.
    assert_eq!(repo.code_count().await, 1);
}
