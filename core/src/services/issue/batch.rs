//! Batch issuance orchestration.
//!
//! Codes are issued sequentially so quota and idempotency checks stay
//! ordered, then SMS deliveries fan out concurrently.

use futures_util::future::join_all;
use tracing::{error, info};

use crate::domain::entities::Realm;
use crate::domain::value_objects::Actor;
use crate::errors::{Blame, IssueError, IssueResult};
use crate::repositories::CodeRepository;
use crate::services::quota::QuotaLimiter;
use crate::services::sms::SmsSender;

use super::{IssueRequest, IssueService, IssuedCode};

/// Maximum number of requests accepted in one batch
pub const MAX_BATCH_SIZE: usize = 10;

/// Per-item results of a batch issuance
///
/// Items keep the order of the incoming requests. A batch with any failed
/// item reports the first failure's HTTP status for the whole response;
/// callers inspect the items for the rest.
#[derive(Debug)]
pub struct BatchOutcome {
    /// One outcome per request, in request order
    pub items: Vec<IssueResult<IssuedCode>>,
    /// Number of failed items
    pub failure_count: usize,
    /// Suggested HTTP status for the batch response
    pub http_status: u16,
}

impl<C, Q, S> IssueService<C, Q, S>
where
    C: CodeRepository,
    Q: QuotaLimiter,
    S: SmsSender + ?Sized,
{
    /// Issue up to [`MAX_BATCH_SIZE`] codes in one call
    ///
    /// Issuance runs sequentially; a server-side failure aborts the whole
    /// batch, while client-side failures are recorded per item and the
    /// remaining requests still run. Deliveries then fan out concurrently,
    /// and each failed delivery deletes its own code.
    ///
    /// # Returns
    /// * `Ok(BatchOutcome)` - Per-item results, possibly mixed
    /// * `Err(IssueError)` - The batch was too large, empty, or hit a
    ///   server-side failure partway through
    pub async fn issue_many(
        &self,
        realm: &Realm,
        actor: &Actor,
        requests: &[IssueRequest],
    ) -> IssueResult<BatchOutcome> {
        if requests.is_empty() {
            return Err(IssueError::UnparsableRequest {
                message: "batch contains no requests".to_string(),
            });
        }
        if requests.len() > MAX_BATCH_SIZE {
            return Err(IssueError::BatchTooLarge {
                max: MAX_BATCH_SIZE,
            });
        }

        let mut items: Vec<IssueResult<IssuedCode>> = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            match self.issue_code(realm, actor, request).await {
                Ok(issued) => items.push(Ok(issued)),
                Err(e) if e.blame() == Blame::Server => {
                    error!(
                        realm = %realm.name,
                        index,
                        error = %e,
                        "aborting batch on server-side failure"
                    );
                    return Err(e);
                }
                Err(e) => items.push(Err(e)),
            }
        }

        let items: Vec<IssueResult<IssuedCode>> = join_all(items.into_iter().map(|item| async {
            match item {
                Ok(issued) => self.deliver(realm, issued).await,
                failed => failed,
            }
        }))
        .await;

        let failure_count = items.iter().filter(|item| item.is_err()).count();
        let http_status = items
            .iter()
            .find_map(|item| item.as_ref().err().map(IssueError::http_status))
            .unwrap_or(200);

        info!(
            realm = %realm.name,
            total = items.len(),
            failed = failure_count,
            "batch issuance finished"
        );

        Ok(BatchOutcome {
            items,
            failure_count,
            http_status,
        })
    }
}
