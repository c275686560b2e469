//! Shared application state.

use std::sync::Arc;

use cv_core::repositories::{CodeRepository, RealmRepository};
use cv_core::services::quota::QuotaLimiter;
use cv_core::services::sms::SmsSender;
use cv_core::services::{IssueService, TokenSigner, VerifyService};

/// Application state that holds the shared services
///
/// Generic over the engine seams so endpoint tests can run entirely against
/// the in-memory mocks. The SMS sender is always held as a trait object:
/// the provider is chosen once at startup.
pub struct AppState<C, Q, R, K>
where
    C: CodeRepository,
    Q: QuotaLimiter,
    R: RealmRepository,
    K: TokenSigner,
{
    /// Realm lookup for API-key authentication
    pub realms: Arc<R>,
    /// Code issuance engine
    pub issue: Arc<IssueService<C, Q, dyn SmsSender>>,
    /// Verification/exchange engine
    pub verify: Arc<VerifyService<C, K>>,
}

impl<C, Q, R, K> AppState<C, Q, R, K>
where
    C: CodeRepository,
    Q: QuotaLimiter,
    R: RealmRepository,
    K: TokenSigner,
{
    /// Create the application state
    pub fn new(
        realms: Arc<R>,
        issue: Arc<IssueService<C, Q, dyn SmsSender>>,
        verify: Arc<VerifyService<C, K>>,
    ) -> Self {
        Self {
            realms,
            issue,
            verify,
        }
    }
}
