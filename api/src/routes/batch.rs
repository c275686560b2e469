//! Handler for `POST /api/batch-issue`.

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use cv_core::domain::value_objects::Actor;
use cv_core::repositories::{CodeRepository, RealmRepository};
use cv_core::services::quota::QuotaLimiter;
use cv_core::services::TokenSigner;

use crate::auth::resolve_realm;
use crate::dto::error::{self, ErrorBody};
use crate::dto::issue::{
    BatchIssueRequestDto, BatchIssueResponseDto, BatchItemDto, IssueRequestDto,
};
use crate::state::AppState;

/// Issue up to ten verification codes in one request
///
/// Per-item failures are embedded in the matching response entry; the
/// response status is 200 when every item succeeded, otherwise the status
/// of the first failed item. A server-side failure aborts the whole batch.
pub async fn batch_issue<C, Q, R, K>(
    req: HttpRequest,
    state: web::Data<AppState<C, Q, R, K>>,
    body: web::Json<BatchIssueRequestDto>,
) -> HttpResponse
where
    C: CodeRepository + 'static,
    Q: QuotaLimiter + 'static,
    R: RealmRepository + 'static,
    K: TokenSigner + 'static,
{
    let realm = match resolve_realm(&req, state.realms.as_ref()).await {
        Ok(realm) => realm,
        Err(response) => return response,
    };

    let body = body.into_inner();
    for item in &body.codes {
        if let Err(err) = item.validate() {
            return error::unparsable(err.to_string());
        }
    }

    let requests: Vec<_> = body
        .codes
        .into_iter()
        .map(IssueRequestDto::into_engine_request)
        .collect();

    let actor = Actor::ApiApp { app_id: realm.id };
    let outcome = match state.issue.issue_many(&realm, &actor, &requests).await {
        Ok(outcome) => outcome,
        Err(err) => return error::issue_error(&err),
    };

    let mut first_error = None;
    let codes: Vec<BatchItemDto> = outcome
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Ok(issued) => BatchItemDto::success(index, issued),
            Err(err) => {
                if first_error.is_none() {
                    first_error =
                        Some(ErrorBody::new(err.public_message(), err.error_code()));
                }
                BatchItemDto::failure(index, err)
            }
        })
        .collect();

    let status = StatusCode::from_u16(outcome.http_status).unwrap_or(StatusCode::OK);
    HttpResponse::build(status).json(BatchIssueResponseDto { codes, first_error })
}
