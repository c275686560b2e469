//! Handler for `POST /api/issue`.

use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use cv_core::domain::value_objects::Actor;
use cv_core::repositories::{CodeRepository, RealmRepository};
use cv_core::services::quota::QuotaLimiter;
use cv_core::services::TokenSigner;

use crate::auth::resolve_realm;
use crate::dto::error;
use crate::dto::issue::{IssueRequestDto, IssueResponseDto};
use crate::state::AppState;

/// Issue a single verification code for the calling realm
///
/// # Request Body
///
/// ```json
/// {
///     "testType": "confirmed",
///     "symptomDate": "2026-08-20",
///     "tzOffset": -420,
///     "phone": "+14155550123"
/// }
/// ```
///
/// # Response
///
/// 200 with the code and both expiries on success; 400/409/429/500 with
/// the uniform error body otherwise.
pub async fn issue<C, Q, R, K>(
    req: HttpRequest,
    state: web::Data<AppState<C, Q, R, K>>,
    body: web::Json<IssueRequestDto>,
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
    if let Err(err) = body.validate() {
        return error::unparsable(err.to_string());
    }

    let actor = Actor::ApiApp { app_id: realm.id };
    match state
        .issue
        .issue(&realm, &actor, &body.into_engine_request())
        .await
    {
        Ok(issued) => HttpResponse::Ok().json(IssueResponseDto::from(&issued)),
        Err(err) => error::issue_error(&err),
    }
}
