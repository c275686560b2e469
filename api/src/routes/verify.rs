//! Handler for `POST /api/verify` (also mounted at `/api/checkcodestatus`).

use actix_web::{web, HttpRequest, HttpResponse};

use cv_core::repositories::{CodeRepository, RealmRepository};
use cv_core::services::quota::QuotaLimiter;
use cv_core::services::TokenSigner;

use crate::auth::resolve_realm;
use crate::dto::error;
use crate::dto::verify::{VerifyRequestDto, VerifyResponseDto};
use crate::state::AppState;

/// Exchange a verification code for a signed verification token
///
/// # Request Body
///
/// ```json
/// {
///     "verificationCode": "12345678",
///     "acceptTestTypes": ["confirmed", "likely"]
/// }
/// ```
///
/// Redeeming is single-use: once either the short or long form of a code
/// is exchanged, every later attempt fails as already used.
pub async fn verify<C, Q, R, K>(
    req: HttpRequest,
    state: web::Data<AppState<C, Q, R, K>>,
    body: web::Json<VerifyRequestDto>,
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
    let accepted = match body.accepted_set() {
        Ok(accepted) => accepted,
        Err(message) => return error::unparsable(message),
    };

    match state
        .verify
        .verify_and_issue_token(realm.id, &body.verification_code, &accepted)
        .await
    {
        Ok(verified) => HttpResponse::Ok().json(VerifyResponseDto::from(&verified)),
        Err(err) => error::verify_error(&err),
    }
}
