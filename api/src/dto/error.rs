//! Uniform error response body.
//!
//! Every failure renders as `{"error": "...", "errorCode": "..."}` with a
//! stable machine-readable code. Server-blame failures are logged at error
//! level with their detailed cause and render a generic message.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use cv_core::errors::{codes, Blame, IssueError, VerifyError};

/// Wire shape of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message, safe for clients
    pub error: String,
    /// Stable machine-readable code
    #[serde(rename = "errorCode")]
    pub error_code: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_code: error_code.into(),
        }
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// 401 response for a missing or unknown API key
pub fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorBody::new(
        "missing or invalid API key",
        codes::UNAUTHORIZED,
    ))
}

/// 400 response for a payload that did not deserialize or validate
pub fn unparsable(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody::new(message, codes::UNPARSABLE_REQUEST))
}

/// Generic 500 response; the cause must already be logged
pub fn internal() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorBody::new(
        "internal server error",
        codes::INTERNAL_SERVER_ERROR,
    ))
}

/// Render an issuance failure, logging per its blame
pub fn issue_error(err: &IssueError) -> HttpResponse {
    match err.blame() {
        Blame::Server => error!(error = %err, code = err.error_code(), "issue request failed"),
        _ => warn!(error = %err, code = err.error_code(), "issue request rejected"),
    }
    HttpResponse::build(status(err.http_status()))
        .json(ErrorBody::new(err.public_message(), err.error_code()))
}

/// Render a verification failure, logging per its blame
pub fn verify_error(err: &VerifyError) -> HttpResponse {
    match err.blame() {
        Blame::Server => error!(error = %err, code = err.error_code(), "verify request failed"),
        _ => warn!(error = %err, code = err.error_code(), "verify request rejected"),
    }
    HttpResponse::build(status(err.http_status()))
        .json(ErrorBody::new(err.public_message(), err.error_code()))
}
