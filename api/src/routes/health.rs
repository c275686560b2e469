//! Unauthenticated health check.

use actix_web::HttpResponse;

/// Handler for `GET /health`
///
/// Liveness only; it does not touch the database or cache, so load
/// balancers keep routing while a dependency is briefly down.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "code-verify-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
