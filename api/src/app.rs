//! Actix-web application factory.

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use cv_core::repositories::{CodeRepository, RealmRepository};
use cv_core::services::quota::QuotaLimiter;
use cv_core::services::TokenSigner;

use crate::dto::error::ErrorBody;
use crate::middleware::cors::create_cors;
use crate::routes::{batch, health, issue, verify};
use crate::state::AppState;

/// Create and configure the application with all routes and middleware
///
/// `/api/checkcodestatus` is a legacy alias of `/api/verify`; both hit the
/// same handler.
pub fn create_app<C, Q, R, K>(
    app_state: web::Data<AppState<C, Q, R, K>>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    C: CodeRepository + 'static,
    Q: QuotaLimiter + 'static,
    R: RealmRepository + 'static,
    K: TokenSigner + 'static,
{
    let cors = create_cors();

    App::new()
        .app_data(app_state)
        .wrap(TracingLogger::default())
        .wrap(cors)
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .route("/issue", web::post().to(issue::issue::<C, Q, R, K>))
                .route("/batch-issue", web::post().to(batch::batch_issue::<C, Q, R, K>))
                .route("/verify", web::post().to(verify::verify::<C, Q, R, K>))
                .route(
                    "/checkcodestatus",
                    web::post().to(verify::verify::<C, Q, R, K>),
                ),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler with the uniform error body
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new(
        "unknown endpoint",
        cv_core::errors::codes::NOT_FOUND,
    ))
}
