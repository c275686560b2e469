//! CodeVerify API server entry point.

use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cv_api::{create_app, AppState};
use cv_core::services::{Es256Signer, IssueConfig, IssueService, TokenConfig, VerifyService};
use cv_infra::cache::{RedisClient, RedisQuotaLimiter};
use cv_infra::database::{DatabasePool, MySqlCodeRepository, MySqlRealmRepository};
use cv_infra::sms::create_sms_sender;
use cv_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("starting CodeVerify API server");

    let config = AppConfig::from_env();

    let db = DatabasePool::connect(&config.database)
        .await
        .context("connecting to MySQL")?;
    db.health_check().await.context("MySQL health check")?;

    let redis = RedisClient::connect(&config.cache)
        .await
        .context("connecting to Redis")?;
    redis.ping().await.context("Redis health check")?;

    let codes = Arc::new(MySqlCodeRepository::new(db.pool()));
    let realms = Arc::new(MySqlRealmRepository::new(db.pool()));
    let quota = Arc::new(RedisQuotaLimiter::new(redis, &config.quota));
    let sms = create_sms_sender().context("configuring SMS provider")?;

    let signer = Arc::new(
        Es256Signer::from_pem_file(
            &config.signing.active_key_id,
            &config.signing.private_key_path,
        )
        .context("loading token signing key")?,
    );

    let issue = Arc::new(IssueService::new(
        Arc::clone(&codes),
        quota,
        sms,
        IssueConfig::from_quota(&config.quota),
    ));
    let verify = Arc::new(VerifyService::new(
        codes,
        signer,
        TokenConfig {
            issuer: config.signing.issuer.clone(),
            audience: config.signing.audience.clone(),
            token_duration_minutes: config.signing.token_duration_minutes,
        },
    ));

    let state = web::Data::new(AppState::new(realms, issue, verify));

    let bind_address = config.server.bind_address();
    info!(%bind_address, "binding HTTP server");

    HttpServer::new(move || create_app(state.clone()))
        .workers(config.server.workers)
        .keep_alive(std::time::Duration::from_secs(config.server.keep_alive))
        .bind(&bind_address)
        .with_context(|| format!("binding {bind_address}"))?
        .run()
        .await?;

    Ok(())
}
