//! # Infrastructure Layer
//!
//! Concrete implementations behind the core engine seams:
//! - **Database**: MySQL repositories using SQLx, including the atomic
//!   code redemption transaction
//! - **Cache**: Redis-backed realm quota limiter
//! - **SMS**: Twilio delivery and a logging sender for development

pub mod cache;
pub mod database;
pub mod sms;

use thiserror::Error;

/// Infrastructure-level failures that occur before a core seam is reached
///
/// Failures inside a seam (storage, quota, SMS) are reported through that
/// seam's core error type instead.
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("sms provider error: {0}")]
    Sms(String),
}
