//! # CodeVerify API
//!
//! HTTP layer over the core issuance and verification engines: request
//! DTOs, API-key realm resolution, and the actix-web application factory.

pub mod app;
pub mod auth;
pub mod dto;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use state::AppState;
