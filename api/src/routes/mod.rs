//! HTTP route handlers.

pub mod batch;
pub mod health;
pub mod issue;
pub mod verify;
