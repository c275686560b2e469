//! Request and response DTOs for the HTTP API.

pub mod error;
pub mod issue;
pub mod verify;
