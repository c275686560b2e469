//! Repository interfaces and in-memory mock implementations

pub mod code;
pub mod realm;

pub use code::{CodeRepository, MockCodeRepository};
pub use realm::{MockRealmRepository, RealmRepository};
