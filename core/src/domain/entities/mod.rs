//! Domain entities

pub mod realm;
pub mod verification_code;
pub mod verification_token;

pub use realm::Realm;
pub use verification_code::VerificationCode;
pub use verification_token::VerificationToken;
