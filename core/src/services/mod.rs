//! Business services: code generation, quota, SMS, issuance and verification engines

pub mod code_generator;
pub mod issue;
pub mod quota;
pub mod sms;
pub mod verify;

pub use code_generator::{generate_alphanumeric, generate_digits};
pub use issue::{BatchOutcome, IssueConfig, IssueRequest, IssueService, IssuedCode, MAX_BATCH_SIZE};
pub use quota::{derive_quota_key, MockQuotaLimiter, QuotaLimiter, QuotaTake};
pub use sms::{render_template, scrub_phone, SmsSender};
pub use verify::{Es256Signer, TokenClaims, TokenConfig, TokenSigner, VerifiedCode, VerifyService};
