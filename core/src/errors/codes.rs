//! Stable machine-readable error codes.
//!
//! Client SDKs branch on these exact strings; changing one is a breaking
//! API change.

pub const MISSING_DATE: &str = "missing_date";
pub const INVALID_DATE: &str = "invalid_date";
pub const INVALID_TEST_TYPE: &str = "invalid_test_type";
pub const UNSUPPORTED_TEST_TYPE: &str = "unsupported_test_type";
pub const SMS_NOT_CONFIGURED: &str = "sms_not_configured";
pub const SMS_FAILURE: &str = "sms_failure";
pub const UUID_ALREADY_EXISTS: &str = "uuid_already_exists";
pub const QUOTA_EXCEEDED: &str = "quota_exceeded";
pub const BATCH_TOO_LARGE: &str = "batch_too_large";
pub const CODE_NOT_FOUND: &str = "code_not_found";
pub const CODE_EXPIRED: &str = "code_expired";
pub const CODE_USED: &str = "code_used";
pub const TOKEN_SIGNING_FAILED: &str = "token_signing_failed";
pub const UNAUTHORIZED: &str = "unauthorized";
pub const UNPARSABLE_REQUEST: &str = "unparsable_request";
pub const INTERNAL_SERVER_ERROR: &str = "internal_server_error";

/// Routing-level 404, not one of the request-validation codes
pub const NOT_FOUND: &str = "not_found";
