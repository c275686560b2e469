//! Issue endpoint DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use cv_core::errors::IssueError;
use cv_core::services::{IssueRequest, IssuedCode};

use super::error::ErrorBody;

/// RFC1123 rendering used by the expiry fields
fn rfc1123(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S UTC").to_string()
}

/// Request body of `POST /api/issue`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueRequestDto {
    pub test_type: String,

    pub symptom_date: Option<String>,

    pub test_date: Option<String>,

    /// Caller timezone offset in minutes
    pub tz_offset: i32,

    #[validate(length(max = 50))]
    pub phone: Option<String>,

    /// Client idempotency UUID
    pub uuid: Option<String>,

    #[serde(rename = "externalIssuerID")]
    #[validate(length(max = 255))]
    pub external_issuer_id: Option<String>,

    pub sms_template_label: Option<String>,
}

impl IssueRequestDto {
    /// Convert to the engine's request type
    pub fn into_engine_request(self) -> IssueRequest {
        IssueRequest {
            test_type: self.test_type,
            symptom_date: self.symptom_date,
            test_date: self.test_date,
            tz_offset_minutes: self.tz_offset,
            phone: self.phone,
            request_uuid: self.uuid,
            external_issuer_id: self.external_issuer_id,
            sms_template_label: self.sms_template_label,
        }
    }
}

/// Success body of `POST /api/issue`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponseDto {
    pub uuid: String,
    pub verification_code: String,
    pub expires_at: String,
    pub expires_at_timestamp: i64,
    pub long_expires_at: String,
    pub long_expires_at_timestamp: i64,
}

impl From<&IssuedCode> for IssueResponseDto {
    fn from(issued: &IssuedCode) -> Self {
        Self {
            uuid: issued.request_uuid.to_string(),
            verification_code: issued.code.clone(),
            expires_at: rfc1123(issued.expires_at),
            expires_at_timestamp: issued.expires_at.timestamp(),
            long_expires_at: rfc1123(issued.long_expires_at),
            long_expires_at_timestamp: issued.long_expires_at.timestamp(),
        }
    }
}

/// Request body of `POST /api/batch-issue`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchIssueRequestDto {
    #[serde(default)]
    pub codes: Vec<IssueRequestDto>,
}

/// One entry of the batch response, in request order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemDto {
    /// Index of the originating request
    pub index: usize,

    #[serde(flatten)]
    pub code: Option<IssueResponseDto>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl BatchItemDto {
    pub fn success(index: usize, issued: &IssuedCode) -> Self {
        Self {
            index,
            code: Some(IssueResponseDto::from(issued)),
            error: None,
            error_code: None,
        }
    }

    pub fn failure(index: usize, err: &IssueError) -> Self {
        Self {
            index,
            code: None,
            error: Some(err.public_message()),
            error_code: Some(err.error_code().to_string()),
        }
    }
}

/// Response body of `POST /api/batch-issue`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchIssueResponseDto {
    pub codes: Vec<BatchItemDto>,

    /// Message of the first failed item, if any
    #[serde(flatten)]
    pub first_error: Option<ErrorBody>,
}
