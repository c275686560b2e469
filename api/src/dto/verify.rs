//! Verify endpoint DTOs.

use serde::{Deserialize, Serialize};

use cv_core::domain::value_objects::{TestType, TestTypeSet};
use cv_core::services::VerifiedCode;

/// Request body of `POST /api/verify`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyRequestDto {
    pub verification_code: String,

    /// Test types the caller accepts; absent or empty means all
    pub accept_test_types: Option<Vec<String>>,
}

impl VerifyRequestDto {
    /// Build the accepted-type set, rejecting unknown entries
    pub fn accepted_set(&self) -> Result<TestTypeSet, String> {
        let types = match &self.accept_test_types {
            None => return Ok(TestTypeSet::all()),
            Some(types) if types.is_empty() => return Ok(TestTypeSet::all()),
            Some(types) => types,
        };
        let mut set = TestTypeSet::none();
        for raw in types {
            match TestType::parse(raw) {
                Some(t) => set = set.with(t),
                None => return Err(format!("unknown test type '{}'", raw.trim())),
            }
        }
        Ok(set)
    }
}

/// Success body of `POST /api/verify`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponseDto {
    pub test_type: TestType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_date: Option<String>,

    pub verification_token: String,
}

impl From<&VerifiedCode> for VerifyResponseDto {
    fn from(verified: &VerifiedCode) -> Self {
        Self {
            test_type: verified.test_type,
            symptom_date: verified.symptom_date.map(|d| d.to_string()),
            test_date: verified.test_date.map(|d| d.to_string()),
            verification_token: verified.token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_set_defaults_to_all() {
        let dto = VerifyRequestDto::default();
        assert_eq!(dto.accepted_set().unwrap(), TestTypeSet::all());

        let dto = VerifyRequestDto {
            accept_test_types: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(dto.accepted_set().unwrap(), TestTypeSet::all());
    }

    #[test]
    fn test_accepted_set_restricts() {
        let dto = VerifyRequestDto {
            accept_test_types: Some(vec!["Confirmed".to_string(), "likely".to_string()]),
            ..Default::default()
        };
        let set = dto.accepted_set().unwrap();
        assert!(set.contains(TestType::Confirmed));
        assert!(set.contains(TestType::Likely));
        assert!(!set.contains(TestType::Negative));
    }

    #[test]
    fn test_accepted_set_rejects_unknown() {
        let dto = VerifyRequestDto {
            accept_test_types: Some(vec!["confirmed".to_string(), "positive".to_string()]),
            ..Default::default()
        };
        let err = dto.accepted_set().unwrap_err();
        assert!(err.contains("positive"));
    }

    #[test]
    fn test_request_field_names() {
        let json = r#"{"verificationCode": "12345678", "acceptTestTypes": ["confirmed"]}"#;
        let dto: VerifyRequestDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.verification_code, "12345678");
        assert_eq!(dto.accept_test_types.unwrap(), vec!["confirmed"]);
    }
}
