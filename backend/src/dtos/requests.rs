use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::validation;
use super::{null_as_default, DeviceServiceDto, UpdateDeviceServiceDto, Versionable};

/// POST /api/v2/deviceservice 请求体中的单个元素
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "add_request_api_version", skip_on_field_errors = false))]
pub struct AddDeviceServiceRequest {
    #[serde(flatten)]
    pub versionable: Versionable,
    /// 请求 ID（可选，存在时必须是 UUID）
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    #[validate(custom(function = "validation::uuid_if_present"))]
    pub request_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(nested)]
    pub service: DeviceServiceDto,
}

/// PATCH /api/v2/deviceservice 请求体中的单个元素
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "update_request_api_version", skip_on_field_errors = false))]
pub struct UpdateDeviceServiceRequest {
    #[serde(flatten)]
    pub versionable: Versionable,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    #[validate(custom(function = "validation::uuid_if_present"))]
    pub request_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(nested)]
    pub service: UpdateDeviceServiceDto,
}

fn add_request_api_version(request: &AddDeviceServiceRequest) -> Result<(), ValidationError> {
    validation::api_version(&request.versionable)
}

fn update_request_api_version(
    request: &UpdateDeviceServiceRequest,
) -> Result<(), ValidationError> {
    validation::api_version(&request.versionable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::validation::{validate_dto, RULE_REQUIRED, RULE_REQUIRED_WITHOUT, RULE_UUID};
    use crate::dtos::DtoError;
    use serde_json::json;

    #[test]
    fn test_decode_add_request() {
        let request: AddDeviceServiceRequest = serde_json::from_value(json!({
            "apiVersion": "v2",
            "requestId": "2e8d2fda-5f87-4b0f-9c0c-0a0b4ad3b6a1",
            "service": {
                "name": "device-virtual",
                "baseAddress": "http://edgex-device-virtual:59900",
                "adminState": "UNLOCKED",
                "labels": ["virtual"]
            }
        }))
        .unwrap();
        assert_eq!(request.service.name, "device-virtual");
        assert_eq!(request.service.labels, vec!["virtual".to_string()]);
        assert!(validate_dto(&request).is_ok());
    }

    #[test]
    fn test_add_request_reports_nested_paths() {
        let request: AddDeviceServiceRequest = serde_json::from_value(json!({
            "requestId": "not-a-uuid",
            "service": { "adminState": "LOCKED" }
        }))
        .unwrap();
        match validate_dto(&request) {
            Err(DtoError::Validation(report)) => {
                assert_eq!(
                    report.fields(),
                    vec!["requestId", "service.baseAddress", "service.name"]
                );
                assert!(report.contains("requestId", RULE_UUID));
                assert!(report.contains("service.name", RULE_REQUIRED));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_request_api_version_is_checked() {
        let request: UpdateDeviceServiceRequest = serde_json::from_value(json!({
            "apiVersion": "v1",
            "requestId": null,
            "service": { "name": "device-modbus" }
        }))
        .unwrap();
        match validate_dto(&request) {
            Err(DtoError::Validation(report)) => {
                assert_eq!(report.fields(), vec!["apiVersion"]);
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_update_request_without_identifier() {
        let request: UpdateDeviceServiceRequest = serde_json::from_value(json!({
            "service": { "adminState": "LOCKED" }
        }))
        .unwrap();
        match validate_dto(&request) {
            Err(DtoError::Validation(report)) => {
                assert!(report.contains("service.id", RULE_REQUIRED_WITHOUT));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }
}
