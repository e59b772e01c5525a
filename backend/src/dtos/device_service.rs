use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::validation;
use super::{null_as_default, DtoError, Versionable};
use crate::models::{AdminState, DeviceService};

/// 设备服务（完整表示）
///
/// 缺失的键和显式的 `null` 都解码为零值，由校验统一报告，
/// 而不是在第一个缺失字段处中断解码
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "supported_api_version", skip_on_field_errors = false))]
pub struct DeviceServiceDto {
    #[serde(flatten)]
    pub versionable: Versionable,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    #[validate(custom(function = "validation::uuid_if_present"))]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "validation::required_unreserved_name"))]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero")]
    pub created: i64,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero")]
    pub modified: i64,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero")]
    pub last_connected: i64,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero")]
    pub last_reported: i64,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "validation::required_uri"))]
    pub base_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    #[validate(custom(function = "validation::required_admin_state"))]
    pub admin_state: String,
}

fn supported_api_version(dto: &DeviceServiceDto) -> Result<(), ValidationError> {
    validation::api_version(&dto.versionable)
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// 设备服务（部分更新表示）
///
/// `None` 表示保持不变，`Some` 表示设置为该值；
/// `labels` 为 `Some(vec![])` 时清空全部标签
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "id_or_name_present", skip_on_field_errors = false))]
pub struct UpdateDeviceServiceDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validation::uuid"))]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validation::unreserved_name"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validation::uri"))]
    pub base_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validation::admin_state"))]
    pub admin_state: Option<String>,
}

fn id_or_name_present(dto: &UpdateDeviceServiceDto) -> Result<(), ValidationError> {
    validation::required_without("id", "name", dto.id.is_some(), dto.name.is_some())
}

impl UpdateDeviceServiceDto {
    /// 将客户端补丁叠加到基线上
    ///
    /// 补丁中存在的字段覆盖基线，标识字段保持基线的值
    pub fn overlay(mut self, patch: &UpdateDeviceServiceDto) -> Self {
        if let Some(base_address) = &patch.base_address {
            self.base_address = Some(base_address.clone());
        }
        if let Some(labels) = &patch.labels {
            self.labels = Some(labels.clone());
        }
        if let Some(admin_state) = &patch.admin_state {
            self.admin_state = Some(admin_state.clone());
        }
        self
    }
}

/// 完整表示 -> 领域模型
///
/// 输入应已通过校验；管理状态无法识别时返回 `ContractViolation`，
/// 绝不回退到默认值
pub fn to_device_service_model(dto: DeviceServiceDto) -> Result<DeviceService, DtoError> {
    let admin_state = decode_admin_state(&dto.admin_state)?;
    Ok(DeviceService {
        id: dto.id,
        name: dto.name,
        created: dto.created,
        modified: dto.modified,
        description: dto.description,
        last_connected: dto.last_connected,
        last_reported: dto.last_reported,
        labels: dto.labels,
        base_address: dto.base_address,
        admin_state,
    })
}

/// 领域模型 -> 完整表示
pub fn from_device_service_model_to_dto(ds: DeviceService) -> DeviceServiceDto {
    DeviceServiceDto {
        versionable: Versionable::new(),
        id: ds.id,
        name: ds.name,
        created: ds.created,
        modified: ds.modified,
        description: ds.description,
        last_connected: ds.last_connected,
        last_reported: ds.last_reported,
        labels: ds.labels,
        base_address: ds.base_address,
        admin_state: ds.admin_state.as_str().to_string(),
    }
}

/// 领域模型 -> 部分更新表示
///
/// 生成合并用的基线，所有字段都会被填充
pub fn from_device_service_model_to_update_dto(ds: DeviceService) -> UpdateDeviceServiceDto {
    UpdateDeviceServiceDto {
        id: Some(ds.id),
        name: Some(ds.name),
        base_address: Some(ds.base_address),
        labels: Some(ds.labels),
        admin_state: Some(ds.admin_state.as_str().to_string()),
    }
}

/// 用更新表示中存在的字段覆盖领域模型
///
/// `id` 与 `name` 只用于定位，不会被改写
pub fn replace_device_service_model_fields_with_dto(
    ds: &mut DeviceService,
    patch: &UpdateDeviceServiceDto,
) -> Result<(), DtoError> {
    // 先解码，避免在失败时留下改了一半的模型
    let admin_state = patch
        .admin_state
        .as_deref()
        .map(decode_admin_state)
        .transpose()?;

    if let Some(base_address) = &patch.base_address {
        ds.base_address = base_address.clone();
    }
    if let Some(labels) = &patch.labels {
        ds.labels = labels.clone();
    }
    if let Some(admin_state) = admin_state {
        ds.admin_state = admin_state;
    }
    Ok(())
}

fn decode_admin_state(token: &str) -> Result<AdminState, DtoError> {
    token
        .parse::<AdminState>()
        .map_err(|e| DtoError::ContractViolation {
            field: "adminState",
            value: e.0,
        })
}

impl TryFrom<DeviceServiceDto> for DeviceService {
    type Error = DtoError;

    fn try_from(dto: DeviceServiceDto) -> Result<Self, Self::Error> {
        to_device_service_model(dto)
    }
}

impl From<DeviceService> for DeviceServiceDto {
    fn from(ds: DeviceService) -> Self {
        from_device_service_model_to_dto(ds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::validation::{
        validate_dto, RULE_API_VERSION, RULE_NONE_EMPTY_STRING, RULE_ONE_OF, RULE_REQUIRED,
        RULE_REQUIRED_WITHOUT, RULE_UNRESERVED_CHARS, RULE_URL, RULE_UUID,
    };
    use serde_json::json;

    const SERVICE_ID: &str = "ca93c8fa-9919-4ec5-85d3-f81b2b6a7bc1";

    fn model() -> DeviceService {
        DeviceService {
            id: SERVICE_ID.to_string(),
            name: "device-modbus".to_string(),
            created: 1_600_000_000_000,
            modified: 1_600_000_100_000,
            description: "Modbus device service".to_string(),
            last_connected: 1_600_000_200_000,
            last_reported: 1_600_000_300_000,
            labels: vec!["modbus".to_string(), "industrial".to_string()],
            base_address: "http://edgex-device-modbus:59901".to_string(),
            admin_state: AdminState::Unlocked,
        }
    }

    fn dto() -> DeviceServiceDto {
        DeviceServiceDto {
            versionable: Versionable::new(),
            id: SERVICE_ID.to_string(),
            name: "device-modbus".to_string(),
            created: 1_600_000_000_000,
            modified: 1_600_000_100_000,
            description: "Modbus device service".to_string(),
            last_connected: 1_600_000_200_000,
            last_reported: 1_600_000_300_000,
            labels: vec!["modbus".to_string(), "industrial".to_string()],
            base_address: "http://edgex-device-modbus:59901".to_string(),
            admin_state: "UNLOCKED".to_string(),
        }
    }

    fn validation_report(result: Result<(), DtoError>) -> validation::ValidationReport {
        match result {
            Err(DtoError::Validation(report)) => report,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_model_round_trip() {
        for admin_state in [AdminState::Locked, AdminState::Unlocked] {
            let original = DeviceService {
                admin_state,
                ..model()
            };
            let dto = from_device_service_model_to_dto(original.clone());
            assert_eq!(to_device_service_model(dto).unwrap(), original);
        }
    }

    #[test]
    fn test_model_round_trip_with_zero_values() {
        let original = DeviceService {
            id: String::new(),
            created: 0,
            modified: 0,
            description: String::new(),
            last_connected: 0,
            last_reported: 0,
            labels: vec![],
            admin_state: AdminState::Locked,
            ..model()
        };
        let dto = from_device_service_model_to_dto(original.clone());
        assert_eq!(to_device_service_model(dto).unwrap(), original);
    }

    #[test]
    fn test_dto_round_trip() {
        let original = dto();
        assert!(validate_dto(&original).is_ok());
        let model = to_device_service_model(original.clone()).unwrap();
        assert_eq!(from_device_service_model_to_dto(model), original);
    }

    #[test]
    fn test_dto_round_trip_through_json() {
        let json = serde_json::to_value(dto()).unwrap();
        let decoded: DeviceServiceDto = serde_json::from_value(json).unwrap();
        let model = DeviceService::try_from(decoded).unwrap();
        assert_eq!(DeviceServiceDto::from(model), dto());
    }

    #[test]
    fn test_admin_state_maps_to_distinct_variants() {
        let locked = to_device_service_model(DeviceServiceDto {
            admin_state: "LOCKED".to_string(),
            ..dto()
        })
        .unwrap();
        let unlocked = to_device_service_model(dto()).unwrap();
        assert_eq!(locked.admin_state, AdminState::Locked);
        assert_eq!(unlocked.admin_state, AdminState::Unlocked);
        assert_eq!(from_device_service_model_to_dto(locked).admin_state, "LOCKED");
        assert_eq!(from_device_service_model_to_dto(unlocked).admin_state, "UNLOCKED");
    }

    #[test]
    fn test_unknown_admin_state_is_contract_violation() {
        let result = to_device_service_model(DeviceServiceDto {
            admin_state: "DISABLED".to_string(),
            ..dto()
        });
        assert_eq!(
            result,
            Err(DtoError::ContractViolation {
                field: "adminState",
                value: "DISABLED".to_string(),
            })
        );
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(dto()).unwrap();
        assert_eq!(
            json,
            json!({
                "apiVersion": "v2",
                "id": SERVICE_ID,
                "name": "device-modbus",
                "created": 1_600_000_000_000i64,
                "modified": 1_600_000_100_000i64,
                "description": "Modbus device service",
                "lastConnected": 1_600_000_200_000i64,
                "lastReported": 1_600_000_300_000i64,
                "labels": ["modbus", "industrial"],
                "baseAddress": "http://edgex-device-modbus:59901",
                "adminState": "UNLOCKED"
            })
        );
    }

    #[test]
    fn test_wire_shape_omits_zero_values() {
        let dto = DeviceServiceDto {
            name: "device-virtual".to_string(),
            base_address: "http://localhost:59900".to_string(),
            admin_state: "LOCKED".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(dto).unwrap();
        assert_eq!(
            json,
            json!({
                "apiVersion": "v2",
                "name": "device-virtual",
                "baseAddress": "http://localhost:59900",
                "adminState": "LOCKED"
            })
        );
    }

    #[test]
    fn test_decode_minimal_payload() {
        let dto: DeviceServiceDto = serde_json::from_value(json!({
            "name": "device-virtual",
            "baseAddress": "http://localhost:59900",
            "adminState": "UNLOCKED"
        }))
        .unwrap();
        assert_eq!(dto.versionable.api_version, "v2");
        assert!(dto.id.is_empty());
        assert!(dto.labels.is_empty());
        assert!(validate_dto(&dto).is_ok());
    }

    #[test]
    fn test_explicit_nulls_decode_to_zero_values() {
        let dto: DeviceServiceDto = serde_json::from_value(json!({
            "id": null,
            "name": "device-virtual",
            "created": null,
            "description": null,
            "lastConnected": null,
            "labels": null,
            "baseAddress": "http://localhost:59900",
            "adminState": "UNLOCKED"
        }))
        .unwrap();
        assert!(dto.id.is_empty());
        assert!(dto.description.is_empty());
        assert!(dto.labels.is_empty());
        assert_eq!(dto.created, 0);
        assert_eq!(dto.last_connected, 0);
        assert!(validate_dto(&dto).is_ok());
    }

    #[test]
    fn test_null_required_fields_are_reported() {
        let dto: DeviceServiceDto = serde_json::from_value(json!({
            "name": null,
            "baseAddress": null,
            "adminState": null
        }))
        .unwrap();
        let report = validation_report(validate_dto(&dto));
        assert_eq!(report.fields(), vec!["adminState", "baseAddress", "name"]);
    }

    #[test]
    fn test_unsupported_api_version_is_rejected() {
        let dto: DeviceServiceDto = serde_json::from_value(json!({
            "apiVersion": "v3",
            "name": "device-virtual",
            "baseAddress": "http://localhost:59900",
            "adminState": "UNLOCKED"
        }))
        .unwrap();
        let report = validation_report(validate_dto(&dto));
        assert_eq!(report.len(), 1);
        assert!(report.contains("apiVersion", RULE_API_VERSION));
    }

    #[test]
    fn test_missing_required_fields_are_all_reported() {
        let dto: DeviceServiceDto = serde_json::from_value(json!({
            "description": "nothing else"
        }))
        .unwrap();
        let report = validation_report(validate_dto(&dto));
        assert_eq!(report.fields(), vec!["adminState", "baseAddress", "name"]);
        assert!(report.contains("name", RULE_REQUIRED));
        assert!(report.contains("baseAddress", RULE_REQUIRED));
        assert!(report.contains("adminState", RULE_REQUIRED));
    }

    #[test]
    fn test_single_field_violations() {
        let report = validation_report(validate_dto(&DeviceServiceDto {
            admin_state: "DISABLED".to_string(),
            ..dto()
        }));
        assert_eq!(report.len(), 1);
        assert!(report.contains("adminState", RULE_ONE_OF));

        let report = validation_report(validate_dto(&DeviceServiceDto {
            name: String::new(),
            ..dto()
        }));
        assert_eq!(report.fields(), vec!["name"]);

        let report = validation_report(validate_dto(&DeviceServiceDto {
            base_address: String::new(),
            ..dto()
        }));
        assert_eq!(report.fields(), vec!["baseAddress"]);
    }

    #[test]
    fn test_malformed_values_are_reported() {
        let report = validation_report(validate_dto(&DeviceServiceDto {
            id: "12345".to_string(),
            name: "device modbus".to_string(),
            base_address: "not a uri".to_string(),
            ..dto()
        }));
        assert_eq!(report.len(), 3);
        assert!(report.contains("id", RULE_UUID));
        assert!(report.contains("name", RULE_UNRESERVED_CHARS));
        assert!(report.contains("baseAddress", RULE_URL));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let report = validation_report(validate_dto(&DeviceServiceDto {
            name: "  ".to_string(),
            ..dto()
        }));
        assert!(report.contains("name", RULE_NONE_EMPTY_STRING));
    }

    #[test]
    fn test_update_requires_id_or_name() {
        let report = validation_report(validate_dto(&UpdateDeviceServiceDto {
            base_address: Some("http://localhost:59900".to_string()),
            ..Default::default()
        }));
        assert_eq!(report.len(), 1);
        assert!(report.contains("id", RULE_REQUIRED_WITHOUT));
    }

    #[test]
    fn test_update_with_single_identifier_passes() {
        let by_id = UpdateDeviceServiceDto {
            id: Some(SERVICE_ID.to_string()),
            ..Default::default()
        };
        let by_name = UpdateDeviceServiceDto {
            name: Some("device-modbus".to_string()),
            ..Default::default()
        };
        assert!(validate_dto(&by_id).is_ok());
        assert!(validate_dto(&by_name).is_ok());
    }

    #[test]
    fn test_update_field_violations_are_collected() {
        let report = validation_report(validate_dto(&UpdateDeviceServiceDto {
            id: Some("abc".to_string()),
            name: Some("bad/name".to_string()),
            base_address: Some("::".to_string()),
            labels: None,
            admin_state: Some("DISABLED".to_string()),
        }));
        assert_eq!(report.fields(), vec!["adminState", "baseAddress", "id", "name"]);
        assert!(report.contains("id", RULE_UUID));
        assert!(report.contains("name", RULE_UNRESERVED_CHARS));
        assert!(report.contains("adminState", RULE_ONE_OF));
    }

    #[test]
    fn test_update_baseline_is_total() {
        let update = from_device_service_model_to_update_dto(model());
        assert_eq!(update.id.as_deref(), Some(SERVICE_ID));
        assert_eq!(update.name.as_deref(), Some("device-modbus"));
        assert_eq!(
            update.base_address.as_deref(),
            Some("http://edgex-device-modbus:59901")
        );
        assert_eq!(
            update.labels,
            Some(vec!["modbus".to_string(), "industrial".to_string()])
        );
        assert_eq!(update.admin_state.as_deref(), Some("UNLOCKED"));
        assert!(validate_dto(&update).is_ok());
    }

    #[test]
    fn test_update_baseline_keeps_empty_labels_present() {
        let update = from_device_service_model_to_update_dto(DeviceService {
            labels: vec![],
            admin_state: AdminState::Locked,
            ..model()
        });
        assert_eq!(update.labels, Some(vec![]));
        assert_eq!(update.admin_state.as_deref(), Some("LOCKED"));

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["labels"], json!([]));
    }

    #[test]
    fn test_update_labels_absent_and_empty_are_distinguishable() {
        let absent: UpdateDeviceServiceDto =
            serde_json::from_value(json!({ "name": "device-modbus" })).unwrap();
        let cleared: UpdateDeviceServiceDto =
            serde_json::from_value(json!({ "name": "device-modbus", "labels": [] })).unwrap();
        assert_eq!(absent.labels, None);
        assert_eq!(cleared.labels, Some(vec![]));

        let absent_json = serde_json::to_value(&absent).unwrap();
        let cleared_json = serde_json::to_value(&cleared).unwrap();
        assert!(absent_json.get("labels").is_none());
        assert_eq!(cleared_json["labels"], json!([]));
    }

    #[test]
    fn test_overlay_applies_present_fields_only() {
        let baseline = from_device_service_model_to_update_dto(model());
        let patch = UpdateDeviceServiceDto {
            name: Some("device-modbus".to_string()),
            admin_state: Some("LOCKED".to_string()),
            ..Default::default()
        };
        let merged = baseline.clone().overlay(&patch);
        assert_eq!(merged.admin_state.as_deref(), Some("LOCKED"));
        assert_eq!(merged.base_address, baseline.base_address);
        assert_eq!(merged.labels, baseline.labels);
        assert_eq!(merged.id, baseline.id);
    }

    #[test]
    fn test_overlay_clears_labels() {
        let patch = UpdateDeviceServiceDto {
            id: Some(SERVICE_ID.to_string()),
            labels: Some(vec![]),
            ..Default::default()
        };
        let merged = from_device_service_model_to_update_dto(model()).overlay(&patch);
        assert_eq!(merged.labels, Some(vec![]));
    }

    #[test]
    fn test_replace_model_fields() {
        let mut ds = model();
        let patch = UpdateDeviceServiceDto {
            id: Some(SERVICE_ID.to_string()),
            name: Some("renamed".to_string()),
            base_address: Some("http://10.0.0.5:59901".to_string()),
            labels: Some(vec!["rtu".to_string()]),
            admin_state: Some("LOCKED".to_string()),
        };
        replace_device_service_model_fields_with_dto(&mut ds, &patch).unwrap();
        assert_eq!(ds.name, "device-modbus");
        assert_eq!(ds.base_address, "http://10.0.0.5:59901");
        assert_eq!(ds.labels, vec!["rtu".to_string()]);
        assert_eq!(ds.admin_state, AdminState::Locked);
    }

    #[test]
    fn test_replace_model_fields_leaves_absent_fields() {
        let mut ds = model();
        let patch = UpdateDeviceServiceDto {
            name: Some("device-modbus".to_string()),
            ..Default::default()
        };
        replace_device_service_model_fields_with_dto(&mut ds, &patch).unwrap();
        assert_eq!(ds, model());
    }

    #[test]
    fn test_replace_model_fields_rejects_unknown_admin_state() {
        let mut ds = model();
        let patch = UpdateDeviceServiceDto {
            name: Some("device-modbus".to_string()),
            base_address: Some("http://10.0.0.5:59901".to_string()),
            admin_state: Some("DISABLED".to_string()),
            ..Default::default()
        };
        let result = replace_device_service_model_fields_with_dto(&mut ds, &patch);
        assert!(matches!(result, Err(DtoError::ContractViolation { .. })));
        // 失败时模型保持不变
        assert_eq!(ds, model());
    }
}
