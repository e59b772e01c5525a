use serde::{Deserialize, Serialize};

use super::validation::Violation;
use super::{DeviceServiceDto, Versionable};

/// 所有响应共有的字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseResponse {
    #[serde(flatten)]
    pub versionable: Versionable,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub status_code: u16,
    /// 校验失败时的全部违规项
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl BaseResponse {
    pub fn new(
        request_id: impl Into<String>,
        message: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self {
            versionable: Versionable::new(),
            request_id: request_id.into(),
            message: message.into(),
            status_code,
            violations: Vec::new(),
        }
    }

    pub fn with_violations(mut self, violations: Vec<Violation>) -> Self {
        self.violations = violations;
        self
    }
}

/// 携带新建资源 ID 的响应
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseWithIdResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

impl BaseWithIdResponse {
    pub fn new(
        request_id: impl Into<String>,
        message: impl Into<String>,
        status_code: u16,
        id: impl Into<String>,
    ) -> Self {
        Self {
            base: BaseResponse::new(request_id, message, status_code),
            id: id.into(),
        }
    }
}

/// 单个设备服务
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceServiceResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub service: DeviceServiceDto,
}

impl DeviceServiceResponse {
    pub fn new(service: DeviceServiceDto, status_code: u16) -> Self {
        Self {
            base: BaseResponse::new("", "", status_code),
            service,
        }
    }
}

/// 设备服务列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiDeviceServicesResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    /// 过滤后、分页前的总数
    pub total_count: usize,
    pub services: Vec<DeviceServiceDto>,
}

impl MultiDeviceServicesResponse {
    pub fn new(total_count: usize, services: Vec<DeviceServiceDto>, status_code: u16) -> Self {
        Self {
            base: BaseResponse::new("", "", status_code),
            total_count,
            services,
        }
    }
}

/// GET /api/v2/ping 响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    #[serde(flatten)]
    pub versionable: Versionable,
    pub timestamp: String,
}
