use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::dtos::validation::Violation;
use crate::dtos::{BaseResponse, DtoError};
use crate::store::StoreError;

/// 请求失败：状态码、说明，以及校验失败时的全部违规项
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
    pub violations: Vec<Violation>,
}

impl ApiFailure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            violations: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 转换为批量响应中的单个元素
    pub fn into_base_response(self, request_id: impl Into<String>) -> BaseResponse {
        BaseResponse::new(request_id, self.message, self.status.as_u16())
            .with_violations(self.violations)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self.into_base_response(""))).into_response()
    }
}

impl From<DtoError> for ApiFailure {
    fn from(e: DtoError) -> Self {
        match e {
            DtoError::Validation(report) => {
                debug!("校验失败字段: {:?}", report.fields());
                let message = format!("validation failed: {}", report);
                Self {
                    status: StatusCode::BAD_REQUEST,
                    message,
                    violations: report.into_violations(),
                }
            }
            e @ DtoError::ContractViolation { .. } => {
                // 校验层与映射层不一致，不把细节暴露给客户端
                error!("设备服务映射失败: {}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

impl From<StoreError> for ApiFailure {
    fn from(e: StoreError) -> Self {
        let status = match e {
            StoreError::IdNotFound(_) | StoreError::NameNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::DuplicateId(_) | StoreError::DuplicateName(_) => StatusCode::CONFLICT,
        };
        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        warn!("请求体解析失败: {}", rejection.body_text());
        Self::bad_request(rejection.body_text())
    }
}

/// JSON 请求体提取器，解析失败时返回 400 和 `BaseResponse`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiFailure))]
pub struct AppJson<T>(pub T);
