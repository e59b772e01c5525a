use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::error::{ApiFailure, AppJson};
use super::router::AppState;
use crate::dtos::validation::validate_dto;
use crate::dtos::{
    from_device_service_model_to_dto, from_device_service_model_to_update_dto,
    replace_device_service_model_fields_with_dto, to_device_service_model,
    AddDeviceServiceRequest, BaseResponse, BaseWithIdResponse, DeviceServiceResponse,
    MultiDeviceServicesResponse, UpdateDeviceServiceDto, UpdateDeviceServiceRequest,
};
use crate::models::DeviceService;
use crate::store::{MemoryDeviceServiceStore, ServiceKey};

/// 列表查询默认每页条数
const DEFAULT_LIMIT: i64 = 20;

fn check_batch_size(len: usize, max: usize) -> Result<(), ApiFailure> {
    if len == 0 {
        return Err(ApiFailure::bad_request(
            "request body must contain at least one item",
        ));
    }
    if len > max {
        return Err(ApiFailure::bad_request(format!(
            "request body contains {} items, at most {} allowed",
            len, max
        )));
    }
    Ok(())
}

/// POST /api/v2/deviceservice - 批量新增设备服务
pub async fn add_device_services(
    State(state): State<AppState>,
    AppJson(requests): AppJson<Vec<AddDeviceServiceRequest>>,
) -> Result<Response, ApiFailure> {
    check_batch_size(requests.len(), state.max_request_items).inspect_err(|failure| {
        warn!("拒绝新增请求: {}", failure);
    })?;

    info!("新增设备服务: {} 条请求", requests.len());
    let mut responses = Vec::with_capacity(requests.len());
    for request in requests {
        let request_id = request.request_id.clone();
        let response = match add_one(&state.store, request).await {
            Ok(id) => BaseWithIdResponse::new(request_id, "", StatusCode::CREATED.as_u16(), id),
            Err(failure) => {
                warn!("新增设备服务失败: {}", failure);
                BaseWithIdResponse {
                    base: failure.into_base_response(request_id),
                    id: String::new(),
                }
            }
        };
        responses.push(response);
    }

    Ok((StatusCode::MULTI_STATUS, Json(responses)).into_response())
}

async fn add_one(
    store: &MemoryDeviceServiceStore,
    request: AddDeviceServiceRequest,
) -> Result<String, ApiFailure> {
    validate_dto(&request)?;
    let service = to_device_service_model(request.service)?;
    let added = store.add(service).await?;
    info!("设备服务创建成功: {} ({})", added.name, added.id);
    Ok(added.id)
}

/// PATCH /api/v2/deviceservice - 批量部分更新设备服务
pub async fn update_device_services(
    State(state): State<AppState>,
    AppJson(requests): AppJson<Vec<UpdateDeviceServiceRequest>>,
) -> Result<Response, ApiFailure> {
    check_batch_size(requests.len(), state.max_request_items).inspect_err(|failure| {
        warn!("拒绝更新请求: {}", failure);
    })?;

    info!("更新设备服务: {} 条请求", requests.len());
    let mut responses = Vec::with_capacity(requests.len());
    for request in requests {
        let request_id = request.request_id.clone();
        let response = match update_one(&state.store, request).await {
            Ok(()) => BaseResponse::new(request_id, "", StatusCode::OK.as_u16()),
            Err(failure) => {
                warn!("更新设备服务失败: {}", failure);
                failure.into_base_response(request_id)
            }
        };
        responses.push(response);
    }

    Ok((StatusCode::MULTI_STATUS, Json(responses)).into_response())
}

/// 有 id 时按 id 定位（同时给出的 name 必须一致），否则按 name 定位；
/// 合并在存储的写锁内完成
async fn update_one(
    store: &MemoryDeviceServiceStore,
    request: UpdateDeviceServiceRequest,
) -> Result<(), ApiFailure> {
    validate_dto(&request)?;
    let patch = request.service;
    let key = match (&patch.id, &patch.name) {
        (Some(id), _) => ServiceKey::Id(id.as_str()),
        (None, Some(name)) => ServiceKey::Name(name.as_str()),
        (None, None) => {
            return Err(ApiFailure::bad_request("either id or name must be provided"));
        }
    };

    let updated = store
        .update_with(key, |service| merge_patch(service, &patch))
        .await?;
    info!("设备服务更新成功: {} ({})", updated.name, updated.id);
    Ok(())
}

/// 以当前状态为基线叠加补丁，合并结果再校验一次后写回模型
fn merge_patch(
    service: &mut DeviceService,
    patch: &UpdateDeviceServiceDto,
) -> Result<(), ApiFailure> {
    if let (Some(_), Some(name)) = (&patch.id, &patch.name) {
        if *name != service.name {
            return Err(ApiFailure::bad_request(format!(
                "device service name '{}' does not match the existing '{}'",
                name, service.name
            )));
        }
    }

    let merged = from_device_service_model_to_update_dto(service.clone()).overlay(patch);
    validate_dto(&merged)?;
    replace_device_service_model_fields_with_dto(service, &merged)?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct AllQuery {
    pub offset: Option<usize>,
    /// 小于 0 表示不限
    pub limit: Option<i64>,
    /// 逗号分隔的标签
    pub labels: Option<String>,
}

impl AllQuery {
    fn limit(&self) -> Option<usize> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        usize::try_from(limit).ok()
    }

    fn labels(&self) -> Vec<String> {
        self.labels
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// GET /api/v2/deviceservice/all
pub async fn all_device_services(
    State(state): State<AppState>,
    Query(query): Query<AllQuery>,
) -> Response {
    let labels = query.labels();
    let (total, services) = state
        .store
        .all(query.offset.unwrap_or(0), query.limit(), &labels)
        .await;
    info!("查询设备服务: 共 {} 个, 返回 {} 个", total, services.len());

    let services = services
        .into_iter()
        .map(from_device_service_model_to_dto)
        .collect();
    (
        StatusCode::OK,
        Json(MultiDeviceServicesResponse::new(
            total,
            services,
            StatusCode::OK.as_u16(),
        )),
    )
        .into_response()
}

/// GET /api/v2/deviceservice/name/{name}
pub async fn device_service_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.store.by_name(&name).await {
        Ok(service) => (
            StatusCode::OK,
            Json(DeviceServiceResponse::new(
                from_device_service_model_to_dto(service),
                StatusCode::OK.as_u16(),
            )),
        )
            .into_response(),
        Err(e) => {
            info!("设备服务不存在: {}", name);
            ApiFailure::from(e).into_response()
        }
    }
}

/// DELETE /api/v2/deviceservice/name/{name}
pub async fn delete_device_service_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match state.store.delete_by_name(&name).await {
        Ok(()) => {
            info!("设备服务删除成功: {}", name);
            (
                StatusCode::OK,
                Json(BaseResponse::new("", "", StatusCode::OK.as_u16())),
            )
                .into_response()
        }
        Err(e) => {
            info!("删除设备服务失败: {}", e);
            ApiFailure::from(e).into_response()
        }
    }
}
