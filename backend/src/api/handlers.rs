use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::dtos::{PingResponse, Versionable};

/// 健康检查（服务自身）
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// GET /api/v2/ping
pub async fn ping() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(PingResponse {
            versionable: Versionable::new(),
            timestamp: chrono::Utc::now().to_rfc2822(),
        }),
    )
}
