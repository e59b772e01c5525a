use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::device_service_handlers::{
    add_device_services, all_device_services, delete_device_service_by_name,
    device_service_by_name, update_device_services,
};
use super::handlers::{health_check, ping};
use crate::store::MemoryDeviceServiceStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryDeviceServiceStore>,
    pub max_request_items: usize,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 设备服务路由
    let device_service_routes = Router::new()
        .route(
            "/deviceservice",
            post(add_device_services).patch(update_device_services),
        )
        .route("/deviceservice/all", get(all_device_services))
        .route(
            "/deviceservice/name/{name}",
            get(device_service_by_name).delete(delete_device_service_by_name),
        )
        .with_state(state);

    let api_routes = Router::new()
        .route("/ping", get(ping))
        .merge(device_service_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v2", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
