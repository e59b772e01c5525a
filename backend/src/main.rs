mod api;
mod config;
mod dtos;
mod models;
mod store;

use std::sync::Arc;
use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{create_router, router::AppState};
use crate::config::AppConfig;
use crate::store::MemoryDeviceServiceStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenv::dotenv().ok();

    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "device_service_metadata=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    let addr = config.listen_addr();

    info!("Starting device service metadata server...");
    info!("Max request items: {}", config.max_request_items);

    // 创建应用状态
    let state = AppState {
        store: Arc::new(MemoryDeviceServiceStore::new()),
        max_request_items: config.max_request_items,
    };

    // 创建路由
    let app = create_router(state);

    // 启动服务器
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
