use serde::{Deserialize, Serialize};
use std::env;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器监听地址
    pub server_addr: String,
    /// 服务器监听端口
    pub server_port: u16,
    /// 批量请求允许的最大条目数
    pub max_request_items: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0".to_string(),
            server_port: 59881,
            max_request_items: 100,
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.server_port),
            max_request_items: env::var("MAX_REQUEST_ITEMS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_request_items),
        }
    }

    /// 监听地址，形如 `0.0.0.0:59881`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }
}
