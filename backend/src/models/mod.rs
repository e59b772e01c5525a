// 设备服务领域模型
mod device_service;
pub use device_service::*;
