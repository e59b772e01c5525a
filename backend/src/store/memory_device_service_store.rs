use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::DeviceService;

/// 存储错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("device service with id '{0}' not found")]
    IdNotFound(String),
    #[error("device service '{0}' not found")]
    NameNotFound(String),
    #[error("device service id '{0}' already exists")]
    DuplicateId(String),
    #[error("device service name '{0}' already exists")]
    DuplicateName(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// 定位设备服务的键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKey<'a> {
    Id(&'a str),
    Name(&'a str),
}

/// 设备服务的内存存储，以 id 为主键，name 唯一
#[derive(Default)]
pub struct MemoryDeviceServiceStore {
    services: RwLock<HashMap<String, DeviceService>>,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl MemoryDeviceServiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增设备服务；id 为空时分配 UUID，并写入创建/修改时间
    pub async fn add(&self, mut service: DeviceService) -> Result<DeviceService> {
        let mut services = self.services.write().await;

        if service.id.is_empty() {
            service.id = Uuid::new_v4().to_string();
        } else if services.contains_key(&service.id) {
            return Err(StoreError::DuplicateId(service.id));
        }
        if services.values().any(|s| s.name == service.name) {
            return Err(StoreError::DuplicateName(service.name));
        }

        let now = now_millis();
        service.created = now;
        service.modified = now;
        debug!("存储设备服务: {} ({})", service.name, service.id);
        services.insert(service.id.clone(), service.clone());

        Ok(service)
    }

    pub async fn by_id(&self, id: &str) -> Result<DeviceService> {
        self.services
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::IdNotFound(id.to_string()))
    }

    pub async fn by_name(&self, name: &str) -> Result<DeviceService> {
        self.services
            .read()
            .await
            .values()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| StoreError::NameNotFound(name.to_string()))
    }

    /// 按名称排序分页查询，返回 (过滤后总数, 当前页)
    ///
    /// `labels` 非空时只返回携带全部这些标签的设备服务；
    /// `limit` 为 `None` 表示不限
    pub async fn all(
        &self,
        offset: usize,
        limit: Option<usize>,
        labels: &[String],
    ) -> (usize, Vec<DeviceService>) {
        let services = self.services.read().await;
        let mut matched: Vec<&DeviceService> =
            services.values().filter(|s| s.has_labels(labels)).collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));

        let total = matched.len();
        let page = matched
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        (total, page)
    }

    /// 在同一把写锁内读取、修改并写回设备服务，刷新修改时间
    ///
    /// `apply` 作用于副本，返回错误时存储保持不变；
    /// 修改后的名称不得与其他设备服务冲突
    pub async fn update_with<F, E>(
        &self,
        key: ServiceKey<'_>,
        apply: F,
    ) -> std::result::Result<DeviceService, E>
    where
        F: FnOnce(&mut DeviceService) -> std::result::Result<(), E>,
        E: From<StoreError>,
    {
        let mut services = self.services.write().await;

        let mut service = match key {
            ServiceKey::Id(id) => services
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::IdNotFound(id.to_string()))?,
            ServiceKey::Name(name) => services
                .values()
                .find(|s| s.name == name)
                .cloned()
                .ok_or_else(|| StoreError::NameNotFound(name.to_string()))?,
        };
        let id = service.id.clone();

        apply(&mut service)?;

        service.id = id;
        if services
            .values()
            .any(|s| s.id != service.id && s.name == service.name)
        {
            return Err(StoreError::DuplicateName(service.name).into());
        }

        service.modified = now_millis();
        debug!("更新设备服务: {} ({})", service.name, service.id);
        services.insert(service.id.clone(), service.clone());

        Ok(service)
    }

    pub async fn delete_by_name(&self, name: &str) -> Result<()> {
        let mut services = self.services.write().await;
        let id = services
            .values()
            .find(|s| s.name == name)
            .map(|s| s.id.clone())
            .ok_or_else(|| StoreError::NameNotFound(name.to_string()))?;
        services.remove(&id);
        Ok(())
    }
}
