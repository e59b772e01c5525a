use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 管理状态
///
/// 线上只允许 `LOCKED` / `UNLOCKED` 两个取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminState {
    Locked,
    Unlocked,
}

impl AdminState {
    pub const LOCKED: &'static str = "LOCKED";
    pub const UNLOCKED: &'static str = "UNLOCKED";

    /// 线上格式的字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminState::Locked => Self::LOCKED,
            AdminState::Unlocked => Self::UNLOCKED,
        }
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的管理状态字符串
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized admin state '{0}'")]
pub struct UnknownAdminState(pub String);

impl FromStr for AdminState {
    type Err = UnknownAdminState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::LOCKED => Ok(AdminState::Locked),
            Self::UNLOCKED => Ok(AdminState::Unlocked),
            other => Err(UnknownAdminState(other.to_string())),
        }
    }
}

/// 设备服务（内部领域模型）
///
/// 所有字段均为非可选值，零值表示"未设置"：空字符串、时间戳 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceService {
    pub id: String,
    pub name: String,
    /// 创建时间（Unix 毫秒）
    pub created: i64,
    /// 修改时间（Unix 毫秒）
    pub modified: i64,
    pub description: String,
    /// 最近一次成功通信（Unix 毫秒），0 表示从未
    pub last_connected: i64,
    /// 最近一次上报数据（Unix 毫秒），0 表示从未
    pub last_reported: i64,
    pub labels: Vec<String>,
    pub base_address: String,
    pub admin_state: AdminState,
}

impl DeviceService {
    /// 是否携带全部给定标签
    pub fn has_labels(&self, labels: &[String]) -> bool {
        labels.iter().all(|label| self.labels.contains(label))
    }
}
