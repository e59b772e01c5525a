use serde::{Deserialize, Deserializer, Serialize};

/// 当前 API 版本
pub const API_VERSION: &str = "v2";

/// 所有载荷共有的版本标记
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Versionable {
    #[serde(default = "current_api_version")]
    pub api_version: String,
}

fn current_api_version() -> String {
    API_VERSION.to_string()
}

impl Versionable {
    pub fn new() -> Self {
        Self {
            api_version: current_api_version(),
        }
    }
}

impl Default for Versionable {
    fn default() -> Self {
        Self::new()
    }
}

/// 显式的 `null` 与缺失的键一样解码为零值
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
