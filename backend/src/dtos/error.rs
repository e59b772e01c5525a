use thiserror::Error;

use super::validation::ValidationReport;

/// DTO 解码与映射错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DtoError {
    /// 载荷违反声明的约束，包含全部违规项
    #[error("validation failed: {0}")]
    Validation(ValidationReport),
    /// 校验层已放行但映射层无法识别的值，属于内部错误
    #[error("contract violation: field '{field}' carries unrecognized value '{value}'")]
    ContractViolation { field: &'static str, value: String },
}
