//! 字段校验规则与收集式校验报告
//!
//! 规则通过 `validator` 的 `custom` / `schema` 属性挂到 DTO 字段上，
//! 这里只提供规则函数本身，以及把 `ValidationErrors` 展平成报告的逻辑。

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidateUrl, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::{DtoError, Versionable, API_VERSION};
use crate::models::AdminState;

pub const RULE_REQUIRED: &str = "required";
pub const RULE_REQUIRED_WITHOUT: &str = "required_without";
pub const RULE_NONE_EMPTY_STRING: &str = "none_empty_string";
pub const RULE_UNRESERVED_CHARS: &str = "rfc3986_unreserved_chars";
pub const RULE_UUID: &str = "uuid";
pub const RULE_URL: &str = "url";
pub const RULE_ONE_OF: &str = "one_of";
pub const RULE_API_VERSION: &str = "api_version";

/// 结构级错误在 `validator` 中的键
const STRUCT_LEVEL_KEY: &str = "__all__";

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// RFC-3986 unreserved: ALPHA / DIGIT / "-" / "." / "_" / "~"
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

pub fn uuid(value: &str) -> Result<(), ValidationError> {
    // 只接受带连字符的 36 位标准格式
    if value.len() == 36 && Uuid::try_parse(value).is_ok() {
        Ok(())
    } else {
        Err(rule_error(RULE_UUID, "must be a UUID"))
    }
}

pub fn uuid_if_present(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    uuid(value)
}

pub fn unreserved_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_error(RULE_NONE_EMPTY_STRING, "must not be empty"));
    }
    if !value.chars().all(is_unreserved) {
        return Err(rule_error(
            RULE_UNRESERVED_CHARS,
            "only letters, digits and '-', '.', '_', '~' are allowed",
        ));
    }
    Ok(())
}

pub fn required_unreserved_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(rule_error(RULE_REQUIRED, "is required"));
    }
    unreserved_name(value)
}

pub fn uri(value: &str) -> Result<(), ValidationError> {
    if value.validate_url() {
        Ok(())
    } else {
        Err(rule_error(RULE_URL, "must be a valid URI"))
    }
}

pub fn required_uri(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(rule_error(RULE_REQUIRED, "is required"));
    }
    uri(value)
}

pub fn admin_state(value: &str) -> Result<(), ValidationError> {
    match value.parse::<AdminState>() {
        Ok(_) => Ok(()),
        Err(_) => Err(rule_error(RULE_ONE_OF, "must be one of 'LOCKED' 'UNLOCKED'")),
    }
}

pub fn required_admin_state(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(rule_error(RULE_REQUIRED, "is required"));
    }
    admin_state(value)
}

/// 载荷的版本标记必须是当前版本，违规项记在 `apiVersion` 上
pub fn api_version(versionable: &Versionable) -> Result<(), ValidationError> {
    if versionable.api_version == API_VERSION {
        return Ok(());
    }
    let mut error = rule_error(RULE_API_VERSION, "must be the current API version 'v2'");
    error.add_param(Cow::Borrowed("field"), &"api_version");
    Err(error)
}

/// `field` 缺省时要求 `other` 存在，违规项记在 `field` 上
pub fn required_without(
    field: &'static str,
    other: &'static str,
    present: bool,
    other_present: bool,
) -> Result<(), ValidationError> {
    if present || other_present {
        return Ok(());
    }
    let mut error = rule_error(
        RULE_REQUIRED_WITHOUT,
        "is required when the other identifier is absent",
    );
    error.add_param(Cow::Borrowed("field"), &field);
    error.add_param(Cow::Borrowed("other"), &other);
    Err(error)
}

/// 单条违规
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.field, self.message, self.rule)
    }
}

/// 全部违规项，按字段路径排序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn from_errors(errors: &ValidationErrors) -> Self {
        let mut violations = Vec::new();
        collect("", errors, &mut violations);
        violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.rule.cmp(&b.rule)));
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// 出现违规的字段路径（去重）
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.violations.iter().map(|v| v.field.as_str()).collect();
        fields.dedup();
        fields
    }
}

#[cfg(test)]
impl ValidationReport {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn contains(&self, field: &str, rule: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.field == field && v.rule == rule)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.violations().iter().map(|v| v.to_string()).collect();
        f.write_str(&rendered.join(", "))
    }
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut Vec<Violation>) {
    for (field, kind) in errors.errors() {
        let field = field.to_string();
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    // 结构级错误用 `field` 参数定位到具体字段
                    let name = if field == STRUCT_LEVEL_KEY {
                        error
                            .params
                            .get("field")
                            .and_then(|v| v.as_str())
                            .map(wire_name)
                            .unwrap_or_default()
                    } else {
                        wire_name(&field)
                    };
                    out.push(Violation {
                        field: join_path(prefix, &name),
                        rule: error.code.to_string(),
                        message: error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("violates '{}'", error.code)),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect(&join_path(prefix, &wire_name(&field)), nested, out);
            }
            ValidationErrorsKind::List(items) => {
                let base = join_path(prefix, &wire_name(&field));
                for (index, nested) in items {
                    collect(&format!("{}[{}]", base, index), nested, out);
                }
            }
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}.{}", prefix, name),
    }
}

/// snake_case 字段名转换为线上的 camelCase
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
            continue;
        }
        if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// 执行校验，失败时返回包含全部违规项的 `DtoError::Validation`
pub fn validate_dto<T: Validate>(value: &T) -> Result<(), DtoError> {
    value
        .validate()
        .map_err(|errors| DtoError::Validation(ValidationReport::from_errors(&errors)))
}
