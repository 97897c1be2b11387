//! 统一错误类型定义
//!
//! 使用 `thiserror` 库提供统一的错误处理。业务错误（校验、重复、不存在）
//! 在操作边界被转换成 HTTP 响应；存储错误只记录日志，不把细节暴露给调用方。

use std::io;
use thiserror::Error;

/// 任务名为空时的提示
pub const MSG_EMPTY_NAME: &str = "任务名不能为空";
/// 任务名超长时的提示
pub const MSG_NAME_TOO_LONG: &str = "任务名不能超过250个字符";
/// 待办中已有同名任务
pub const MSG_DUPLICATE: &str = "任务已存在";
/// 任务不存在（不区分具体原因）
pub const MSG_NOT_FOUND: &str = "操作失败";
/// 服务器内部错误
pub const MSG_SERVER_ERROR: &str = "服务器错误";

/// 错误类型
#[derive(Debug, Error)]
pub enum TodoError {
    /// 输入校验失败（任务名为空、超长等）
    #[error("Validation error: {0}")]
    Validation(String),

    /// 待办中已存在同名任务
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// 资源不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// 请求体无法解析（非 JSON、不是对象、字段类型无法使用）
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// 存储错误（SQLite 读写、事务提交失败等）
    #[error("Storage error: {0}")]
    Storage(String),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(String),

    /// 模板渲染错误
    #[error("Template error: {0}")]
    Template(String),

    /// I/O 错误（目录创建、端口绑定等）
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML 解析错误
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, TodoError>;

impl TodoError {
    /// 创建 Validation 错误
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// 创建 Duplicate 错误
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    /// 创建 NotFound 错误
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// 创建 MalformedRequest 错误
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// 创建 Storage 错误
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// 创建 Config 错误
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// 返回给客户端的文案。存储类错误和无法解析的请求统一为通用提示，不泄露细节
    pub fn public_message(&self) -> &str {
        match self {
            Self::Validation(msg) => msg,
            Self::Duplicate(_) => MSG_DUPLICATE,
            Self::NotFound(_) => MSG_NOT_FOUND,
            _ => MSG_SERVER_ERROR,
        }
    }

    /// 是否属于调用方的错误（4xx）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Duplicate(_) | Self::NotFound(_)
        )
    }
}

impl From<rusqlite::Error> for TodoError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<tera::Error> for TodoError {
    fn from(e: tera::Error) -> Self {
        Self::Template(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TodoError::validation(MSG_EMPTY_NAME);
        assert_eq!(err.to_string(), "Validation error: 任务名不能为空");

        let err = TodoError::not_found("task 42");
        assert_eq!(err.to_string(), "Not found: task 42");
    }

    #[test]
    fn test_public_message_hides_storage_detail() {
        let err = TodoError::storage("disk I/O error at page 7");
        assert_eq!(err.public_message(), MSG_SERVER_ERROR);
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_public_message_for_client_errors() {
        assert_eq!(TodoError::duplicate("buy milk").public_message(), MSG_DUPLICATE);
        assert_eq!(TodoError::not_found("7").public_message(), MSG_NOT_FOUND);
        assert_eq!(
            TodoError::validation(MSG_NAME_TOO_LONG).public_message(),
            MSG_NAME_TOO_LONG
        );
        assert!(TodoError::duplicate("x").is_client_error());
    }

    #[test]
    fn test_malformed_request_is_server_error() {
        let err = TodoError::malformed("body is not JSON");
        assert_eq!(err.public_message(), MSG_SERVER_ERROR);
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: TodoError = io_err.into();
        assert!(matches!(err, TodoError::Io(_)));
    }

    #[test]
    fn test_rusqlite_error_conversion() {
        let err: TodoError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, TodoError::Storage(_)));
    }
}
