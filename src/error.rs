use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =========================================================
// 错误种类枚举
// =========================================================

/// 错误种类
///
/// 只描述语义，不携带细节，便于日志与分支判断。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// 401: 凭据被拒绝
    Unauthorized,
    /// 404 (会话检查): 不存在活动会话
    NoSession,
    /// 200 但响应中没有用户数据
    EmptySession,
    /// 404 (业务接口): 资源不存在，交给调用方处理
    NotFound,
    /// 4xx: 后端拒绝了请求（参数、业务规则）
    Rejected,
    /// 无法识别的状态码
    Unexpected,
    /// 传输层失败（离线、DNS、CORS 等）
    Network,
    /// 2xx 但响应体无法解析
    Decode,
    /// 客户端表单校验失败
    Validation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::NoSession => "NO_SESSION",
            ErrorKind::EmptySession => "EMPTY_SESSION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Rejected => "REJECTED",
            ErrorKind::Unexpected => "UNEXPECTED_STATUS",
            ErrorKind::Network => "NETWORK",
            ErrorKind::Decode => "DECODE",
            ErrorKind::Validation => "VALIDATION",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =========================================================
// 表单字段错误
// =========================================================

/// 按字段归集的校验错误，表单逐字段内联展示
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 按字段名排序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// 没有错误时返回 `Ok(())`，否则转为 `Error::Validation`
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", field, message)?;
        }
        Ok(())
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端统一错误
///
/// 必须是 `Clone`：同一次会话刷新的结果会被所有并发调用方共享。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("credentials rejected by the server")]
    Unauthorized,
    #[error("no active session")]
    NoSession,
    #[error("session response carried no person record")]
    EmptySession,
    #[error("resource not found")]
    NotFound,
    #[error("request rejected with status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("unexpected status code {status}")]
    Unexpected { status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("invalid input: {0}")]
    Validation(FieldErrors),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Unauthorized => ErrorKind::Unauthorized,
            Error::NoSession => ErrorKind::NoSession,
            Error::EmptySession => ErrorKind::EmptySession,
            Error::NotFound => ErrorKind::NotFound,
            Error::Rejected { .. } => ErrorKind::Rejected,
            Error::Unexpected { .. } => ErrorKind::Unexpected,
            Error::Network(_) => ErrorKind::Network,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Validation(_) => ErrorKind::Validation,
        }
    }

    /// 只有瞬时故障才值得重试：网络错误与 5xx
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Unexpected { status } => *status >= 500,
            _ => false,
        }
    }

    /// 瞬时故障不会改变登录状态，也不向最终用户展示
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Unexpected { .. })
    }

    pub fn network(message: impl fmt::Display) -> Self {
        Error::Network(message.to_string())
    }

    pub fn decode(message: impl fmt::Display) -> Self {
        Error::Decode(message.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::decode(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_only_for_transient_server_failures() {
        assert!(Error::network("offline").is_retryable());
        assert!(Error::Unexpected { status: 503 }.is_retryable());
        assert!(!Error::Unexpected { status: 418 }.is_retryable());
        assert!(!Error::Unauthorized.is_retryable());
        assert!(!Error::NoSession.is_retryable());
        assert!(!Error::EmptySession.is_retryable());
    }

    #[test]
    fn test_rejected_display_includes_message() {
        let e = Error::Rejected {
            status: 400,
            message: Some("email already registered".into()),
        };
        assert_eq!(
            e.to_string(),
            "request rejected with status 400: email already registered"
        );
        let bare = Error::Rejected {
            status: 409,
            message: None,
        };
        assert_eq!(bare.to_string(), "request rejected with status 409");
    }

    #[test]
    fn test_field_errors_keep_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("email", "required");
        errors.add("email", "invalid");
        errors.add("password", "required");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("required"));
        assert_eq!(
            errors.into_result().unwrap_err().kind(),
            ErrorKind::Validation
        );
    }
}
