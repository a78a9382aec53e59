//! 会话层配置
//!
//! 所有字段都有默认值，部署时只需要覆盖差异部分。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::protocol::PATH_CURRENT_SESSION;

// =========================================================
// 默认值
// =========================================================

const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_HOME_PATH: &str = "/";
const DEFAULT_GUARD_SETTLE_TIMEOUT_MS: u64 = 3_000;
const DEFAULT_NOT_FOUND_GRACE_MS: u64 = 300;
const DEFAULT_REDIRECT_GRACE_MS: u64 = 500;

/// 无需会话即可访问的页面（登录、注册、找回密码）
pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &[
    "/login",
    "/password/forgot",
    "/password/reset",
    "/registration/shop",
    "/registration/dealership",
    "/registration/complete",
    "/registrationResult",
];

// =========================================================
// 重试策略
// =========================================================

/// 数据查询层的重试策略
///
/// 开发环境与生产环境的差异以配置表达，而不是硬编码的环境分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_ms: u64,
}

impl RetryPolicy {
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            backoff_ms: 0,
        }
    }

    pub fn production() -> Self {
        Self {
            max_retries: 3,
            backoff_ms: 1_000,
        }
    }

    /// 第 `attempt` 次重试（从 1 开始）前的等待时间，线性退避
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::production()
    }
}

// =========================================================
// 会话配置
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 后端地址；为空表示同源
    pub api_base_url: String,
    pub login_path: String,
    pub home_path: String,
    /// 公开页面白名单（精确匹配或子路径）
    pub public_routes: Vec<String>,
    /// 404 代表“没有会话”的接口（按路径子串匹配）
    pub auth_required_404_endpoints: Vec<String>,
    /// 受保护页面守卫在“没有消息”时认定检查结束的等待时间
    pub guard_settle_timeout_ms: u64,
    /// 延迟清理会话前留给“资源不存在”提示页的时间
    pub not_found_grace_ms: u64,
    /// NoSession 之后跳转登录页前的等待时间
    pub redirect_grace_ms: u64,
    pub retry: RetryPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
            public_routes: DEFAULT_PUBLIC_ROUTES.iter().map(|s| s.to_string()).collect(),
            auth_required_404_endpoints: vec![PATH_CURRENT_SESSION.to_string()],
            guard_settle_timeout_ms: DEFAULT_GUARD_SETTLE_TIMEOUT_MS,
            not_found_grace_ms: DEFAULT_NOT_FOUND_GRACE_MS,
            redirect_grace_ms: DEFAULT_REDIRECT_GRACE_MS,
            retry: RetryPolicy::default(),
        }
    }
}

impl SessionConfig {
    /// 从 JSON 文档加载，缺省字段使用默认值
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::decode(format!("invalid session config: {}", e)))
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn guard_settle_timeout(&self) -> Duration {
        Duration::from_millis(self.guard_settle_timeout_ms)
    }

    pub fn not_found_grace(&self) -> Duration {
        Duration::from_millis(self.not_found_grace_ms)
    }

    pub fn redirect_grace(&self) -> Duration {
        Duration::from_millis(self.redirect_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json_str(
            r#"{"api_base_url":"https://api.example","retry":{"max_retries":0}}"#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.example");
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.retry.backoff_ms, RetryPolicy::production().backoff_ms);
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.public_routes.len(), DEFAULT_PUBLIC_ROUTES.len());
        assert_eq!(config.auth_required_404_endpoints, vec![PATH_CURRENT_SESSION]);
    }

    #[test]
    fn test_invalid_json_is_a_decode_error() {
        let err = SessionConfig::from_json_str("{not json").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Decode);
    }

    #[test]
    fn test_backoff_is_linear() {
        let policy = RetryPolicy::production();
        assert_eq!(policy.backoff(1), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(3), Duration::from_millis(3_000));
        assert_eq!(RetryPolicy::disabled().backoff(2), Duration::ZERO);
    }
}
