//! 运行时配置
//!
//! 构建时通过环境变量注入（Trunk 构建时可见），读不到就用默认值。

use log::Level;
use partsgate::{RetryPolicy, SessionConfig};

/// 这些是默认值，如果构建环境中没有定义对应变量，则使用这些值
const DEFAULT_API_BASE: &str = "";
const DEFAULT_LOG_LEVEL: Level = Level::Info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Development,
    Production,
}

impl Profile {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Some(Self::Development),
            "prod" | "production" => Some(Self::Production),
            _ => None,
        }
    }

    fn from_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

/// 运行时配置结构体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub api_base_url: String,
    pub log_level: Level,
    pub profile: Profile,
}

impl RuntimeConfig {
    pub fn load() -> Self {
        Self::from_vars(
            option_env!("PARTSGATE_API_BASE"),
            option_env!("PARTSGATE_LOG_LEVEL"),
            option_env!("PARTSGATE_PROFILE"),
        )
    }

    fn from_vars(api_base: Option<&str>, log_level: Option<&str>, profile: Option<&str>) -> Self {
        Self {
            api_base_url: api_base.unwrap_or(DEFAULT_API_BASE).to_string(),
            log_level: log_level
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_LOG_LEVEL),
            profile: profile
                .and_then(Profile::parse)
                .unwrap_or_else(Profile::from_build),
        }
    }

    /// 开发环境不重试，生产环境最多重试 3 次
    pub fn session_config(&self) -> SessionConfig {
        let retry = match self.profile {
            Profile::Development => RetryPolicy::disabled(),
            Profile::Production => RetryPolicy::production(),
        };
        SessionConfig::default()
            .with_api_base_url(self.api_base_url.clone())
            .with_retry(retry)
    }
}
