//! 路由定义模块 - 领域模型
//!
//! 纯粹的路由表，不依赖于 DOM 或 web_sys。
//! 哪些页面需要会话由各页面外层的守卫组件决定，这里只负责路径与页面的对应。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 首页（需要会话）
    #[default]
    Home,
    Login,
    ForgotPassword,
    /// 重置密码：持临时会话的用户在这里设置新密码
    ResetPassword,
    NotFound,
}

impl AppRoute {
    /// 将 URL 解析为路由枚举，忽略查询串、片段与末尾斜杠
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/login" => Self::Login,
            "/password/forgot" => Self::ForgotPassword,
            "/password/reset" => Self::ResetPassword,
            // 邮件里的重置链接可能在路径上带令牌
            p if p.starts_with("/password/reset/") => Self::ResetPassword,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::ForgotPassword => "/password/forgot",
            Self::ResetPassword => "/password/reset",
            Self::NotFound => "/404",
        }
    }

    /// 页面是否包在受保护守卫里
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Home)
    }

    /// 已登录用户访问时是否应被送走
    pub fn redirects_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::ForgotPassword)
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
