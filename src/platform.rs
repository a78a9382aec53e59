//! 平台接缝
//!
//! 会话核心只通过这些 trait 接触浏览器：导航、提示、任务调度。
//! HTTP 与定时器的接缝分别在 `request` 与 `timer` 模块。

use futures::future::LocalBoxFuture;

/// 浏览器地址栏与路由
pub trait Navigator {
    /// 当前路径，不含查询串，例如 `/admin/users`
    fn current_path(&self) -> String;
    /// 当前路径加查询串，用作登录后的返回目标
    fn current_url(&self) -> String;
    /// 应用内导航（history push）
    fn navigate(&self, path: &str);
    /// 整页跳转（location.href），丢弃所有内存状态
    fn hard_redirect(&self, url: &str);
}

/// 面向用户的提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 会话已过期，请重新登录
    SessionExpired,
    /// 已发送重置密码邮件
    PasswordResetRequested,
    PasswordUpdated,
    LoggedOut,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::SessionExpired => "Your session has expired. Please sign in again.",
            Notice::PasswordResetRequested => {
                "If the address is registered, a reset link is on its way."
            }
            Notice::PasswordUpdated => "Your password has been updated.",
            Notice::LoggedOut => "You have been signed out.",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::SessionExpired)
    }
}

/// Toast 通知
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// 单线程任务调度（浏览器事件循环）
pub trait TaskSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
}
