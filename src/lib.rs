//! PartsGate 会话核心
//!
//! 浏览器端会话引导层，与 UI 框架无关：
//! - `store`: 会话状态仓库
//! - `coordinator`: 合并重叠调用的会话刷新
//! - `guard`: 受保护页面与公开页面的路由守卫
//! - `bootstrap`: 路径变化时的启动检查
//! - `interceptor` / `policy`: 401 与 404 的统一处理
//! - `api` / `auth`: 后端接口与用户操作
//!
//! 浏览器能力（HTTP、定时器、导航、提示、任务调度）通过 trait 注入，
//! 见 `request`、`timer`、`platform`；`context::SessionContext` 负责装配。

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod guard;
pub mod interceptor;
pub mod interstitial;
pub mod platform;
pub mod policy;
pub mod protocol;
pub mod request;
pub mod store;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthActions, Credentials};
pub use bootstrap::{Bootstrap, BootstrapDecision};
pub use config::{RetryPolicy, SessionConfig};
pub use context::SessionContext;
pub use coordinator::SessionCoordinator;
pub use error::{Error, ErrorKind, FieldErrors, Result};
pub use guard::{GuardView, ProtectedGuard, ProtectedState, PublicGuardState, PublicPageGuard};
pub use interstitial::{InterstitialClaim, NotFoundInterstitial};
pub use platform::{Navigator, Notice, Notifier, TaskSpawner};
pub use protocol::{AccountStatus, Person, Role};
pub use store::{SessionSnapshot, SessionStatus, SessionStore, Subscription};
pub use timer::{TimerDriver, TimerHandle};
