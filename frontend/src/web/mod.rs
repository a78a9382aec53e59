//! 浏览器平台封装模块
//!
//! 会话核心的各个平台接缝在这里落地：fetch、定时器、任务调度、导航与本地存储。

mod http;
mod navigator;
pub mod route;
pub mod router;
mod storage;
mod task;
mod timer;

pub use http::FetchHttpClient;
pub use navigator::BrowserNavigator;
pub use storage::LocalStorage;
pub use task::LeptosSpawner;
pub use timer::BrowserTimers;
