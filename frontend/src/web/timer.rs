//! 定时器封装模块
//!
//! 基于 `gloo-timers` 的一次性定时器，实现会话核心的 `TimerDriver`。

use std::time::Duration;

use gloo_timers::callback::Timeout;
use partsgate::{TimerDriver, TimerHandle};

/// 浏览器 `setTimeout` 驱动
///
/// 句柄被 drop 时 `Timeout` 随之 drop，`clearTimeout` 自动执行。
#[derive(Clone, Copy, Default)]
pub struct BrowserTimers;

impl TimerDriver for BrowserTimers {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let timeout = Timeout::new(millis, callback);
        TimerHandle::new(move || drop(timeout))
    }
}
