//! 定时器抽象
//!
//! 一次性、可取消的定时器：`TimerHandle` 被 drop 时自动撤销。
//! 浏览器端由 `setTimeout` 实现，测试里由手动推进的时钟实现。

use std::time::Duration;

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;

/// 定时器驱动
pub trait TimerDriver {
    /// 在 `delay` 之后调用一次 `callback`
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle;
}

/// 定时器句柄，drop 即撤销
#[must_use = "dropping a TimerHandle disarms the timer"]
pub struct TimerHandle {
    disarm: Option<Box<dyn FnOnce()>>,
}

impl TimerHandle {
    pub fn new(disarm: impl FnOnce() + 'static) -> Self {
        Self {
            disarm: Some(Box::new(disarm)),
        }
    }

    /// 不需要撤销动作的句柄（例如回调已经执行过）
    pub fn inert() -> Self {
        Self { disarm: None }
    }

    pub fn disarm(mut self) {
        self.run_disarm();
    }

    fn run_disarm(&mut self) {
        if let Some(disarm) = self.disarm.take() {
            disarm();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.run_disarm();
    }
}

/// 基于定时器驱动的异步等待；future 被 drop 时定时器随之撤销
pub fn sleep(timers: &dyn TimerDriver, delay: Duration) -> LocalBoxFuture<'static, ()> {
    let (tx, rx) = oneshot::channel::<()>();
    let handle = timers.schedule(
        delay,
        Box::new(move || {
            let _ = tx.send(());
        }),
    );
    Box::pin(async move {
        let _handle = handle;
        let _ = rx.await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualTimers;
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_dropping_handle_disarms_timer() {
        let timers = ManualTimers::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let handle = timers.schedule(Duration::from_millis(10), Box::new(move || flag.set(true)));
        drop(handle);
        timers.advance(Duration::from_millis(50));
        assert!(!fired.get());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_sleep_completes_after_advance() {
        let timers = ManualTimers::new();
        let mut pool = LocalPool::new();
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        let fut = sleep(&timers, Duration::from_millis(100));
        pool.spawner()
            .spawn_local(async move {
                fut.await;
                flag.set(true);
            })
            .unwrap();

        pool.run_until_stalled();
        timers.advance(Duration::from_millis(99));
        pool.run_until_stalled();
        assert!(!done.get());

        timers.advance(Duration::from_millis(1));
        pool.run_until_stalled();
        assert!(done.get());
    }
}
