//! 启动检查
//!
//! 挂在应用根部，每次路径变化执行一次，决定当前页面是否需要会话检查。

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use log::{debug, info};

use crate::coordinator::SessionCoordinator;
use crate::error::Error;
use crate::interstitial::NotFoundInterstitial;
use crate::platform::{Navigator, TaskSpawner};
use crate::policy::SessionPolicy;
use crate::store::{SessionStatus, SessionStore};
use crate::timer::{TimerDriver, TimerHandle};

/// 一次路径变化的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapDecision {
    /// 路径没有变化
    Unchanged,
    /// 公开页面，不发请求
    SkippedPublic,
    /// 已登录或检查已在途
    AlreadySettled,
    /// 发起了会话检查
    Refreshing,
}

#[derive(Clone)]
pub struct BootstrapDeps {
    pub store: SessionStore,
    pub policy: Rc<SessionPolicy>,
    pub coordinator: SessionCoordinator,
    pub navigator: Rc<dyn Navigator>,
    pub interstitial: NotFoundInterstitial,
    pub timers: Rc<dyn TimerDriver>,
    pub spawner: Rc<dyn TaskSpawner>,
    pub redirect_grace: Duration,
}

struct BootstrapInner {
    deps: BootstrapDeps,
    last_path: RefCell<Option<String>>,
    /// 同一时间最多只有一个待执行的登录跳转
    pending_redirect: RefCell<Option<TimerHandle>>,
}

pub struct Bootstrap {
    inner: Rc<BootstrapInner>,
}

impl Bootstrap {
    pub fn new(deps: BootstrapDeps) -> Self {
        Self {
            inner: Rc::new(BootstrapInner {
                deps,
                last_path: RefCell::new(None),
                pending_redirect: RefCell::new(None),
            }),
        }
    }

    pub fn on_navigate(&self, path: &str) -> BootstrapDecision {
        {
            let mut last = self.inner.last_path.borrow_mut();
            if last.as_deref() == Some(path) {
                return BootstrapDecision::Unchanged;
            }
            *last = Some(path.to_string());
        }

        let deps = &self.inner.deps;
        let status = deps.store.status();

        if deps.policy.is_public_route(path) {
            if status == SessionStatus::Checking {
                deps.store.set_status(SessionStatus::Unauthenticated);
            }
            debug!(target: "partsgate::bootstrap", "{} is public, skipping session check", path);
            return BootstrapDecision::SkippedPublic;
        }

        if status != SessionStatus::Unauthenticated {
            return BootstrapDecision::AlreadySettled;
        }

        debug!(target: "partsgate::bootstrap", "checking session for {}", path);
        let refresh = deps.coordinator.refresh();
        let weak = Rc::downgrade(&self.inner);
        deps.spawner.spawn_local(Box::pin(async move {
            if let Err(Error::NoSession) = refresh.await {
                if let Some(inner) = weak.upgrade() {
                    schedule_login_redirect(&inner);
                }
            }
        }));
        BootstrapDecision::Refreshing
    }

    pub fn has_pending_redirect(&self) -> bool {
        self.inner.pending_redirect.borrow().is_some()
    }
}

fn schedule_login_redirect(inner: &Rc<BootstrapInner>) {
    let mut pending = inner.pending_redirect.borrow_mut();
    if pending.is_some() {
        return;
    }
    let weak: Weak<BootstrapInner> = Rc::downgrade(inner);
    let handle = inner.deps.timers.schedule(
        inner.deps.redirect_grace,
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                redirect_to_login(&inner);
            }
        }),
    );
    *pending = Some(handle);
}

fn redirect_to_login(inner: &BootstrapInner) {
    if let Some(handle) = inner.pending_redirect.borrow_mut().take() {
        handle.disarm();
    }

    let deps = &inner.deps;
    if deps.interstitial.is_displayed() {
        debug!(
            target: "partsgate::bootstrap",
            "not-found interstitial is showing, skipping login redirect"
        );
        return;
    }
    let path = deps.navigator.current_path();
    if deps.policy.is_public_route(&path) {
        debug!(target: "partsgate::bootstrap", "already on public page {}", path);
        return;
    }
    if deps.store.status() == SessionStatus::Authenticated {
        return;
    }

    let target = deps.policy.login_redirect_url(&deps.navigator.current_url());
    info!(target: "partsgate::bootstrap", "no session, redirecting to {}", target);
    deps.navigator.hard_redirect(&target);
}
