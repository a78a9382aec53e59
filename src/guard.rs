//! 路由守卫
//!
//! 两个独立的状态机，都只依赖会话状态和各自的本地状态：
//! - `ProtectedGuard`：受保护页面，结论出来之前一直处于加载中，不闪现受保护内容
//! - `PublicPageGuard`：公开页面，已登录则跳走；未登录时每次挂载最多检查一次
//!
//! 守卫被 drop 即视为卸载：退订仓库、撤销定时器，迟到的结果被忽略。

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use log::debug;

use crate::coordinator::SessionCoordinator;
use crate::platform::{Navigator, TaskSpawner};
use crate::policy::SessionPolicy;
use crate::protocol::Person;
use crate::store::{SessionSnapshot, SessionStatus, SessionStore, Subscription};
use crate::timer::{TimerDriver, TimerHandle};

/// 守卫对外暴露的视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardView {
    pub is_authenticated: bool,
    /// 为真时页面只能渲染加载占位
    pub is_loading: bool,
    pub user: Option<Person>,
}

type ViewListener = Rc<dyn Fn(&GuardView)>;

// =========================================================
// 受保护页面守卫
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectedState {
    Pending,
    Settled,
}

struct ProtectedInner {
    state: ProtectedState,
    snapshot: SessionSnapshot,
    timers: Rc<dyn TimerDriver>,
    settle_timeout: Duration,
    /// 兜底定时器：状态不是 `Checking` 却迟迟没有结论时，超时后认定检查结束
    settle_timer: Option<TimerHandle>,
    listeners: Vec<ViewListener>,
}

impl ProtectedInner {
    fn view(&self) -> GuardView {
        GuardView {
            is_authenticated: self.snapshot.status == SessionStatus::Authenticated,
            is_loading: self.state == ProtectedState::Pending
                || self.snapshot.status == SessionStatus::Checking,
            user: self.snapshot.user.clone(),
        }
    }
}

pub struct ProtectedGuard {
    inner: Rc<RefCell<ProtectedInner>>,
    _subscription: Subscription,
}

impl ProtectedGuard {
    pub fn new(
        store: &SessionStore,
        timers: Rc<dyn TimerDriver>,
        settle_timeout: Duration,
    ) -> Self {
        let inner = Rc::new(RefCell::new(ProtectedInner {
            state: ProtectedState::Pending,
            snapshot: store.snapshot(),
            timers,
            settle_timeout,
            settle_timer: None,
            listeners: Vec::new(),
        }));

        let weak = Rc::downgrade(&inner);
        let subscription = store.subscribe(move |snapshot| {
            if let Some(inner) = weak.upgrade() {
                apply_snapshot(&inner, snapshot.clone());
            }
        });
        evaluate(&inner);

        Self {
            inner,
            _subscription: subscription,
        }
    }

    pub fn state(&self) -> ProtectedState {
        self.inner.borrow().state
    }

    pub fn view(&self) -> GuardView {
        self.inner.borrow().view()
    }

    /// 视图变化时回调，随守卫一起释放
    pub fn on_change(&self, listener: impl Fn(&GuardView) + 'static) {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }
}

fn apply_snapshot(inner: &Rc<RefCell<ProtectedInner>>, snapshot: SessionSnapshot) {
    let before = inner.borrow().view();
    inner.borrow_mut().snapshot = snapshot;
    evaluate(inner);
    notify_if_changed(inner, before);
}

/// 根据当前快照推进状态机、布置或撤销兜底定时器
fn evaluate(inner: &Rc<RefCell<ProtectedInner>>) {
    let mut guard = inner.borrow_mut();
    if guard.state == ProtectedState::Settled {
        return;
    }
    match guard.snapshot.status {
        SessionStatus::Authenticated => {
            guard.state = ProtectedState::Settled;
            guard.settle_timer = None;
        }
        SessionStatus::Checking => {
            guard.settle_timer = None;
        }
        SessionStatus::Unauthenticated => {
            if guard.settle_timer.is_none() {
                let weak = Rc::downgrade(inner);
                let handle = guard.timers.schedule(
                    guard.settle_timeout,
                    Box::new(move || settle_after_timeout(weak)),
                );
                guard.settle_timer = Some(handle);
            }
        }
    }
}

fn settle_after_timeout(weak: Weak<RefCell<ProtectedInner>>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let before = inner.borrow().view();
    let expired = {
        let mut guard = inner.borrow_mut();
        if guard.state == ProtectedState::Pending {
            guard.state = ProtectedState::Settled;
            guard.settle_timer.take()
        } else {
            None
        }
    };
    if let Some(handle) = expired {
        debug!(target: "partsgate::guard", "protected guard settled by timeout");
        handle.disarm();
    }
    notify_if_changed(&inner, before);
}

fn notify_if_changed(inner: &Rc<RefCell<ProtectedInner>>, before: GuardView) {
    let (view, listeners) = {
        let guard = inner.borrow();
        (guard.view(), guard.listeners.clone())
    };
    if view == before {
        return;
    }
    for listener in listeners {
        listener(&view);
    }
}

// =========================================================
// 公开页面守卫
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicGuardState {
    /// 挂载后尚未检查
    Idle,
    /// 本次挂载发起的检查在途
    Checking,
    Done,
}

struct PublicInner {
    state: PublicGuardState,
    redirected: bool,
    listeners: Vec<Rc<dyn Fn(PublicGuardState)>>,
}

/// 公开页面守卫依赖的服务
#[derive(Clone)]
pub struct PublicGuardDeps {
    pub store: SessionStore,
    pub coordinator: SessionCoordinator,
    pub policy: Rc<SessionPolicy>,
    pub navigator: Rc<dyn Navigator>,
    pub spawner: Rc<dyn TaskSpawner>,
}

enum PublicAction {
    None,
    Redirect,
    Check,
}

pub struct PublicPageGuard {
    inner: Rc<RefCell<PublicInner>>,
    _subscription: Subscription,
}

impl PublicPageGuard {
    pub fn new(deps: PublicGuardDeps) -> Self {
        let inner = Rc::new(RefCell::new(PublicInner {
            state: PublicGuardState::Idle,
            redirected: false,
            listeners: Vec::new(),
        }));

        let weak = Rc::downgrade(&inner);
        let listener_deps = deps.clone();
        let subscription = deps.store.subscribe(move |snapshot| {
            if let Some(inner) = weak.upgrade() {
                step(&inner, &listener_deps, snapshot.status);
            }
        });
        step(&inner, &deps, deps.store.status());

        Self {
            inner,
            _subscription: subscription,
        }
    }

    pub fn state(&self) -> PublicGuardState {
        self.inner.borrow().state
    }

    pub fn on_change(&self, listener: impl Fn(PublicGuardState) + 'static) {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }
}

fn step(inner: &Rc<RefCell<PublicInner>>, deps: &PublicGuardDeps, status: SessionStatus) {
    let before = inner.borrow().state;
    let action = {
        let mut guard = inner.borrow_mut();
        match status {
            SessionStatus::Authenticated => {
                guard.state = PublicGuardState::Done;
                if guard.redirected {
                    PublicAction::None
                } else {
                    guard.redirected = true;
                    PublicAction::Redirect
                }
            }
            // 只有 Idle 能发起检查，重复渲染不会再次发起
            SessionStatus::Unauthenticated if guard.state == PublicGuardState::Idle => {
                guard.state = PublicGuardState::Checking;
                PublicAction::Check
            }
            _ => PublicAction::None,
        }
    };

    match action {
        PublicAction::None => {}
        PublicAction::Redirect => {
            let target = deps
                .policy
                .post_login_target(&deps.navigator.current_url());
            debug!(
                target: "partsgate::guard",
                "already signed in on a public page, leaving for {}",
                target
            );
            deps.navigator.navigate(&target);
        }
        PublicAction::Check => {
            let weak = Rc::downgrade(inner);
            let refresh = deps.coordinator.refresh();
            deps.spawner.spawn_local(Box::pin(async move {
                let outcome = refresh.await;
                // 卸载后到达的结果直接忽略
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let Err(e) = &outcome {
                    debug!(target: "partsgate::guard", "public page check finished: {}", e);
                }
                let before = inner.borrow().state;
                inner.borrow_mut().state = PublicGuardState::Done;
                notify_public(&inner, before);
            }));
        }
    }
    notify_public(inner, before);
}

fn notify_public(inner: &Rc<RefCell<PublicInner>>, before: PublicGuardState) {
    let (state, listeners) = {
        let guard = inner.borrow();
        (guard.state, guard.listeners.clone())
    };
    if state == before {
        return;
    }
    for listener in listeners {
        listener(state);
    }
}
