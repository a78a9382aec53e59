//! 会话状态仓库
//!
//! 内存中唯一的认证状态来源。所有写入都经过 `set_user`、`set_status`、`reset`
//! 三个操作，每次写入后通知订阅者。仓库本身不做 I/O，也不做导航。

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, warn};

use crate::protocol::Person;

/// 会话状态：同一时刻只有一个生效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionStatus {
    Checking,
    Authenticated,
    #[default]
    Unauthenticated,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Checking => "checking",
            SessionStatus::Authenticated => "authenticated",
            SessionStatus::Unauthenticated => "unauthenticated",
        };
        f.write_str(s)
    }
}

/// 对外广播的状态快照
///
/// 不变量：`user.is_some()` 当且仅当 `status == Authenticated`。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub user: Option<Person>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }
}

type Listener = Rc<dyn Fn(&SessionSnapshot)>;

struct StoreInner {
    snapshot: SessionSnapshot,
    next_listener_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// 会话仓库句柄，克隆开销很小，所有克隆共享同一份状态
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl SessionStore {
    /// 应用启动时创建一次，初始状态为 `Unauthenticated`
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                snapshot: SessionSnapshot::default(),
                next_listener_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.borrow().snapshot.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.borrow().snapshot.status
    }

    pub fn user(&self) -> Option<Person> {
        self.inner.borrow().snapshot.user.clone()
    }

    /// 非空用户 => `Authenticated`，空 => `Unauthenticated`
    pub fn set_user(&self, user: Option<Person>) {
        self.mutate(|snapshot| {
            snapshot.status = if user.is_some() {
                SessionStatus::Authenticated
            } else {
                SessionStatus::Unauthenticated
            };
            snapshot.user = user;
        });
    }

    /// 直接设置状态，主要用于短暂的 `Checking`
    ///
    /// 离开 `Authenticated` 时清除当前用户；没有用户时不能进入 `Authenticated`。
    pub fn set_status(&self, status: SessionStatus) {
        if status == SessionStatus::Authenticated && self.inner.borrow().snapshot.user.is_none() {
            warn!(target: "partsgate::store", "ignoring set_status(authenticated) without a current user");
            return;
        }
        self.mutate(|snapshot| {
            snapshot.status = status;
            if status != SessionStatus::Authenticated {
                snapshot.user = None;
            }
        });
    }

    /// 注销、会话过期、401 时调用
    pub fn reset(&self) {
        self.mutate(|snapshot| {
            snapshot.status = SessionStatus::Unauthenticated;
            snapshot.user = None;
        });
    }

    /// 订阅状态变化；返回的 `Subscription` 被 drop 时自动退订
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn mutate(&self, apply: impl FnOnce(&mut SessionSnapshot)) {
        // 先释放借用再回调，监听者可以在回调里再次读写仓库
        let (snapshot, listeners) = {
            let mut inner = self.inner.borrow_mut();
            let before = inner.snapshot.status;
            apply(&mut inner.snapshot);
            debug!(
                target: "partsgate::store",
                "session status {} -> {}",
                before,
                inner.snapshot.status
            );
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| l.clone()).collect();
            (inner.snapshot.clone(), listeners)
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 订阅凭证
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<RefCell<StoreInner>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            if let Ok(mut inner) = inner.try_borrow_mut() {
                inner.listeners.retain(|(id, _)| *id != self.id);
            }
        }
    }
}
