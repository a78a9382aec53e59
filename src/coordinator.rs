//! 会话刷新协调器
//!
//! 向后端询问“当前是否有有效会话”，并把答案翻译成仓库上的写入。
//! 重叠的调用共享同一次尝试：同一时间最多只有一个会话检查请求在途，
//! 所有重叠的调用方拿到完全相同的结果。

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use log::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::protocol::{PATH_CURRENT_SESSION, Person, SessionPayload};
use crate::store::{SessionStatus, SessionStore};

type SharedRefresh = Shared<LocalBoxFuture<'static, Result<Person>>>;

struct CoordinatorInner {
    store: SessionStore,
    api: Rc<ApiClient>,
    pending: RefCell<Option<SharedRefresh>>,
    attempts: Cell<u64>,
}

#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Rc<CoordinatorInner>,
}

impl SessionCoordinator {
    pub fn new(store: SessionStore, api: Rc<ApiClient>) -> Self {
        Self {
            inner: Rc::new(CoordinatorInner {
                store,
                api,
                pending: RefCell::new(None),
                attempts: Cell::new(0),
            }),
        }
    }

    /// 刷新会话
    ///
    /// 已有尝试在途时返回同一个结果；尝试结束（无论成败）时清空在途槽位，
    /// 在任何调用方看到结果之前完成，下一次调用会重新发起请求。
    pub fn refresh(&self) -> LocalBoxFuture<'static, Result<Person>> {
        let mut pending = self.inner.pending.borrow_mut();
        if let Some(existing) = pending.as_ref() {
            debug!(target: "partsgate::coordinator", "joining in-flight session check");
            return existing.clone().boxed_local();
        }

        let attempt = self.inner.attempts.get() + 1;
        self.inner.attempts.set(attempt);

        let slot: Weak<CoordinatorInner> = Rc::downgrade(&self.inner);
        let store = self.inner.store.clone();
        let api = self.inner.api.clone();
        let shared = async move {
            let outcome = run_attempt(attempt, &store, &api).await;
            if let Some(inner) = slot.upgrade() {
                inner.pending.borrow_mut().take();
            }
            outcome
        }
        .boxed_local()
        .shared();

        *pending = Some(shared.clone());
        shared.boxed_local()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }

    /// 已发起的检查次数（不含合并进来的调用）
    pub fn attempts(&self) -> u64 {
        self.inner.attempts.get()
    }
}

async fn run_attempt(attempt: u64, store: &SessionStore, api: &ApiClient) -> Result<Person> {
    let before = store.status();
    if before != SessionStatus::Authenticated {
        store.set_status(SessionStatus::Checking);
    }
    debug!(
        target: "partsgate::coordinator",
        "session check #{} started from {}",
        attempt,
        before
    );

    let outcome = match api.current_session().await {
        Ok(SessionPayload {
            person: Some(person),
        }) => {
            store.set_user(Some(person.clone()));
            Ok(person)
        }
        Ok(SessionPayload { person: None }) | Err(Error::Decode(_)) => {
            warn!(
                target: "partsgate::coordinator",
                "session check #{} returned no person record",
                attempt
            );
            store.set_status(SessionStatus::Unauthenticated);
            Err(Error::EmptySession)
        }
        Err(Error::Unauthorized) => {
            // 拦截器通常已经清理过，这里保证结果一致
            if store.snapshot() != Default::default() {
                store.reset();
            }
            Err(Error::Unauthorized)
        }
        Err(Error::NoSession) => Err(Error::NoSession),
        Err(Error::NotFound) => {
            // 会话接口不在 404 白名单时，拦截器会放行，这里补上同一套策略
            api.interceptor().apply_no_session(PATH_CURRENT_SESSION).await;
            Err(Error::NoSession)
        }
        Err(Error::Rejected { status, .. }) => {
            restore_after_transient(store, before);
            Err(Error::Unexpected { status })
        }
        Err(e) => {
            restore_after_transient(store, before);
            Err(e)
        }
    };

    match &outcome {
        Ok(person) => info!(
            target: "partsgate::coordinator",
            "session check #{} confirmed user {}",
            attempt,
            person.id
        ),
        Err(e) => debug!(
            target: "partsgate::coordinator",
            "session check #{} failed: {} ({})",
            attempt,
            e,
            e.kind()
        ),
    }
    outcome
}

/// 瞬时故障不改变登录结论，只撤销本次尝试设置的 `Checking`
fn restore_after_transient(store: &SessionStore, before: SessionStatus) {
    if store.status() != SessionStatus::Checking {
        return;
    }
    let restored = match before {
        SessionStatus::Checking => SessionStatus::Unauthenticated,
        other => other,
    };
    store.set_status(restored);
}
