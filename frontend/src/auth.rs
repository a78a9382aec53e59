//! 认证模块
//!
//! 把会话核心接入 Leptos：核心对象放在 `StoredValue` 里随应用存活，
//! 仓库快照镜像到信号里驱动界面。路由变化时交给会话引导判断是否需要检查。

use std::rc::Rc;

use leptos::prelude::*;
use partsgate::{SessionContext, SessionSnapshot, Subscription};

use crate::components::toast::ToastNotifier;
use crate::config::RuntimeConfig;
use crate::web::router::RouterService;
use crate::web::{BrowserNavigator, BrowserTimers, FetchHttpClient, LeptosSpawner, LocalStorage};

const STORAGE_EMAIL_KEY: &str = "partsgate_last_email";

/// 会话上下文句柄
///
/// 两个字段都是 arena 句柄，可以随意复制进闭包。
#[derive(Clone, Copy)]
pub struct SessionHandle {
    context: StoredValue<SessionContext, leptos::prelude::LocalStorage>,
    snapshot: RwSignal<SessionSnapshot>,
}

impl SessionHandle {
    /// 取出会话上下文（共享同一份状态的廉价克隆）
    pub fn context(&self) -> SessionContext {
        self.context.get_value()
    }

    /// 仓库快照信号
    pub fn snapshot(&self) -> ReadSignal<SessionSnapshot> {
        self.snapshot.read_only()
    }

    /// 上次成功登录的邮箱，仅用于表单自动填充
    pub fn remembered_email(&self) -> String {
        LocalStorage::get(STORAGE_EMAIL_KEY).unwrap_or_default()
    }

    pub fn remember_email(&self, email: &str) {
        if !LocalStorage::set(STORAGE_EMAIL_KEY, email.trim()) {
            log::warn!(target: "partsgate::web", "could not persist last login email");
        }
    }
}

/// 组装会话核心并放入 Context
///
/// 调用方需要先提供路由服务与 Toast 通知器。
pub fn provide_session(
    config: &RuntimeConfig,
    router: RouterService,
    notifier: ToastNotifier,
) -> SessionHandle {
    let context = SessionContext::new(
        config.session_config(),
        Rc::new(FetchHttpClient),
        Rc::new(BrowserNavigator::new(router)),
        Rc::new(notifier),
        Rc::new(BrowserTimers),
        Rc::new(LeptosSpawner),
    );

    let snapshot = RwSignal::new(context.store().snapshot());
    let subscription: Subscription = context.store().subscribe(move |s| snapshot.set(s.clone()));
    // 订阅与引导器随应用存活
    let subscription = StoredValue::new_local(subscription);
    let bootstrap = StoredValue::new_local(context.bootstrap());

    let path = router.path();
    Effect::new(move |_| {
        let path = path.get();
        let decision = bootstrap.with_value(|b| b.on_navigate(&path));
        log::debug!(target: "partsgate::web", "bootstrap on {}: {:?}", path, decision);
    });

    on_cleanup(move || {
        subscription.dispose();
        bootstrap.dispose();
    });

    let handle = SessionHandle {
        context: StoredValue::new_local(context),
        snapshot,
    };
    provide_context(handle);
    handle
}

/// 从 Context 获取会话句柄
pub fn use_session() -> SessionHandle {
    use_context::<SessionHandle>().expect("SessionHandle should be provided")
}
