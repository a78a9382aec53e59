//! 会话上下文
//!
//! 依赖注入容器：应用启动时创建一次，持有仓库、策略、API 客户端、协调器与平台接缝。
//! 守卫与启动检查都从这里创建，测试里每个用例各自创建一份，互不干扰。

use std::rc::Rc;

use crate::api::ApiClient;
use crate::auth::AuthActions;
use crate::bootstrap::{Bootstrap, BootstrapDeps};
use crate::config::SessionConfig;
use crate::coordinator::SessionCoordinator;
use crate::guard::{ProtectedGuard, PublicGuardDeps, PublicPageGuard};
use crate::interceptor::Interceptor;
use crate::interstitial::NotFoundInterstitial;
use crate::platform::{Navigator, Notifier, TaskSpawner};
use crate::policy::SessionPolicy;
use crate::request::HttpClient;
use crate::store::SessionStore;
use crate::timer::TimerDriver;

struct ContextInner {
    config: SessionConfig,
    store: SessionStore,
    policy: Rc<SessionPolicy>,
    interstitial: NotFoundInterstitial,
    api: Rc<ApiClient>,
    coordinator: SessionCoordinator,
    actions: AuthActions,
    navigator: Rc<dyn Navigator>,
    notifier: Rc<dyn Notifier>,
    timers: Rc<dyn TimerDriver>,
    spawner: Rc<dyn TaskSpawner>,
}

#[derive(Clone)]
pub struct SessionContext {
    inner: Rc<ContextInner>,
}

impl SessionContext {
    pub fn new(
        config: SessionConfig,
        http: Rc<dyn HttpClient>,
        navigator: Rc<dyn Navigator>,
        notifier: Rc<dyn Notifier>,
        timers: Rc<dyn TimerDriver>,
        spawner: Rc<dyn TaskSpawner>,
    ) -> Self {
        let store = SessionStore::new();
        let policy = Rc::new(SessionPolicy::new(&config));
        let interceptor = Interceptor::new(
            store.clone(),
            policy.clone(),
            navigator.clone(),
            notifier.clone(),
            timers.clone(),
            config.not_found_grace(),
        );
        let api = Rc::new(ApiClient::new(
            config.api_base_url.clone(),
            http,
            interceptor,
            timers.clone(),
            config.retry,
        ));
        let coordinator = SessionCoordinator::new(store.clone(), api.clone());
        let actions = AuthActions::new(
            store.clone(),
            api.clone(),
            coordinator.clone(),
            policy.clone(),
            navigator.clone(),
            notifier.clone(),
        );

        Self {
            inner: Rc::new(ContextInner {
                config,
                store,
                policy,
                interstitial: NotFoundInterstitial::new(),
                api,
                coordinator,
                actions,
                navigator,
                notifier,
                timers,
                spawner,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.inner.policy
    }

    pub fn interstitial(&self) -> &NotFoundInterstitial {
        &self.inner.interstitial
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn coordinator(&self) -> &SessionCoordinator {
        &self.inner.coordinator
    }

    pub fn actions(&self) -> &AuthActions {
        &self.inner.actions
    }

    pub fn navigator(&self) -> &Rc<dyn Navigator> {
        &self.inner.navigator
    }

    pub fn notifier(&self) -> &Rc<dyn Notifier> {
        &self.inner.notifier
    }

    pub fn protected_guard(&self) -> ProtectedGuard {
        ProtectedGuard::new(
            &self.inner.store,
            self.inner.timers.clone(),
            self.inner.config.guard_settle_timeout(),
        )
    }

    pub fn public_guard(&self) -> PublicPageGuard {
        PublicPageGuard::new(PublicGuardDeps {
            store: self.inner.store.clone(),
            coordinator: self.inner.coordinator.clone(),
            policy: self.inner.policy.clone(),
            navigator: self.inner.navigator.clone(),
            spawner: self.inner.spawner.clone(),
        })
    }

    pub fn bootstrap(&self) -> Bootstrap {
        Bootstrap::new(BootstrapDeps {
            store: self.inner.store.clone(),
            policy: self.inner.policy.clone(),
            coordinator: self.inner.coordinator.clone(),
            navigator: self.inner.navigator.clone(),
            interstitial: self.inner.interstitial.clone(),
            timers: self.inner.timers.clone(),
            spawner: self.inner.spawner.clone(),
            redirect_grace: self.inner.config.redirect_grace(),
        })
    }
}
