//! 响应拦截层
//!
//! 每个 API 响应在交给调用方之前都要经过这里：
//! 401 立即清理会话并跳转登录页，白名单接口的 404 按“没有会话”处理，其余原样放行。

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::platform::{Navigator, Notice, Notifier};
use crate::policy::{NotFoundAction, SessionPolicy};
use crate::protocol::PATH_LOGOUT;
use crate::request::HttpResponse;
use crate::store::{SessionStatus, SessionStore, Subscription};
use crate::timer::{TimerDriver, sleep};

#[derive(Clone)]
pub struct Interceptor {
    store: SessionStore,
    policy: Rc<SessionPolicy>,
    navigator: Rc<dyn Navigator>,
    notifier: Rc<dyn Notifier>,
    timers: Rc<dyn TimerDriver>,
    not_found_grace: Duration,
    /// 整页跳转会丢弃所有内存状态，在那之前只跳一次；重新登录后复位
    expiry_redirect_issued: Rc<Cell<bool>>,
    _sign_in_watch: Rc<Subscription>,
}

impl Interceptor {
    pub fn new(
        store: SessionStore,
        policy: Rc<SessionPolicy>,
        navigator: Rc<dyn Navigator>,
        notifier: Rc<dyn Notifier>,
        timers: Rc<dyn TimerDriver>,
        not_found_grace: Duration,
    ) -> Self {
        let expiry_redirect_issued = Rc::new(Cell::new(false));
        let issued = expiry_redirect_issued.clone();
        let sign_in_watch = store.subscribe(move |snapshot| {
            if snapshot.is_authenticated() {
                issued.set(false);
            }
        });

        Self {
            store,
            policy,
            navigator,
            notifier,
            timers,
            not_found_grace,
            expiry_redirect_issued,
            _sign_in_watch: Rc::new(sign_in_watch),
        }
    }

    /// 检查一个已送达的响应
    ///
    /// 返回 `Ok` 表示放行，调用方继续按状态码处理。
    pub async fn inspect(&self, endpoint: &str, response: HttpResponse) -> Result<HttpResponse> {
        match response.status {
            401 => {
                self.on_unauthorized(endpoint);
                Err(Error::Unauthorized)
            }
            404 if self.policy.requires_auth_on_not_found(endpoint) => {
                self.apply_no_session(endpoint).await;
                Err(Error::NoSession)
            }
            _ => Ok(response),
        }
    }

    /// 对“没有会话”执行清理策略，完成后返回
    ///
    /// 延迟清理时会先等待一段宽限期，让“资源不存在”提示页先接管。
    pub async fn apply_no_session(&self, endpoint: &str) {
        let page = self.navigator.current_path();
        match self.policy.classify_not_found(&page, endpoint) {
            NotFoundAction::ExpectedOnPublicPage => {
                debug!(
                    target: "partsgate::interceptor",
                    "no session on public page {}, as expected",
                    page
                );
                self.store.set_status(SessionStatus::Unauthenticated);
            }
            NotFoundAction::Immediate => {
                info!(
                    target: "partsgate::interceptor",
                    "no session for {} on {}, clearing",
                    endpoint,
                    page
                );
                self.store.reset();
            }
            NotFoundAction::Deferred => {
                debug!(
                    target: "partsgate::interceptor",
                    "no session for {} on {}, clearing after {:?}",
                    endpoint,
                    page,
                    self.not_found_grace
                );
                sleep(self.timers.as_ref(), self.not_found_grace).await;
                self.store.reset();
            }
        }
    }

    fn on_unauthorized(&self, endpoint: &str) {
        self.store.reset();

        if endpoint == PATH_LOGOUT {
            // 注销流程自己负责提示与导航
            debug!(target: "partsgate::interceptor", "401 from logout, session already gone");
            return;
        }

        let page = self.navigator.current_path();
        if self.policy.is_public_route(&page) {
            // 已经在公开页面，跳转只会形成循环
            debug!(
                target: "partsgate::interceptor",
                "401 from {} on public page {}",
                endpoint,
                page
            );
            return;
        }

        if self.expiry_redirect_issued.replace(true) {
            return;
        }

        warn!(
            target: "partsgate::interceptor",
            "401 from {}, session expired on {}",
            endpoint,
            page
        );
        self.notifier.notify(Notice::SessionExpired);
        let target = self.policy.login_redirect_url(&self.navigator.current_url());
        self.navigator.hard_redirect(&target);
    }
}
