//! 用户主动发起的认证操作
//!
//! 登录、注销、找回密码、修改密码。表单校验在发请求之前完成，
//! 校验失败以 `Error::Validation` 返回，按字段内联展示。

use std::rc::Rc;

use log::{info, warn};

use crate::api::ApiClient;
use crate::coordinator::SessionCoordinator;
use crate::error::{Error, FieldErrors, Result};
use crate::platform::{Navigator, Notice, Notifier};
use crate::policy::SessionPolicy;
use crate::protocol::{Person, SessionPayload};
use crate::store::{SessionStatus, SessionStore};

pub const MIN_PASSWORD_LEN: usize = 8;

pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_CONFIRMATION: &str = "confirmation";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// =========================================================
// 表单校验
// =========================================================

fn check_email(email: &str, errors: &mut FieldErrors) {
    let email = email.trim();
    if email.is_empty() {
        errors.add(FIELD_EMAIL, "Email is required");
        return;
    }
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        errors.add(FIELD_EMAIL, "Enter a valid email address");
    }
}

pub fn validate_email(email: &str) -> Result<()> {
    let mut errors = FieldErrors::new();
    check_email(email, &mut errors);
    errors.into_result()
}

pub fn validate_credentials(credentials: &Credentials) -> Result<()> {
    let mut errors = FieldErrors::new();
    check_email(&credentials.email, &mut errors);
    if credentials.password.is_empty() {
        errors.add(FIELD_PASSWORD, "Password is required");
    }
    errors.into_result()
}

pub fn validate_new_password(password: &str, confirmation: &str) -> Result<()> {
    let mut errors = FieldErrors::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            FIELD_PASSWORD,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
    if password != confirmation {
        errors.add(FIELD_CONFIRMATION, "Passwords do not match");
    }
    errors.into_result()
}

// =========================================================
// 认证操作
// =========================================================

#[derive(Clone)]
pub struct AuthActions {
    store: SessionStore,
    api: Rc<ApiClient>,
    coordinator: SessionCoordinator,
    policy: Rc<SessionPolicy>,
    navigator: Rc<dyn Navigator>,
    notifier: Rc<dyn Notifier>,
}

impl AuthActions {
    pub fn new(
        store: SessionStore,
        api: Rc<ApiClient>,
        coordinator: SessionCoordinator,
        policy: Rc<SessionPolicy>,
        navigator: Rc<dyn Navigator>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            api,
            coordinator,
            policy,
            navigator,
            notifier,
        }
    }

    /// 邮箱密码登录
    ///
    /// 成功后写入仓库；页面跳转交给公开页面守卫，它会读取 `?redirect=`。
    pub async fn login(&self, credentials: Credentials) -> Result<Person> {
        validate_credentials(&credentials)?;
        let email = credentials.email.trim();

        match self.api.login(email, &credentials.password).await? {
            SessionPayload {
                person: Some(person),
            } => {
                info!(target: "partsgate::auth", "signed in as user {}", person.id);
                self.store.set_user(Some(person.clone()));
                Ok(person)
            }
            SessionPayload { person: None } => {
                warn!(target: "partsgate::auth", "login succeeded without a person record");
                self.store.set_status(SessionStatus::Unauthenticated);
                Err(Error::EmptySession)
            }
        }
    }

    /// 注销；后端失败只记录日志，本地状态总会被清理
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(target: "partsgate::auth", "logout request failed: {}", e);
        }
        self.store.reset();
        self.notifier.notify(Notice::LoggedOut);
        self.navigator.navigate(self.policy.login_path());
    }

    /// 申请重置密码邮件，不改变会话
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        validate_email(email)?;
        self.api.forgot_password(email.trim()).await?;
        self.notifier.notify(Notice::PasswordResetRequested);
        Ok(())
    }

    /// 修改密码，然后重新读取会话（临时会话会变为正常会话）
    pub async fn update_password(&self, password: &str, confirmation: &str) -> Result<Person> {
        validate_new_password(password, confirmation)?;
        self.api.update_password(password).await?;
        self.notifier.notify(Notice::PasswordUpdated);
        self.coordinator.refresh().await
    }
}
