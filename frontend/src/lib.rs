//! PartsGate 前端应用
//!
//! 会话核心（`partsgate` crate）负责所有认证决策，这里只做浏览器接线与视图：
//! - `web`: 平台接缝（fetch、定时器、路由、存储）
//! - `auth`: 会话上下文注入
//! - `components`: UI 组件层

mod auth;
pub mod config;
mod components {
    pub mod form;
    pub mod guards;
    pub mod home;
    pub mod login;
    pub mod not_found;
    pub mod password;
    pub mod toast;
}
mod web;

use leptos::prelude::*;

use crate::auth::provide_session;
use crate::components::guards::{ProtectedRoute, PublicRoute};
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::not_found::NotFoundPage;
use crate::components::password::{ForgotPasswordPage, ResetPasswordPage};
use crate::components::toast::{ToastNotifier, ToastStack};
use crate::config::RuntimeConfig;
use crate::web::route::AppRoute;
use crate::web::router::{RouterOutlet, provide_router};

/// 路由对应的页面
fn page(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::ForgotPassword => view! { <ForgotPasswordPage /> }.into_any(),
        AppRoute::ResetPassword => view! { <ResetPasswordPage /> }.into_any(),
        AppRoute::NotFound => view! { <NotFoundPage /> }.into_any(),
    }
}

/// 路由匹配函数
///
/// 守卫由路由表上的标记决定。重置密码页不套公开页面守卫，临时会话需要留在那里。
fn route_matcher(route: AppRoute) -> AnyView {
    if route.requires_auth() {
        view! { <ProtectedRoute>{move || page(route)}</ProtectedRoute> }.into_any()
    } else if route.redirects_when_authenticated() {
        view! { <PublicRoute>{move || page(route)}</PublicRoute> }.into_any()
    } else {
        page(route)
    }
}

#[component]
pub fn App(config: RuntimeConfig) -> impl IntoView {
    let router = provide_router();
    let notifier = ToastNotifier::new();
    provide_session(&config, router, notifier);

    view! {
        <ToastStack notifier=notifier />
        <RouterOutlet matcher=route_matcher />
    }
}
