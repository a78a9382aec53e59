//! 路由守卫组件
//!
//! 守卫状态机在会话核心里，这里只把它们的状态映射成视图。
//! 守卫对象存放在组件所属的 `StoredValue` 里，组件卸载时一起释放，定时器随之撤销。

use leptos::prelude::*;
use partsgate::{GuardView, PublicGuardState};

use crate::auth::use_session;

#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 受保护页面：检查期间显示加载态，确认未登录后送往登录页
#[component]
pub fn ProtectedRoute(children: ChildrenFn) -> impl IntoView {
    let session = use_session();
    let context = session.context();
    let guard = context.protected_guard();

    let view_state: RwSignal<GuardView> = RwSignal::new(guard.view());
    guard.on_change(move |v| view_state.set(v.clone()));
    let guard = StoredValue::new_local(guard);
    on_cleanup(move || guard.dispose());

    let redirect_context = StoredValue::new_local(context);
    Effect::new(move |_| {
        let v = view_state.get();
        if v.is_loading || v.is_authenticated {
            return;
        }
        redirect_context.with_value(|ctx| {
            let url = ctx.policy().login_redirect_url(&ctx.navigator().current_url());
            log::info!(target: "partsgate::web", "protected page requires sign-in");
            ctx.navigator().navigate(&url);
        });
    });

    move || {
        let v = view_state.get();
        if v.is_authenticated {
            children().into_any()
        } else {
            view! { <Spinner /> }.into_any()
        }
    }
}

/// 公开页面：进入时确认一次会话，已登录则由守卫送往登录后的目标页
#[component]
pub fn PublicRoute(children: ChildrenFn) -> impl IntoView {
    let guard = use_session().context().public_guard();

    let state = RwSignal::new(guard.state());
    guard.on_change(move |s| state.set(s));
    let guard = StoredValue::new_local(guard);
    on_cleanup(move || guard.dispose());

    move || match state.get() {
        PublicGuardState::Checking => view! { <Spinner /> }.into_any(),
        PublicGuardState::Idle | PublicGuardState::Done => children().into_any(),
    }
}
