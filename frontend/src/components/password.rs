//! 找回密码与重置密码页面

use leptos::prelude::*;
use leptos::task::spawn_local;
use partsgate::auth::{FIELD_CONFIRMATION, FIELD_EMAIL, FIELD_PASSWORD};

use crate::auth::use_session;
use crate::components::form::{ErrorAlert, FieldHint, FormError};
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let session = use_session();

    let email = RwSignal::new(session.remembered_email());
    let is_submitting = RwSignal::new(false);
    let sent = RwSignal::new(false);
    let error = RwSignal::new(FormError::default());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        is_submitting.set(true);
        error.set(FormError::default());

        let address = email.get_untracked();
        let context = session.context();
        spawn_local(async move {
            match context.actions().forgot_password(&address).await {
                Ok(()) => sent.set(true),
                Err(e) => error.set(FormError::from_error(&e)),
            }
            is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-2xl bg-base-100">
                <Show
                    when=move || !sent.get()
                    fallback=|| view! {
                        <div class="card-body">
                            <p>"Check your inbox for a link to reset your password."</p>
                            <Link to=AppRoute::Login.to_path()>"Back to sign in"</Link>
                        </div>
                    }
                >
                    <form class="card-body" on:submit=on_submit>
                        <h2 class="card-title">"Reset your password"</h2>
                        <ErrorAlert error=error />
                        <input
                            type="email"
                            placeholder="you@example.com"
                            on:input=move |ev| email.set(event_target_value(&ev))
                            prop:value=email
                            class="input input-bordered"
                        />
                        <FieldHint error=error field=FIELD_EMAIL />
                        <button class="btn btn-primary mt-4" disabled=move || is_submitting.get()>
                            "Send reset link"
                        </button>
                    </form>
                </Show>
            </div>
        </div>
    }
}

/// 重置密码页
///
/// 邮件链接给的是临时会话，改完密码后重新读取会话再进入首页。
#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    let session = use_session();
    let router = use_router();

    let password = RwSignal::new(String::new());
    let confirmation = RwSignal::new(String::new());
    let is_submitting = RwSignal::new(false);
    let error = RwSignal::new(FormError::default());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        is_submitting.set(true);
        error.set(FormError::default());

        let (new_password, repeated) = (password.get_untracked(), confirmation.get_untracked());
        let context = session.context();
        spawn_local(async move {
            match context.actions().update_password(&new_password, &repeated).await {
                Ok(_) => router.navigate(context.policy().home_path()),
                Err(e) => error.set(FormError::from_error(&e)),
            }
            is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="card w-full max-w-md shadow-2xl bg-base-100">
                <form class="card-body" on:submit=on_submit>
                    <h2 class="card-title">"Choose a new password"</h2>
                    <ErrorAlert error=error />
                    <input
                        type="password"
                        autocomplete="new-password"
                        placeholder="New password"
                        on:input=move |ev| password.set(event_target_value(&ev))
                        prop:value=password
                        class="input input-bordered"
                    />
                    <FieldHint error=error field=FIELD_PASSWORD />
                    <input
                        type="password"
                        autocomplete="new-password"
                        placeholder="Repeat password"
                        on:input=move |ev| confirmation.set(event_target_value(&ev))
                        prop:value=confirmation
                        class="input input-bordered mt-2"
                    />
                    <FieldHint error=error field=FIELD_CONFIRMATION />
                    <button class="btn btn-primary mt-4" disabled=move || is_submitting.get()>
                        "Update password"
                    </button>
                </form>
            </div>
        </div>
    }
}
