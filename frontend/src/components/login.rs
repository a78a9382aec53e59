use leptos::prelude::*;
use leptos::task::spawn_local;
use partsgate::Credentials;
use partsgate::auth::{FIELD_EMAIL, FIELD_PASSWORD};

use crate::auth::use_session;
use crate::components::form::{ErrorAlert, FieldHint, FormError};
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 登录页
///
/// 登录成功只写入会话仓库；跳转由外层公开页面守卫完成，它会读取 `?redirect=`。
#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();

    let email = RwSignal::new(session.remembered_email());
    let password = RwSignal::new(String::new());
    let is_submitting = RwSignal::new(false);
    let error = RwSignal::new(FormError::default());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if is_submitting.get_untracked() {
            return;
        }
        is_submitting.set(true);
        error.set(FormError::default());

        let credentials = Credentials::new(email.get_untracked(), password.get_untracked());
        let context = session.context();
        spawn_local(async move {
            match context.actions().login(credentials).await {
                Ok(person) => {
                    session.remember_email(&person.email);
                    password.set(String::new());
                }
                Err(e) => {
                    log::info!(target: "partsgate::web", "sign-in failed: {}", e);
                    error.set(FormError::from_error(&e));
                }
            }
            is_submitting.set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"PartsGate"</h1>
                    <p class="text-base-content/70">"Sign in to order parts"</p>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <ErrorAlert error=error />

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                autocomplete="username"
                                on:input=move |ev| email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                            />
                            <FieldHint error=error field=FIELD_EMAIL />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                autocomplete="current-password"
                                on:input=move |ev| password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                            />
                            <FieldHint error=error field=FIELD_PASSWORD />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                } else {
                                    "Sign in".into_any()
                                }}
                            </button>
                        </div>
                        <div class="text-sm text-center">
                            <Link to=AppRoute::ForgotPassword.to_path()>"Forgot your password?"</Link>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
