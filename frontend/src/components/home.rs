use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_session;

/// 首页：显示当前账户，提供注销
#[component]
pub fn HomePage() -> impl IntoView {
    let session = use_session();
    let snapshot = session.snapshot();

    let name = move || {
        snapshot.with(|s| s.user.as_ref().map(|p| p.display_name()).unwrap_or_default())
    };
    let organization = move || {
        snapshot.with(|s| {
            s.user
                .as_ref()
                .and_then(|p| p.organization().map(str::to_string))
                .unwrap_or_default()
        })
    };

    let on_logout = move |_| {
        let context = session.context();
        spawn_local(async move {
            context.actions().logout().await;
        });
    };

    view! {
        <div class="min-h-screen bg-base-200">
            <div class="navbar bg-base-100 shadow">
                <div class="flex-1 px-4 text-xl font-bold">"PartsGate"</div>
                <div class="flex-none gap-2 px-4">
                    <span class="text-sm">{name}</span>
                    <button class="btn btn-ghost btn-sm" on:click=on_logout>"Sign out"</button>
                </div>
            </div>
            <main class="p-8">
                <h1 class="text-2xl font-bold">"Welcome back"</h1>
                <p class="text-base-content/70">{organization}</p>
            </main>
        </div>
    }
}
