use leptos::prelude::*;

use crate::auth::use_session;
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// “资源不存在”提示页
///
/// 显示期间占用提示页标记，会话层的延迟登录跳转会让路。
#[component]
pub fn NotFoundPage() -> impl IntoView {
    let claim = use_session().context().interstitial().claim();
    let claim = StoredValue::new_local(claim);
    on_cleanup(move || claim.dispose());

    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"Page not found"</p>
                <Link to=AppRoute::Home.to_path()>"Back to home"</Link>
            </div>
        </div>
    }
}
