//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API：所有对 window.history 的操作都集中在此模块。
//! 路由本身不做认证判断，守卫逻辑在会话核心里。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;

/// 当前浏览器地址：(pathname, search)，search 带 `?` 前缀或为空
pub fn browser_location() -> (String, String) {
    let location = web_sys::window().map(|w| w.location());
    let path = location
        .as_ref()
        .and_then(|l| l.pathname().ok())
        .unwrap_or_else(|| "/".to_string());
    let search = location
        .as_ref()
        .and_then(|l| l.search().ok())
        .unwrap_or_default();
    (path, search)
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(url));
        }
    }
}

/// 路由器服务
///
/// 当前路径保存在信号里，界面与会话引导都从这里派生。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前 pathname，不含查询串
    path: RwSignal<String>,
}

impl RouterService {
    fn new() -> Self {
        Self {
            path: RwSignal::new(browser_location().0),
        }
    }

    /// 当前路径信号
    pub fn path(&self) -> ReadSignal<String> {
        self.path.read_only()
    }

    pub fn current_route(&self) -> Memo<AppRoute> {
        let path = self.path;
        Memo::new(move |_| AppRoute::from_path(&path.get()))
    }

    /// 应用内导航；`url` 可以带查询串
    pub fn navigate(&self, url: &str) {
        log::debug!(target: "partsgate::web", "navigate to {}", url);
        push_history_state(url);
        // 以浏览器解析后的结果为准，url 可能是相对路径
        self.path.set(browser_location().0);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let path = self.path;

        let closure = Closure::<dyn Fn()>::new(move || {
            path.set(browser_location().0);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }
}

/// 创建路由服务、注册监听并放入 Context
pub fn provide_router() -> RouterService {
    let router = RouterService::new();
    router.init_popstate_listener();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let route = use_router().current_route();

    move || matcher(route.get())
}

/// 应用内链接，拦截点击改走 History
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to on:click=on_click>
            {children()}
        </a>
    }
}
