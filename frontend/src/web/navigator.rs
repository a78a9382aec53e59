//! 浏览器导航
//!
//! 会话核心的 `Navigator` 实现：应用内导航交给路由服务，整页跳转直接写 `location.href`。

use partsgate::Navigator;

use super::router::{RouterService, browser_location};

#[derive(Clone, Copy)]
pub struct BrowserNavigator {
    router: RouterService,
}

impl BrowserNavigator {
    pub fn new(router: RouterService) -> Self {
        Self { router }
    }
}

impl Navigator for BrowserNavigator {
    fn current_path(&self) -> String {
        browser_location().0
    }

    fn current_url(&self) -> String {
        let (path, search) = browser_location();
        format!("{}{}", path, search)
    }

    fn navigate(&self, path: &str) {
        self.router.navigate(path);
    }

    fn hard_redirect(&self, url: &str) {
        log::info!(target: "partsgate::web", "hard redirect to {}", url);
        let moved = web_sys::window().map(|w| w.location().set_href(url));
        if !matches!(moved, Some(Ok(()))) {
            // 整页跳转失败时至少完成应用内导航
            self.router.navigate(url);
        }
    }
}
