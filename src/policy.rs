//! 会话策略：公开页面白名单、404 归类、登录跳转地址
//!
//! 纯函数层，不依赖浏览器，也不修改状态。

use crate::config::SessionConfig;

/// 404 之后应当如何处理会话
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundAction {
    /// 当前在公开页面：没有会话是预期内的，只把状态置为未认证
    ExpectedOnPublicPage,
    /// 受保护页面 + 需要认证的接口：先让“资源不存在”提示页接管，稍后再清理
    Deferred,
    /// 受保护页面 + 普通接口：立即清理
    Immediate,
}

#[derive(Debug, Clone)]
pub struct SessionPolicy {
    public_routes: Vec<String>,
    auth_required_404_endpoints: Vec<String>,
    login_path: String,
    home_path: String,
}

impl SessionPolicy {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            public_routes: config.public_routes.clone(),
            auth_required_404_endpoints: config.auth_required_404_endpoints.clone(),
            login_path: config.login_path.clone(),
            home_path: config.home_path.clone(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// 精确匹配或子路径匹配；查询串与片段不参与匹配
    pub fn is_public_route(&self, path: &str) -> bool {
        let path = strip_query(path);
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        self.public_routes.iter().any(|route| {
            path == route
                || path
                    .strip_prefix(route.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// 该接口的 404 是否意味着“没有会话”
    pub fn requires_auth_on_not_found(&self, endpoint: &str) -> bool {
        let endpoint = strip_query(endpoint);
        self.auth_required_404_endpoints
            .iter()
            .any(|fragment| endpoint.contains(fragment.as_str()))
    }

    pub fn classify_not_found(&self, page_path: &str, endpoint: &str) -> NotFoundAction {
        if self.is_public_route(page_path) {
            NotFoundAction::ExpectedOnPublicPage
        } else if self.requires_auth_on_not_found(endpoint) {
            NotFoundAction::Deferred
        } else {
            NotFoundAction::Immediate
        }
    }

    /// 登录页地址，携带当前地址作为返回目标
    pub fn login_redirect_url(&self, return_to: &str) -> String {
        if return_to.is_empty() || self.is_public_route(return_to) {
            return self.login_path.clone();
        }
        format!(
            "{}?redirect={}",
            self.login_path,
            urlencoding::encode(return_to)
        )
    }

    /// 从登录页地址或查询串里取出安全的返回目标，否则回到首页
    ///
    /// 只接受站内相对路径，拒绝 `//host`、绝对地址和公开页面（避免循环）。
    pub fn post_login_target(&self, url_or_query: &str) -> String {
        let query = url_or_query
            .split_once('?')
            .map_or(url_or_query, |(_, query)| query);
        let query = query.split('#').next().unwrap_or(query);
        let target = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "redirect")
            .and_then(|(_, value)| urlencoding::decode(value).ok())
            .map(|value| value.into_owned());

        match target {
            Some(target)
                if target.starts_with('/')
                    && !target.starts_with("//")
                    && !target.contains('\\')
                    && !self.is_public_route(&target) =>
            {
                target
            }
            _ => self.home_path.clone(),
        }
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
