use std::rc::Rc;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::RetryPolicy;
use crate::error::{Error, Result};
use crate::interceptor::Interceptor;
use crate::protocol::{
    ApiRequest, CurrentSessionRequest, ErrorBody, ForgotPasswordRequest, HEADER_REQUEST_ID,
    HttpMethod, LoginRequest, LogoutRequest, SessionPayload, UpdatePasswordRequest,
};
use crate::request::{HttpClient, HttpRequest, HttpResponse};
use crate::timer::{TimerDriver, sleep};

// =========================================================
// 业务 API 客户端
// =========================================================

/// 后端 API 客户端
///
/// 所有请求都经过同一条管线：构造请求 -> 发送 -> 拦截器 -> 状态码映射 -> 解码。
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Rc<dyn HttpClient>,
    interceptor: Interceptor,
    timers: Rc<dyn TimerDriver>,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        http: Rc<dyn HttpClient>,
        interceptor: Interceptor,
        timers: Rc<dyn TimerDriver>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            interceptor,
            timers,
            retry,
        }
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    /// 发送一个声明式请求并解码响应
    pub async fn call<R: ApiRequest>(&self, request: &R) -> Result<R::Response> {
        let body = if request.has_body() {
            Some(serde_json::to_string(request)?)
        } else {
            None
        };
        let response = self.execute(R::PATH, R::METHOD, body).await?;
        decode(&response)
    }

    /// 查询当前会话
    pub async fn current_session(&self) -> Result<SessionPayload> {
        self.call(&CurrentSessionRequest).await
    }

    /// 登录
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionPayload> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.call(&request).await
    }

    /// 注销
    pub async fn logout(&self) -> Result<()> {
        self.call(&LogoutRequest).await.map(|_| ())
    }

    /// 申请重置密码邮件
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.call(&request).await.map(|_| ())
    }

    /// 修改密码
    pub async fn update_password(&self, password: &str) -> Result<()> {
        let request = UpdatePasswordRequest {
            password: password.to_string(),
        };
        self.call(&request).await.map(|_| ())
    }

    /// 数据查询层的通用 GET，按重试策略重试瞬时故障
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let mut attempt = 0;
        loop {
            let outcome = match self.execute(path, HttpMethod::Get, None).await {
                Ok(response) => decode(&response),
                Err(e) => Err(e),
            };
            match outcome {
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        target: "partsgate::api",
                        "GET {} failed ({}), retry {}/{} in {:?}",
                        path,
                        e,
                        attempt,
                        self.retry.max_retries,
                        delay
                    );
                    sleep(self.timers.as_ref(), delay).await;
                }
                other => return other,
            }
        }
    }

    async fn execute(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<String>,
    ) -> Result<HttpResponse> {
        let request_id = Uuid::new_v4().to_string();
        let mut req = HttpRequest::new(&self.base_url, path, method)
            .with_header(HEADER_REQUEST_ID, &request_id)
            .with_header("Accept", "application/json");
        if let Some(body) = body {
            req = req
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }

        debug!(
            target: "partsgate::api",
            "{} {} [{}]",
            method.as_str(),
            path,
            request_id
        );
        let response = self.http.send(req).await.inspect_err(|e| {
            warn!(
                target: "partsgate::api",
                "{} {} [{}] transport failure: {}",
                method.as_str(),
                path,
                request_id,
                e
            );
        })?;
        debug!(
            target: "partsgate::api",
            "{} {} [{}] -> {}",
            method.as_str(),
            path,
            request_id,
            response.status
        );

        let response = self.interceptor.inspect(path, response).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(status_error(&response))
        }
    }
}

/// 拦截器放行的非 2xx 状态码
fn status_error(response: &HttpResponse) -> Error {
    match response.status {
        404 => Error::NotFound,
        status @ 400..=499 => Error::Rejected {
            status,
            message: response
                .json::<ErrorBody>()
                .ok()
                .and_then(|body| body.message)
                .filter(|message| !message.is_empty()),
        },
        status => Error::Unexpected { status },
    }
}

/// 空响应体按 `null` 解码，无内容的接口也能走同一条路径
fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    let body = response.body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(Error::from)
}

#[cfg(test)]
mod tests;
