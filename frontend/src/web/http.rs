//! HTTP 请求封装模块
//!
//! 基于 `gloo-net` 实现会话核心的 `HttpClient`。
//! 凭据是后端设置的 HTTP-only cookie，这里只要求浏览器带上它。

use gloo_net::http::{Method, RequestBuilder};
use partsgate::Error;
use partsgate::protocol::HttpMethod;
use partsgate::request::{HttpClient, HttpRequest, HttpResponse};
use web_sys::RequestCredentials;

/// 浏览器 fetch 客户端
#[derive(Clone, Copy, Default)]
pub struct FetchHttpClient;

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> partsgate::Result<HttpResponse> {
        let mut builder = RequestBuilder::new(&req.url)
            .method(method(req.method))
            .credentials(RequestCredentials::Include);

        for (key, value) in &req.headers {
            builder = builder.header(key, value);
        }

        let request = match req.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(|e| Error::network(format!("请求构建失败: {}", e)))?;

        let response = request
            .send()
            .await
            .map_err(|e| Error::network(format!("网络错误: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("响应读取失败: {}", e)))?;

        Ok(HttpResponse::new(status, body))
    }
}
