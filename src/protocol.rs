//! 与后端约定的线上协议
//!
//! 路径与 JSON 结构由外部 OpenAPI 描述决定，这里只做逐字节的镜像。

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const PATH_CURRENT_SESSION: &str = "/api/v1/auth/session";
pub const PATH_LOGIN: &str = "/api/v1/auth/login";
pub const PATH_LOGOUT: &str = "/api/v1/auth/logout";
pub const PATH_FORGOT_PASSWORD: &str = "/api/v1/auth/password/forgot";
pub const PATH_UPDATE_PASSWORD: &str = "/api/v1/auth/password/update";

pub const HEADER_REQUEST_ID: &str = "X-Request-Id";

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path (or suffix).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// GET 请求与无字段的请求不发送 body
    fn has_body(&self) -> bool {
        !matches!(Self::METHOD, HttpMethod::Get)
    }
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 账户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    NetworkStaff,
    Dealership,
    Shop,
    /// 后端新增的角色不应导致整个会话解析失败
    #[serde(other)]
    Unknown,
}

/// 账户状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Pending,
    /// 临时会话：只允许修改密码
    Temporary,
    Disabled,
    #[serde(other)]
    Unknown,
}

/// 当前登录人员
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealership_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealership_number: Option<String>,
}

impl Person {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    /// 所属组织（门店或经销商）的展示名称
    pub fn organization(&self) -> Option<&str> {
        self.shop_name
            .as_deref()
            .or(self.dealership_name.as_deref())
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin | Role::NetworkStaff)
    }
}

/// 会话响应：有效会话附带人员记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    #[serde(default)]
    pub person: Option<Person>,
}

/// 后端错误响应体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// =========================================================
// Request Definitions
// =========================================================

/// 查询当前会话
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentSessionRequest;

impl ApiRequest for CurrentSessionRequest {
    type Response = SessionPayload;
    const PATH: &'static str = PATH_CURRENT_SESSION;
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// 邮箱 + 密码登录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = SessionPayload;
    const PATH: &'static str = PATH_LOGIN;
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// 注销（幂等）
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutRequest;

impl ApiRequest for LogoutRequest {
    type Response = IgnoredAny;
    const PATH: &'static str = PATH_LOGOUT;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn has_body(&self) -> bool {
        false
    }
}

/// 申请重置密码邮件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl ApiRequest for ForgotPasswordRequest {
    type Response = IgnoredAny;
    const PATH: &'static str = PATH_FORGOT_PASSWORD;
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// 修改密码（需要活动会话，可能是临时会话）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

impl ApiRequest for UpdatePasswordRequest {
    type Response = IgnoredAny;
    const PATH: &'static str = PATH_UPDATE_PASSWORD;
    const METHOD: HttpMethod = HttpMethod::Post;
}
