use super::*;
use crate::config::SessionConfig;
use crate::context::SessionContext;
use crate::protocol::{PATH_CURRENT_SESSION, PATH_FORGOT_PASSWORD, PATH_LOGIN, PATH_LOGOUT};
use crate::request::ReqwestHttpClient;
use crate::testing::{
    Harness, ManualTimers, RecordingNavigator, RecordingNotifier, session_body,
};
use futures::executor::LocalPool;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, PartialEq)]
struct Part {
    sku: String,
}

// =========================================================
// Request construction
// =========================================================

#[test]
fn test_requests_carry_request_id_and_json_body() {
    let mut h = Harness::at("/login");
    h.http.mock_response(PATH_LOGIN, 200, session_body(1));

    let api = h.ctx.api().clone();
    let fut = Box::pin(async move { api.login("a@x.com", "secret123").await });
    let payload = h.block_on(fut).unwrap().unwrap();
    assert_eq!(payload.person.map(|p| p.id), Some(1));

    let requests = h.http.requests.borrow();
    let req = &requests[0];
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.url, PATH_LOGIN);
    assert!(Uuid::parse_str(&req.headers[HEADER_REQUEST_ID]).is_ok());
    assert_eq!(req.headers["Content-Type"], "application/json");
    let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({ "email": "a@x.com", "password": "secret123" }));
}

#[test]
fn test_bodyless_requests() {
    let mut h = Harness::at("/orders");
    h.http.mock_response(PATH_CURRENT_SESSION, 200, session_body(1));
    h.http.mock_raw(PATH_LOGOUT, 200, "");

    let api = h.ctx.api().clone();
    let fut = Box::pin(async move {
        let session = api.current_session().await;
        let logout = api.logout().await;
        (session, logout)
    });
    let (session, logout) = h.block_on(fut).unwrap();
    assert!(session.is_ok());
    assert_eq!(logout, Ok(()));

    let requests = h.http.requests.borrow();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.body.is_none()));
    assert_eq!(requests[0].method, HttpMethod::Get);
    // Every request gets its own id
    assert_ne!(
        requests[0].headers[HEADER_REQUEST_ID],
        requests[1].headers[HEADER_REQUEST_ID]
    );
}

// =========================================================
// Status mapping
// =========================================================

#[test]
fn test_status_mapping() {
    let mut h = Harness::at("/login");
    h.http
        .mock_response(PATH_FORGOT_PASSWORD, 400, json!({ "message": "unknown domain" }));
    h.http.mock_raw(PATH_FORGOT_PASSWORD, 422, "not json");
    h.http.mock_response(PATH_FORGOT_PASSWORD, 404, json!({}));
    h.http.mock_response(PATH_FORGOT_PASSWORD, 500, json!({}));
    h.http.mock_response(PATH_FORGOT_PASSWORD, 200, json!({ "sent": true }));

    let api = h.ctx.api().clone();
    let fut = Box::pin(async move {
        let mut results = Vec::new();
        for _ in 0..5 {
            results.push(api.forgot_password("a@x.com").await);
        }
        results
    });
    let results = h.block_on(fut).unwrap();

    assert_eq!(
        results,
        vec![
            Err(Error::Rejected {
                status: 400,
                message: Some("unknown domain".into())
            }),
            Err(Error::Rejected {
                status: 422,
                message: None
            }),
            Err(Error::NotFound),
            Err(Error::Unexpected { status: 500 }),
            Ok(()),
        ]
    );
}

// =========================================================
// fetch_json retry
// =========================================================

#[test]
fn test_fetch_json_retries_transient_failures() {
    let config = SessionConfig::default().with_retry(RetryPolicy {
        max_retries: 3,
        backoff_ms: 100,
    });
    let mut h = Harness::with_config("/parts", config);
    h.http.mock_network_error("/api/v1/parts/1");
    h.http.mock_response("/api/v1/parts/1", 503, json!({}));
    h.http.mock_response("/api/v1/parts/1", 200, json!({ "sku": "BRK-001" }));

    let api = h.ctx.api().clone();
    let outcome: Rc<std::cell::RefCell<Option<Result<Part>>>> = Rc::default();
    let out = outcome.clone();
    let fut = Box::pin(async move {
        *out.borrow_mut() = Some(api.fetch_json::<Part>("/api/v1/parts/1").await);
    });
    assert!(h.block_on(fut).is_none());
    assert_eq!(h.http.calls_to("/api/v1/parts/1"), 1);

    // First retry waits 100ms, second waits 200ms
    h.advance_ms(100);
    assert_eq!(h.http.calls_to("/api/v1/parts/1"), 2);
    h.advance_ms(199);
    assert!(outcome.borrow().is_none());
    h.advance_ms(1);

    assert_eq!(
        *outcome.borrow(),
        Some(Ok(Part {
            sku: "BRK-001".into()
        }))
    );
    assert_eq!(h.http.calls_to("/api/v1/parts/1"), 3);
}

#[test]
fn test_fetch_json_does_not_retry_client_errors() {
    let config = SessionConfig::default().with_retry(RetryPolicy::production());
    let mut h = Harness::with_config("/parts", config);
    h.http.mock_response("/api/v1/parts/9", 404, json!({}));

    let api = h.ctx.api().clone();
    let fut = Box::pin(async move { api.fetch_json::<Part>("/api/v1/parts/9").await });
    assert_eq!(h.block_on(fut), Some(Err(Error::NotFound)));
    assert_eq!(h.http.calls_to("/api/v1/parts/9"), 1);
}

#[test]
fn test_fetch_json_gives_up_after_max_retries() {
    let config = SessionConfig::default().with_retry(RetryPolicy {
        max_retries: 1,
        backoff_ms: 10,
    });
    let mut h = Harness::with_config("/parts", config);
    h.http.mock_network_error("/api/v1/parts");
    h.http.mock_network_error("/api/v1/parts");

    let api = h.ctx.api().clone();
    let outcome: Rc<std::cell::RefCell<Option<Result<Vec<Part>>>>> = Rc::default();
    let out = outcome.clone();
    let fut = Box::pin(async move {
        *out.borrow_mut() = Some(api.fetch_json::<Vec<Part>>("/api/v1/parts").await);
    });
    h.block_on(fut);
    h.advance_ms(10);

    let outcome = outcome.borrow();
    assert!(matches!(outcome.as_ref(), Some(Err(Error::Network(_)))));
    assert_eq!(h.http.calls_to("/api/v1/parts"), 2);
}

// =========================================================
// Wire test against a real HTTP server
// =========================================================

#[tokio::test]
async fn test_login_over_http() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("POST", PATH_LOGIN)
        .match_header("content-type", "application/json")
        .match_header(
            "x-request-id",
            mockito::Matcher::Regex("^[0-9a-f-]{36}$".into()),
        )
        .match_body(mockito::Matcher::Json(json!({
            "email": "a@x.com",
            "password": "secret123"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body(1).to_string())
        .create_async()
        .await;

    let pool = LocalPool::new();
    let ctx = SessionContext::new(
        SessionConfig::default().with_api_base_url(server.url()),
        Rc::new(ReqwestHttpClient::new()),
        Rc::new(RecordingNavigator::at("/login")),
        Rc::new(RecordingNotifier::default()),
        Rc::new(ManualTimers::new()),
        Rc::new(pool.spawner()),
    );

    let payload = ctx.api().login("a@x.com", "secret123").await.unwrap();
    m.assert_async().await;
    assert_eq!(payload.person.map(|p| p.id), Some(1));
}

#[tokio::test]
async fn test_unauthorized_over_http() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("GET", PATH_CURRENT_SESSION)
        .with_status(401)
        .with_body(r#"{"message":"expired"}"#)
        .create_async()
        .await;

    let pool = LocalPool::new();
    let navigator = RecordingNavigator::at("/admin/users");
    let ctx = SessionContext::new(
        SessionConfig::default().with_api_base_url(server.url()),
        Rc::new(ReqwestHttpClient::new()),
        Rc::new(navigator.clone()),
        Rc::new(RecordingNotifier::default()),
        Rc::new(ManualTimers::new()),
        Rc::new(pool.spawner()),
    );

    let result = ctx.api().current_session().await;
    m.assert_async().await;
    assert_eq!(result, Err(Error::Unauthorized));
    assert_eq!(
        navigator.hard_redirects(),
        vec!["/login?redirect=%2Fadmin%2Fusers".to_string()]
    );
}
