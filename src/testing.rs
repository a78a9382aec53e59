//! 测试用的共享 Mock 组件

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use serde_json::{Value, json};

use crate::config::{RetryPolicy, SessionConfig};
use crate::context::SessionContext;
use crate::error::{Error, Result};
use crate::platform::{Navigator, Notice, Notifier, TaskSpawner};
use crate::protocol::{AccountStatus, Person, Role};
use crate::request::{HttpClient, HttpRequest, HttpResponse};
use crate::timer::{TimerDriver, TimerHandle};

// =========================================================
// 示例数据
// =========================================================

pub fn sample_person(id: i64) -> Person {
    Person {
        id,
        email: "a@x.com".into(),
        first_name: "A".into(),
        last_name: String::new(),
        role: Role::Shop,
        status: AccountStatus::Active,
        shop_name: Some("Main Street Motors".into()),
        shop_number: Some("S-100".into()),
        dealership_name: None,
        dealership_number: None,
    }
}

pub fn session_body(id: i64) -> Value {
    json!({
        "person": {
            "id": id,
            "email": "a@x.com",
            "firstName": "A",
            "type": "Shop",
            "status": "Active",
            "shopName": "Main Street Motors",
            "shopNumber": "S-100"
        }
    })
}

// =========================================================
// Mock HTTP Client
// =========================================================

enum Scripted {
    Respond(u16, String),
    Fail(String),
    /// 请求挂起，直到测试释放闸门
    Held(oneshot::Receiver<Result<HttpResponse>>),
}

/// 按路径排队的脚本化 HTTP 客户端
#[derive(Clone, Default)]
pub struct MockHttpClient {
    scripts: Rc<RefCell<HashMap<String, VecDeque<Scripted>>>>,
    /// 已发送请求记录
    pub requests: Rc<RefCell<Vec<HttpRequest>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mock_response(&self, path: &str, status: u16, body: Value) {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        self.push(path, Scripted::Respond(status, body));
    }

    pub fn mock_raw(&self, path: &str, status: u16, body: &str) {
        self.push(path, Scripted::Respond(status, body.to_string()));
    }

    pub fn mock_network_error(&self, path: &str) {
        self.push(path, Scripted::Fail("connection refused".into()));
    }

    /// 排队一个挂起的响应，返回用于释放它的闸门
    pub fn hold(&self, path: &str) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.push(path, Scripted::Held(rx));
        Gate { tx: Some(tx) }
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests.borrow().iter().filter(|r| r.path == path).count()
    }

    fn push(&self, path: &str, scripted: Scripted) {
        self.scripts
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(scripted);
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        self.requests.borrow_mut().push(req.clone());
        let next = self
            .scripts
            .borrow_mut()
            .get_mut(&req.path)
            .and_then(|queue| queue.pop_front());
        match next {
            Some(Scripted::Respond(status, body)) => Ok(HttpResponse::new(status, body)),
            Some(Scripted::Fail(msg)) => Err(Error::network(msg)),
            Some(Scripted::Held(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(Error::network("gate dropped"))),
            None => Ok(HttpResponse::new(
                500,
                format!("no mock response for {}", req.path),
            )),
        }
    }
}

/// 挂起请求的闸门
pub struct Gate {
    tx: Option<oneshot::Sender<Result<HttpResponse>>>,
}

impl Gate {
    pub fn respond(mut self, status: u16, body: Value) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Ok(HttpResponse::new(status, body.to_string())));
        }
    }

    pub fn fail(mut self, msg: &str) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Err(Error::network(msg)));
        }
    }
}

// =========================================================
// Navigator / Notifier
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    Navigate(String),
    HardRedirect(String),
}

/// 记录所有导航动作的 Navigator
#[derive(Clone)]
pub struct RecordingNavigator {
    url: Rc<RefCell<String>>,
    pub events: Rc<RefCell<Vec<NavEvent>>>,
}

impl RecordingNavigator {
    pub fn at(url: &str) -> Self {
        Self {
            url: Rc::new(RefCell::new(url.to_string())),
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// 模拟用户在浏览器里换了页面（不记录事件）
    pub fn set_url(&self, url: &str) {
        *self.url.borrow_mut() = url.to_string();
    }

    pub fn hard_redirects(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                NavEvent::HardRedirect(url) => Some(url.clone()),
                NavEvent::Navigate(_) => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                NavEvent::Navigate(path) => Some(path.clone()),
                NavEvent::HardRedirect(_) => None,
            })
            .collect()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        let url = self.url.borrow();
        url.split(['?', '#']).next().unwrap_or("/").to_string()
    }

    fn current_url(&self) -> String {
        self.url.borrow().clone()
    }

    fn navigate(&self, path: &str) {
        self.events
            .borrow_mut()
            .push(NavEvent::Navigate(path.to_string()));
        *self.url.borrow_mut() = path.to_string();
    }

    fn hard_redirect(&self, url: &str) {
        self.events
            .borrow_mut()
            .push(NavEvent::HardRedirect(url.to_string()));
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub notices: Rc<RefCell<Vec<Notice>>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

// =========================================================
// 手动推进的定时器
// =========================================================

struct ManualEntry {
    deadline: Duration,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_id: u64,
    entries: BTreeMap<u64, ManualEntry>,
}

/// 测试时钟：只有调用 `advance` 时间才会前进
#[derive(Clone, Default)]
pub struct ManualTimers {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// 推进时钟，按截止时间顺序执行到期的回调
    pub fn advance(&self, by: Duration) {
        let target = self.inner.borrow().now + by;
        loop {
            let due = {
                let mut inner = self.inner.borrow_mut();
                let next = inner
                    .entries
                    .iter()
                    .filter(|(_, e)| e.deadline <= target)
                    .min_by_key(|(id, e)| (e.deadline, **id))
                    .map(|(id, _)| *id);
                match next {
                    Some(id) => inner.entries.remove(&id).map(|entry| {
                        inner.now = entry.deadline;
                        entry.callback
                    }),
                    None => None,
                }
            };
            match due {
                Some(callback) => callback(),
                None => break,
            }
        }
        self.inner.borrow_mut().now = target;
    }
}

impl TimerDriver for ManualTimers {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            let deadline = inner.now + delay;
            inner.entries.insert(id, ManualEntry { deadline, callback });
            id
        };
        let weak = Rc::downgrade(&self.inner);
        TimerHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                // 回调执行期间句柄可能被 drop，此时条目已被移除
                if let Ok(mut inner) = inner.try_borrow_mut() {
                    inner.entries.remove(&id);
                }
            }
        })
    }
}

// =========================================================
// 任务调度
// =========================================================

impl TaskSpawner for LocalSpawner {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        LocalSpawnExt::spawn_local(self, task).expect("local pool is alive");
    }
}

// =========================================================
// 测试装配
// =========================================================

/// 一整套装配好的会话上下文 + Mock
pub struct Harness {
    pub pool: LocalPool,
    pub http: MockHttpClient,
    pub navigator: RecordingNavigator,
    pub notifier: RecordingNotifier,
    pub timers: ManualTimers,
    pub ctx: SessionContext,
}

impl Harness {
    pub fn at(url: &str) -> Self {
        Self::with_config(url, SessionConfig::default().with_retry(RetryPolicy::disabled()))
    }

    pub fn with_config(url: &str, config: SessionConfig) -> Self {
        let pool = LocalPool::new();
        let http = MockHttpClient::new();
        let navigator = RecordingNavigator::at(url);
        let notifier = RecordingNotifier::default();
        let timers = ManualTimers::new();
        let ctx = SessionContext::new(
            config,
            Rc::new(http.clone()),
            Rc::new(navigator.clone()),
            Rc::new(notifier.clone()),
            Rc::new(timers.clone()),
            Rc::new(pool.spawner()),
        );
        Self {
            pool,
            http,
            navigator,
            notifier,
            timers,
            ctx,
        }
    }

    pub fn run(&mut self) {
        self.pool.run_until_stalled();
    }

    /// 推进时钟并让所有被唤醒的任务跑完
    pub fn advance_ms(&mut self, ms: u64) {
        self.pool.run_until_stalled();
        self.timers.advance(Duration::from_millis(ms));
        self.pool.run_until_stalled();
    }

    /// 在本地任务池里运行一个 future 并取回结果
    pub fn block_on<T: 'static>(&mut self, fut: LocalBoxFuture<'static, T>) -> Option<T> {
        let slot: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
        let out = slot.clone();
        // `LocalSpawner` 同时实现了 `TaskSpawner`，这里显式指定
        LocalSpawnExt::spawn_local(&self.pool.spawner(), async move {
            *out.borrow_mut() = Some(fut.await);
        })
        .expect("local pool is alive");
        self.pool.run_until_stalled();
        slot.borrow_mut().take()
    }
}

/// 计数器，用于断言监听器被调用的次数
#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}
