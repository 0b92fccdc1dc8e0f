//! Scripted transport for tests and the host emulator.
//!
//! Replies are queued per path and consumed in order. A path with nothing
//! queued and no fallback behaves like an unreachable server.

use crate::error::{ExchangeError, ExchangeResult};
use crate::transport::{HttpReply, LinkStatus, Transport};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

/// HTTP method of a recorded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Request observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

#[derive(Debug, Default)]
struct Script {
    queued: HashMap<String, VecDeque<ExchangeResult<HttpReply>>>,
    fallback: HashMap<String, HttpReply>,
    requests: Vec<RecordedRequest>,
}

impl Script {
    fn answer(&mut self, request: RecordedRequest) -> ExchangeResult<HttpReply> {
        let path = request.path.clone();
        self.requests.push(request);

        if let Some(next) = self.queued.get_mut(&path).and_then(VecDeque::pop_front) {
            return next;
        }
        match self.fallback.get(&path) {
            Some(reply) => Ok(reply.clone()),
            None => Err(ExchangeError::connection(format!("no route for {path}"))),
        }
    }
}

/// Mock transport
///
/// Clones share the script and the request log.
///
/// # Example
///
/// ```
/// use tapgate_network::{MockTransport, Transport};
///
/// # #[tokio::main]
/// # async fn main() {
/// let transport = MockTransport::new();
/// transport.reply("/hw_status", 200, r#"{"evac":false,"over_cap":false}"#).await;
///
/// let reply = transport.get("/hw_status").await.unwrap();
/// assert_eq!(reply.status, 200);
/// assert_eq!(transport.request_count("/hw_status").await, 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
    link: LinkStatus,
}

impl MockTransport {
    /// Create a connected mock transport.
    pub fn new() -> Self {
        Self::with_link(LinkStatus::new(true))
    }

    /// Create a mock transport whose link is down.
    pub fn disconnected() -> Self {
        Self::with_link(LinkStatus::new(false))
    }

    /// Create a mock transport gated by an existing link flag.
    pub fn with_link(link: LinkStatus) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            link,
        }
    }

    /// Link flag gating this transport.
    pub fn link(&self) -> &LinkStatus {
        &self.link
    }

    /// Queue one reply for `path`.
    pub async fn reply(&self, path: &str, status: u16, body: &str) {
        self.enqueue(path, Ok(HttpReply::new(status, body))).await;
    }

    /// Queue one failure for `path`.
    pub async fn fail(&self, path: &str, error: ExchangeError) {
        self.enqueue(path, Err(error)).await;
    }

    /// Reply to `path` with the same response whenever nothing is queued.
    pub async fn always_reply(&self, path: &str, status: u16, body: &str) {
        self.script
            .lock()
            .await
            .fallback
            .insert(path.to_string(), HttpReply::new(status, body));
    }

    /// All requests observed so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.script.lock().await.requests.clone()
    }

    /// Number of requests observed for `path`.
    pub async fn request_count(&self, path: &str) -> usize {
        self.script
            .lock()
            .await
            .requests
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    async fn enqueue(&self, path: &str, entry: ExchangeResult<HttpReply>) {
        self.script
            .lock()
            .await
            .queued
            .entry(path.to_string())
            .or_default()
            .push_back(entry);
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.link.is_up()
    }

    async fn get(&self, path: &str) -> ExchangeResult<HttpReply> {
        self.script.lock().await.answer(RecordedRequest {
            method: Method::Get,
            path: path.to_string(),
            body: None,
        })
    }

    async fn post_json(&self, path: &str, body: String) -> ExchangeResult<HttpReply> {
        self.script.lock().await.answer(RecordedRequest {
            method: Method::Post,
            path: path.to_string(),
            body: Some(body),
        })
    }
}
