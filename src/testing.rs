//! Test doubles shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{HttpResponse, HttpTransport, TransportError};

type Reply = Result<HttpResponse, TransportError>;

/// A call seen by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub at: tokio::time::Instant,
}

/// Replays canned replies per `METHOD path`.
///
/// Replies are consumed in order; the last one repeats forever. Unscripted
/// requests get a 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method path`.
    pub fn reply(self, method: &str, path: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .expect("Lock failed")
            .entry(format!("{method} {path}"))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn ok_json(self, method: &str, path: &str, value: serde_json::Value) -> Self {
        self.reply(method, path, Ok(HttpResponse::json(200, &value)))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("Lock failed").clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.path == path)
            .collect()
    }

    fn next(&self, method: &'static str, path: &str, body: Option<&serde_json::Value>) -> Reply {
        self.calls.lock().expect("Lock failed").push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
            at: tokio::time::Instant::now(),
        });

        let mut replies = self.replies.lock().expect("Lock failed");
        match replies.get_mut(&format!("{method} {path}")) {
            Some(queue) if queue.len() > 1 => queue.pop_front().expect("Non-empty queue"),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::new(404, "Not scripted"))),
            None => Ok(HttpResponse::new(404, "Not scripted")),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        self.next("GET", path, None)
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, TransportError> {
        self.next("POST", path, body)
    }
}
