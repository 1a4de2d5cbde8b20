//! Scripted in-memory transport for tests.
//!
//! Responses are queued per `(method, path)` and handed out in call order. A gated response
//! is held until its sender fires, which lets tests interleave overlapping requests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

use super::Transport;
use crate::errors::SyncError;

/// One request observed by the fake.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RecordedCall {
    /// Value of a query parameter, if sent.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

struct Scripted {
    response: Result<Value, SyncError>,
    gate: Option<oneshot::Receiver<()>>,
}

#[derive(Default)]
pub struct FakeTransport {
    scripts: Mutex<HashMap<(&'static str, String), VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next matching request.
    pub fn respond(&self, method: &'static str, path: &str, response: Result<Value, SyncError>) {
        self.push(method, path, response, None);
    }

    /// Queue a response that is held until the returned sender fires (or is dropped).
    pub fn respond_gated(
        &self,
        method: &'static str,
        path: &str,
        response: Result<Value, SyncError>,
    ) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(method, path, response, Some(rx));
        tx
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    fn push(
        &self,
        method: &'static str,
        path: &str,
        response: Result<Value, SyncError>,
        gate: Option<oneshot::Receiver<()>>,
    ) {
        self.scripts
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Scripted { response, gate });
    }

    async fn dispatch(
        &self,
        method: &'static str,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value, SyncError> {
        let scripted = {
            self.calls.lock().push(RecordedCall {
                method,
                path: path.to_string(),
                query: query.to_vec(),
                body,
            });
            self.scripts
                .lock()
                .get_mut(&(method, path.to_string()))
                .and_then(|queue| queue.pop_front())
        };

        let Some(scripted) = scripted else {
            return Err(SyncError::NotFound(format!(
                "No scripted response for {} {}",
                method, path
            )));
        };

        if let Some(gate) = scripted.gate {
            let _ = gate.await;
        }
        scripted.response
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, SyncError> {
        self.dispatch("GET", path, query, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, SyncError> {
        self.dispatch("POST", path, &[], Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, SyncError> {
        self.dispatch("PUT", path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), SyncError> {
        self.dispatch("DELETE", path, &[], None).await.map(|_| ())
    }
}
