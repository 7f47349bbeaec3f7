//! Common test utilities
#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::Method;
use sessionprobe::error::{ProbeError, Result};
use sessionprobe::http::{HeaderMultimap, HttpTransport, RawResponse, Transport, TransportOptions};
use sessionprobe::models::ProbeTask;
use sessionprobe::probe::ProbeEngine;
use sessionprobe::targets::{SuffixFilter, TargetSet};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Builds a target set from URLs without suffix exclusions
pub fn targets<S: AsRef<str>>(urls: &[S]) -> TargetSet {
    TargetSet::from_lines(
        urls.iter().map(|u| u.as_ref().to_string()),
        SuffixFilter {
            ignore_css: false,
            ignore_js: false,
        },
    )
}

/// Engine over a real reqwest transport, suitable for a wiremock server
pub fn http_engine() -> ProbeEngine {
    let transport = HttpTransport::new(&TransportOptions::default()).expect("Failed to create transport");
    ProbeEngine::new(Arc::new(transport)).with_concurrency(4)
}

/// Canned reply of the stub transport for one URL
#[derive(Debug, Clone)]
pub enum Reply {
    Respond(u16, &'static str),
    FailSend,
    FailBody(u16),
}

/// In-memory transport that records how many calls overlap
pub struct StubTransport {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new(default_delay: Duration) -> Self {
        Self {
            replies: HashMap::new(),
            delays: HashMap::new(),
            default_delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Highest number of simultaneously running `execute` calls
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, task: &ProbeTask, _headers: &HeaderMultimap) -> Result<RawResponse> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls
            .lock()
            .expect("calls lock")
            .push(task.to_string());

        let delay = self
            .delays
            .get(&task.url)
            .copied()
            .unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = self
            .replies
            .get(&task.url)
            .cloned()
            .unwrap_or(Reply::Respond(200, "ok"));

        match reply {
            Reply::Respond(status, body) => Ok(RawResponse {
                status,
                body: Ok(body.as_bytes().to_vec()),
            }),
            Reply::FailSend => Err(ProbeError::Network {
                url: task.url.clone(),
                reason: "connection refused".to_string(),
            }),
            Reply::FailBody(status) => Ok(RawResponse {
                status,
                body: Err(ProbeError::BodyRead {
                    url: task.url.clone(),
                    reason: "connection reset".to_string(),
                }),
            }),
        }
    }
}

/// Methods helper for multi-method runs
pub fn methods(names: &[&str]) -> Vec<Method> {
    names
        .iter()
        .map(|n| Method::from_bytes(n.as_bytes()).expect("valid method"))
        .collect()
}
