//! [`MockUpstream`]: a scripted [`Upstream`] that records every request.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use devops_client::{Error, Result, Upstream, UpstreamRequest, UpstreamResponse};
use serde_json::Value;

#[derive(Debug)]
enum Scripted {
    Response(UpstreamResponse),
    TransportFailure(String),
}

/// Replays queued responses in order and records what was sent.
///
/// An exhausted queue answers with a transport error, so a test that makes
/// more calls than it scripted fails loudly instead of hanging.
///
/// # Example
///
/// ```rust
/// use devops_test_utils::MockUpstream;
/// use serde_json::json;
///
/// let upstream = MockUpstream::new()
///     .respond_json(200, json!({ "count": 0, "results": [] }))
///     .respond_text(404, "not found");
/// assert_eq!(upstream.call_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockUpstream {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<UpstreamRequest>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response.
    pub fn respond_json(self, status: u16, body: Value) -> Self {
        self.respond(UpstreamResponse::json(status, body))
    }

    /// Queue a plain-text response.
    pub fn respond_text(self, status: u16, body: impl Into<String>) -> Self {
        self.respond(UpstreamResponse::text(status, body))
    }

    /// Queue a fully built response (for example one carrying a commit id).
    pub fn respond(self, response: UpstreamResponse) -> Self {
        self.push(Scripted::Response(response));
        self
    }

    /// Queue a failure where no HTTP response arrives.
    pub fn fail_transport(self, message: impl Into<String>) -> Self {
        self.push(Scripted::TransportFailure(message.into()));
        self
    }

    /// Number of requests executed so far.
    pub fn call_count(&self) -> usize {
        self.lock_requests().len()
    }

    /// Every request executed so far, oldest first.
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.lock_requests().clone()
    }

    /// The most recent request.
    ///
    /// # Panics
    /// Panics if no request has been executed.
    pub fn last_request(&self) -> UpstreamRequest {
        self.lock_requests()
            .last()
            .cloned()
            .unwrap_or_else(|| panic!("MockUpstream::last_request: no request was executed"))
    }

    fn push(&self, response: Scripted) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<UpstreamRequest>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse> {
        let operation = request.operation;
        self.lock_requests().push(request);

        let next = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::TransportFailure(message)) => Err(Error::Transport {
                operation,
                message,
                source: None,
            }),
            None => Err(Error::Transport {
                operation,
                message: "MockUpstream: no scripted response left".to_string(),
                source: None,
            }),
        }
    }
}
