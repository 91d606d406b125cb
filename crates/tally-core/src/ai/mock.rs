//! Mock backend for testing
//!
//! Returns a scripted reply (or a scripted failure) for every request and
//! records what it was asked, so tests can check both sides of the exchange
//! without a running LLM server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::GenerationRequest;
use super::AIBackend;

/// Reply the mock gives when nothing was scripted
pub const DEFAULT_MOCK_REPLY: &str = "That seems reasonable given your budget.";

/// What the mock does when asked to generate
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Return this text
    Reply(String),
    /// Fail as if the server answered with a non-success status
    Status { status: u16, body: String },
    /// Succeed at the transport level but return nothing
    Empty,
}

/// Mock AI backend for testing
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    behavior: MockBehavior,
    delay: Option<Duration>,
    model: String,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            behavior: MockBehavior::Reply(DEFAULT_MOCK_REPLY.to_string()),
            delay: None,
            model: "mock".to_string(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Reply with fixed text
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.behavior = MockBehavior::Reply(reply.into());
        self
    }

    /// Fail every call with the given HTTP status
    pub fn failing(status: u16) -> Self {
        Self {
            behavior: MockBehavior::Status {
                status,
                body: "mock failure".to_string(),
            },
            ..Self::new()
        }
    }

    /// Return an empty reply on every call
    pub fn empty() -> Self {
        Self {
            behavior: MockBehavior::Empty,
            ..Self::new()
        }
    }

    /// Sleep before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Create a new instance with a different model name
    ///
    /// The copy shares the request log with the original.
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Reply(text) if !text.trim().is_empty() => Ok(text.clone()),
            MockBehavior::Reply(_) | MockBehavior::Empty => Err(Error::EmptyResponse),
            MockBehavior::Status { status, body } => Err(Error::Backend {
                status: *status,
                body: body.clone(),
            }),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
