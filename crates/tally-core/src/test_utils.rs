//! Test utilities for tally-core
//!
//! This module provides a mock AI server that speaks both the OpenAI-compatible
//! and the Ollama chat formats, for integration tests and offline development.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// How the mock server answers chat requests
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMode {
    /// Answer with this text
    Reply(String),
    /// Answer with this HTTP status and a short error body
    Status(u16),
    /// Wait this long before answering (for timeout tests)
    Stall(Duration),
}

#[derive(Clone)]
struct ServerState {
    mode: ServerMode,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// Mock AI server for testing and development
pub struct MockAIServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAIServer {
    /// Start the mock server on an available port
    pub async fn start(mode: ServerMode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            mode,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/chat", post(handle_ollama_chat))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat_completions))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Server that always replies with `text`
    pub async fn replying(text: &str) -> Self {
        Self::start(ServerMode::Reply(text.to_string())).await
    }

    /// Server that always fails with `status`
    pub async fn failing(status: u16) -> Self {
        Self::start(ServerMode::Status(status)).await
    }

    /// Server that waits `delay` before answering
    pub async fn stalling(delay: Duration) -> Self {
        Self::start(ServerMode::Stall(delay)).await
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Chat request bodies received so far, oldest first
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<Value> {
    Json(json!({
        "models": [{
            "name": "llama3.2:latest",
            "modified_at": "2024-01-01T00:00:00Z",
            "size": 4_000_000_000u64
        }]
    }))
}

/// OpenAI models endpoint (health check)
async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "gpt-3.5-turbo", "object": "model"}]
    }))
}

/// Record the request and resolve the configured mode into reply text
async fn answer(state: &ServerState, body: Value) -> Result<String, Response> {
    state.requests.lock().unwrap().push(body);

    match &state.mode {
        ServerMode::Reply(text) => Ok(text.clone()),
        ServerMode::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err((status, json!({"error": {"message": "mock failure"}}).to_string()).into_response())
        }
        ServerMode::Stall(delay) => {
            tokio::time::sleep(*delay).await;
            Ok("Sorry for the wait.".to_string())
        }
    }
}

/// Ollama chat endpoint
async fn handle_ollama_chat(State(state): State<ServerState>, Json(body): Json<Value>) -> Response {
    let model = body["model"].as_str().unwrap_or("llama3.2").to_string();
    match answer(&state, body).await {
        Ok(text) => Json(json!({
            "model": model,
            "created_at": "2024-01-01T00:00:00Z",
            "message": {"role": "assistant", "content": text},
            "done": true
        }))
        .into_response(),
        Err(response) => response,
    }
}

/// OpenAI-compatible chat completions endpoint
async fn handle_chat_completions(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Response {
    let model = body["model"].as_str().unwrap_or("gpt-3.5-turbo").to_string();
    match answer(&state, body).await {
        Ok(text) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "created": 1_700_000_000u64,
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AIBackend, AIClient, GenerationRequest};
    use crate::advisor::Advisor;
    use crate::config::{AdvisorConfig, TaskConfig, TaskType};
    use crate::context::tests::sample_context;
    use crate::models::{AdviceSource, ConsultationRequest, Recommendation};
    use crate::prompts::PromptLibrary;

    fn advisor_for(client: AIClient, config: AdvisorConfig) -> Advisor {
        Advisor::with_parts(
            Some(client),
            PromptLibrary::embedded_only().unwrap(),
            config,
        )
    }

    #[tokio::test]
    async fn test_mock_server_health_checks() {
        let server = MockAIServer::replying("hi").await;

        let ollama = AIClient::ollama(&server.url(), "llama3.2");
        assert!(ollama.health_check().await);

        let openai = AIClient::openai_compatible(&server.url(), "gpt-3.5-turbo", None);
        assert!(openai.health_check().await);
    }

    #[tokio::test]
    async fn test_openai_compatible_round_trip() {
        let server = MockAIServer::replying("Use caution with this one.").await;
        let client = AIClient::openai_compatible(&server.url(), "gpt-3.5-turbo", Some("sk-test"));

        let request = GenerationRequest::new("Should I?")
            .with_system("coach")
            .with_max_tokens(400);
        let reply = client.generate(&request).await.unwrap();
        assert_eq!(reply, "Use caution with this one.");

        let received = server.requests();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["model"], "gpt-3.5-turbo");
        assert_eq!(received[0]["max_tokens"], 400);
        assert_eq!(received[0]["messages"][0]["role"], "system");
        assert_eq!(received[0]["messages"][1]["content"], "Should I?");
    }

    #[tokio::test]
    async fn test_ollama_round_trip() {
        let server = MockAIServer::replying("Looks fine.").await;
        let client = AIClient::ollama(&server.url(), "llama3.2");

        let reply = client
            .generate(&GenerationRequest::new("hi").with_max_tokens(100))
            .await
            .unwrap();
        assert_eq!(reply, "Looks fine.");
        assert_eq!(server.requests()[0]["options"]["num_predict"], 100);
    }

    #[tokio::test]
    async fn test_error_status_is_backend_error() {
        let server = MockAIServer::failing(429).await;
        let client = AIClient::openai_compatible(&server.url(), "gpt-3.5-turbo", None);

        let err = client
            .generate(&GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "rate_limited");
    }

    #[tokio::test]
    async fn test_empty_reply_is_error() {
        let server = MockAIServer::replying("").await;
        let client = AIClient::ollama(&server.url(), "llama3.2");

        let err = client
            .generate(&GenerationRequest::new("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    #[tokio::test]
    async fn test_advisor_over_http() {
        let server = MockAIServer::replying("I would decline this.\n- Wait a week").await;
        let client = AIClient::openai_compatible(&server.url(), "gpt-3.5-turbo", None);
        let advisor = advisor_for(client, AdvisorConfig::default());

        let request = ConsultationRequest::new(5.0, "Shopping", "Phone case");
        let result = advisor.consult(&request, &sample_context()).await;

        assert_eq!(result.source, AdviceSource::Model);
        assert_eq!(result.recommendation, Recommendation::Decline);
        assert_eq!(result.alternatives, vec!["- Wait a week"]);
    }

    #[tokio::test]
    async fn test_advisor_times_out_stalled_server() {
        let server = MockAIServer::stalling(Duration::from_secs(5)).await;
        let client = AIClient::ollama(&server.url(), "llama3.2");

        let mut config = AdvisorConfig::default();
        config.set_task(
            TaskType::Consultation,
            TaskConfig {
                timeout: Duration::from_millis(100),
                ..TaskConfig::default_for(TaskType::Consultation)
            },
        );
        let advisor = advisor_for(client, config);

        // limit 50, spent 10 → remaining 40; 45 exceeds it
        let request = ConsultationRequest::new(45.0, "Shopping", "Headphones");
        let started = std::time::Instant::now();
        let result = advisor.consult(&request, &sample_context()).await;

        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(result.source, AdviceSource::Fallback);
        assert_eq!(result.recommendation, Recommendation::Decline);
        assert!(!result.message.is_empty());
        assert_eq!(result.alternatives.len(), 3);
    }

    #[tokio::test]
    async fn test_categorization_over_http() {
        let server = MockAIServer::replying(
            r#"Here you go: {"category": "Healthcare", "necessity_score": 9, "confidence": 0.8}"#,
        )
        .await;
        let client = AIClient::ollama(&server.url(), "llama3.2");
        let advisor = advisor_for(client, AdvisorConfig::default());

        let result = advisor.categorize_transaction("Pharmacy", 20.0).await;
        assert_eq!(result.category, "Healthcare");
        assert_eq!(result.necessity_score, 9);
        let temperature = server.requests()[0]["options"]["temperature"]
            .as_f64()
            .unwrap();
        assert!((temperature - 0.3).abs() < 1e-6);
    }
}
