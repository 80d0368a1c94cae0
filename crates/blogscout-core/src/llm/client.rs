//! HTTP client for the completion backend (OpenAI-compatible or Azure OpenAI)

use crate::config::{LLMProvider, LLMServiceConfig};
use crate::error::{BlogScoutError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{atomic::AtomicU64, Arc};
use std::time::{Duration, Instant};

/// Decoding mode for a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    /// Ask the backend to constrain output to a single JSON object
    Structured,
    /// Unconstrained text
    Free,
}

/// Trait for completion backends
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a chat completion and return the raw text of the first choice.
    ///
    /// Fails with `BackendUnavailable` when the call itself fails and with
    /// `Llm` when the backend answered with something unusable.
    async fn chat_completion(&self, messages: Vec<ChatMessage>, mode: CompletionMode)
        -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Send a system/user prompt pair in one call
pub async fn complete(
    client: &dyn LLMClient,
    system: &str,
    prompt: &str,
    mode: CompletionMode,
) -> Result<String> {
    let messages = vec![ChatMessage::system(system), ChatMessage::user(prompt)];
    client.chat_completion(messages, mode).await
}

/// API metrics for monitoring
#[derive(Debug, Default)]
pub struct APIMetrics {
    pub total_requests: AtomicU64,
    pub total_errors: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_latency_ms: f64,
}

/// OpenAI-compatible (or Azure OpenAI) chat completions client
pub struct OpenAIClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    metrics: Arc<APIMetrics>,
}

impl OpenAIClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(BlogScoutError::Http)?;

        Ok(Self {
            http_client,
            config,
            metrics: Arc::new(APIMetrics::default()),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(LLMServiceConfig::default())
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        use std::sync::atomic::Ordering;

        let total = self.metrics.total_requests.load(Ordering::Relaxed);
        MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    fn endpoint(&self) -> String {
        let base = self.config.url.trim_end_matches('/');
        match self.config.provider {
            LLMProvider::OpenAI => format!("{}/v1/chat/completions", base),
            LLMProvider::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                base, self.config.model, self.config.api_version
            ),
        }
    }

    fn record_error(&self) {
        use std::sync::atomic::Ordering;
        self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn build_request<'a>(
    config: &'a LLMServiceConfig,
    messages: &'a [ChatMessage],
    mode: CompletionMode,
) -> ChatRequest<'a> {
    ChatRequest {
        model: &config.model,
        messages,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        response_format: match mode {
            CompletionMode::Structured => Some(ResponseFormat {
                kind: "json_object",
            }),
            CompletionMode::Free => None,
        },
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        mode: CompletionMode,
    ) -> Result<String> {
        use std::sync::atomic::Ordering;

        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let request = build_request(&self.config, &messages, mode);
        let mut req = self.http_client.post(self.endpoint()).json(&request);

        if let Some(ref api_key) = self.config.api_key {
            req = match self.config.provider {
                LLMProvider::OpenAI => req.header("Authorization", format!("Bearer {}", api_key)),
                LLMProvider::Azure => req.header("api-key", api_key),
            };
        }

        let response = req.send().await.map_err(|e| {
            self.record_error();
            BlogScoutError::BackendUnavailable(e.to_string())
        })?;

        if !response.status().is_success() {
            self.record_error();
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BlogScoutError::BackendUnavailable(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            self.record_error();
            BlogScoutError::Llm(format!("unreadable completion payload: {}", e))
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                self.record_error();
                BlogScoutError::Llm("No response from LLM".to_string())
            })?;

        let elapsed = start.elapsed().as_millis() as u64;
        self.metrics
            .total_latency_ms
            .fetch_add(elapsed, Ordering::Relaxed);

        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
