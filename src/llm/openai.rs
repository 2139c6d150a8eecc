//! OpenAI-compatible chat completions client.
//!
//! Performs exactly one HTTP request per call and classifies the outcome.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::LlmError;
use super::{ChatMessage, LlmClient, Role};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for any endpoint speaking the OpenAI chat completions protocol.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    /// Create a client against `base_url` (OpenAI, proxies, compatible providers).
    pub fn with_base_url(
        api_key: String,
        model: String,
        base_url: &str,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            model,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }

    /// Parse Retry-After header if present.
    fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
        headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Map a transport failure onto an error kind. Requests that could not
    /// be built will fail the same way every time.
    fn transport_error(e: reqwest::Error) -> LlmError {
        if e.is_builder() {
            LlmError::invalid_request(format!("Invalid request: {}", e))
        } else if e.is_timeout() {
            LlmError::network_error(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            LlmError::network_error(format!("Connection failed: {}", e))
        } else {
            LlmError::network_error(format!("Request failed: {}", e))
        }
    }

    async fn execute_request(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        let retry_after = Self::parse_retry_after(response.headers());
        let body = response.text().await.map_err(Self::transport_error)?;

        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), &body, retry_after));
        }

        extract_content(&body)
    }
}

/// Pull the assistant text out of a chat completions response body.
fn extract_content(body: &str) -> Result<String, LlmError> {
    let parsed: CompletionResponse = serde_json::from_str(body).map_err(|e| {
        LlmError::parse_error(format!("Failed to parse response: {}, body: {}", e, body))
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::parse_error("No content in response".to_string()))
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new(Role::System, system_prompt),
                ChatMessage::new(Role::User, user_text),
            ],
            temperature: 0.0,
        };

        tracing::debug!(
            model = %self.model,
            chars = user_text.len(),
            "Sending completion request"
        );

        let result = self.execute_request(&request).await;
        if let Err(ref e) = result {
            tracing::debug!(
                model = %self.model,
                transient = e.is_transient(),
                "Completion failed: {}",
                e
            );
        }
        result
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Chat completions request format.
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

/// Chat completions response format.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}
