//! LLM client module for interacting with completion backends.
//!
//! This module provides a trait-based abstraction over completion providers,
//! with an OpenAI-compatible HTTP client as the primary implementation and a
//! scripted client for tests and local development.
//!
//! Clients never retry. They classify failures into [`LlmErrorKind`] and
//! leave the retry decision to the caller.

mod error;
mod openai;
mod scripted;

pub use error::{classify_http_status, LlmError, LlmErrorKind};
pub use openai::{OpenAiClient, DEFAULT_BASE_URL};
pub use scripted::ScriptedClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a text message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        ChatMessage {
            role,
            content: content.into(),
        }
    }
}

/// Trait for completion clients.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run a single completion of `user_text` under `system_prompt` and
    /// return the raw assistant text.
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, LlmError>;

    /// Model identifier used by this client (for diagnostics).
    fn model(&self) -> &str;
}
