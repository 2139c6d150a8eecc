//! Scripted completion client.
//!
//! Replays a fixed sequence of outcomes, one per call. Once the script runs
//! out, the last outcome repeats. Used by tests and by the `scripted` backend
//! for running the server without provider credentials.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::error::LlmError;
use super::LlmClient;

pub struct ScriptedClient {
    outcomes: Vec<Result<String, LlmError>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedClient {
    /// Replay `outcomes` in order, repeating the last one.
    pub fn new(outcomes: Vec<Result<String, LlmError>>) -> Self {
        Self {
            outcomes,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer every call with the same raw text.
    pub fn always(raw: impl Into<String>) -> Self {
        Self::new(vec![Ok(raw.into())])
    }

    /// Fail every call with the same error.
    pub fn failing(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Sleep for `latency` before answering each call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, _system_prompt: &str, _user_text: &str) -> Result<String, LlmError> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.outcomes
            .get(i)
            .or_else(|| self.outcomes.last())
            .cloned()
            .unwrap_or_else(|| {
                Err(LlmError::parse_error(
                    "ScriptedClient: empty script".to_string(),
                ))
            })
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
