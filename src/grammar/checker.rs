//! One grammar check: prompt the model, parse its answer, retry what is
//! worth retrying.

use std::sync::Arc;

use super::retry::{self, Outcome, RetryPolicy};
use super::{parse_corrections, prompt, CheckError, Correction};
use crate::llm::LlmClient;

/// Completion client, response parser and retry policy composed into one
/// grammar check.
#[derive(Clone)]
pub struct GrammarChecker {
    client: Arc<dyn LlmClient>,
    policy: RetryPolicy,
}

impl GrammarChecker {
    pub fn new(client: Arc<dyn LlmClient>, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Check `text`, retrying transient upstream failures.
    pub async fn check(&self, text: &str) -> Outcome<Vec<Correction>> {
        retry::execute(&self.policy, || self.attempt(text)).await
    }

    async fn attempt(&self, text: &str) -> Result<Vec<Correction>, CheckError> {
        let raw = self.client.complete(prompt::system_prompt(), text).await?;
        Ok(parse_corrections(&raw)?)
    }
}
