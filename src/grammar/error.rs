//! Errors produced while checking a text.

use thiserror::Error;

use super::ParseError;
use crate::llm::{LlmError, LlmErrorKind};

/// Outcome classes of one grammar check. The retry executor matches on these
/// exhaustively: only `UpstreamTransient` is retried.
#[derive(Debug, Error, Clone)]
pub enum CheckError {
    #[error("Upstream API error (transient): {0}")]
    UpstreamTransient(LlmError),

    #[error("Upstream API error: {0}")]
    UpstreamFatal(LlmError),

    #[error("Invalid response format: {0}")]
    Parse(#[from] ParseError),

    #[error("Upstream API error after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: LlmError },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl CheckError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CheckError::UpstreamTransient(_))
    }
}

impl From<LlmError> for CheckError {
    fn from(error: LlmError) -> Self {
        match error.kind {
            LlmErrorKind::RateLimited | LlmErrorKind::ServerError | LlmErrorKind::NetworkError => {
                CheckError::UpstreamTransient(error)
            }
            LlmErrorKind::ClientError => CheckError::UpstreamFatal(error),
            LlmErrorKind::ParseError => CheckError::Unexpected(error.to_string()),
        }
    }
}
