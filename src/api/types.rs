//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tasks::TaskStatus;

/// Request to check a piece of text.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRequest {
    /// Free-form text to analyse
    pub text: String,
}

/// Response after submitting a text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Identifier to poll the status endpoint with
    pub task_id: Uuid,

    /// Always `pending` at submission time
    pub status: TaskStatus,

    pub message: String,
}

/// Query parameters for listing tasks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListTasksQuery {
    pub const DEFAULT_LIMIT: usize = 20;
    pub const MAX_LIMIT: usize = 100;

    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .min(Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Model the completion client is configured with
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_limit_is_clamped() {
        let query = ListTasksQuery {
            limit: Some(10_000),
            offset: None,
        };
        assert_eq!(query.limit(), ListTasksQuery::MAX_LIMIT);
        assert_eq!(query.offset(), 0);
        assert_eq!(ListTasksQuery::default().limit(), 20);
    }
}
