//! Errors surfaced directly to HTTP clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::tasks::TaskError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Task ID not found.")]
    NotFound,

    #[error("Error processing text: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(_) => ApiError::NotFound,
            TaskError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref message) = self {
            tracing::error!("Request failed: {}", message);
        }
        (self.status_code(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::StoreError;
    use uuid::Uuid;

    #[test]
    fn task_errors_map_to_status_codes() {
        let not_found: ApiError = TaskError::NotFound(Uuid::new_v4()).into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let id = Uuid::new_v4();
        let internal: ApiError = TaskError::Store(StoreError::Duplicate(id)).into();
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            internal.to_string(),
            format!("Error processing text: Task {} already exists", id)
        );
    }
}
