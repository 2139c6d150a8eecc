//! Grammar-check task endpoints.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    response::{
        sse::{Event, Sse},
        Json,
    },
};
use futures::stream::Stream;
use uuid::Uuid;

use super::error::ApiError;
use super::routes::AppState;
use super::types::{CheckRequest, ListTasksQuery, SubmitResponse};
use crate::tasks::{Task, TaskStatus};

const STREAM_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Submit a text for checking. Returns immediately with a pending task.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::Validation(
            "Input text cannot be empty.".to_string(),
        ));
    }

    let handle = state.tasks.create(req.text).await?;

    Ok(Json(SubmitResponse {
        task_id: handle.id(),
        status: TaskStatus::Pending,
        message: "The task is running in the background.".to_string(),
    }))
}

/// Get task status and result.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_task_id(&task_id)?;
    Ok(Json(state.tasks.get(id).await?))
}

/// List tasks, most recent first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTasksQuery>,
) -> Json<Vec<Task>> {
    Json(state.tasks.list(query.limit(), query.offset()).await)
}

/// Stream task progress via SSE: one `status` event, then `done` once the
/// task is terminal.
pub async fn stream(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let id = parse_task_id(&task_id)?;
    let initial = state.tasks.get(id).await?;

    let stream = async_stream::stream! {
        let mut task = initial;
        if let Some(event) = json_event("status", &task) {
            yield Ok(event);
        }

        while !task.status.is_terminal() {
            tokio::time::sleep(STREAM_POLL_INTERVAL).await;
            task = match state.tasks.get(id).await {
                Ok(task) => task,
                Err(_) => break,
            };
        }

        if task.status.is_terminal() {
            if let Some(event) = json_event("done", &task) {
                yield Ok(event);
            }
        }
    };

    Ok(Sse::new(stream))
}

fn json_event(name: &str, task: &Task) -> Option<Event> {
    match Event::default().event(name).json_data(task) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(task_id = %task.task_id, "Failed to encode {} event: {}", name, e);
            None
        }
    }
}

/// Ids that do not parse can never name a task, so they are reported as
/// not found rather than as a bad request.
fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}
