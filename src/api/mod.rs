//! HTTP API for the grammar-check service.
//!
//! ## Endpoints
//!
//! - `POST /grammar-check` - Submit text, returns a pending task id
//! - `GET /grammar-check/status/{task_id}` - Get task status and result
//! - `GET /grammar-check/status/{task_id}/stream` - Stream task progress via SSE
//! - `GET /grammar-check/tasks` - List tasks, newest first
//! - `GET /health` - Health check
//! - `GET /stats` - Task counts by status

mod error;
mod grammar_check;
mod routes;
pub mod types;

pub use error::ApiError;
pub use routes::{build_router, serve, AppState};
pub use types::*;
