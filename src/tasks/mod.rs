//! Task tracking for asynchronous grammar checks.
//!
//! A task is created `pending` when text is submitted and moves exactly once
//! to `completed` or `failed` when its background run ends:
//!
//! ```text
//!            ┌──(success)──▶ completed
//!  pending ──┤
//!            └──(failure)──▶ failed
//! ```

mod manager;
mod store;

pub use manager::{TaskError, TaskHandle, TaskManager};
pub use store::{StoreError, TaskStats, TaskStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grammar::Correction;

/// Task status enumeration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Submitted, background run still in progress
    Pending,
    /// Finished with a (possibly empty) list of corrections
    Completed,
    /// Finished with an error
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

/// Snapshot of a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub task_id: Uuid,
    pub status: TaskStatus,
    /// Present iff `status == completed`
    pub result: Option<Vec<Correction>>,
    /// Present iff `status == failed`
    pub error: Option<String>,
    /// Upstream attempts made by the background run
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn pending(task_id: Uuid) -> Self {
        Self {
            task_id,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            attempts: 0,
            created_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// Terminal result of a background run.
#[derive(Debug, Clone)]
pub enum Completion {
    Succeeded(Vec<Correction>),
    Failed(String),
}
