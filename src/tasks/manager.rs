//! Task lifecycle: creation, background execution and status reads.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{Completion, StoreError, Task, TaskStats, TaskStore};
use crate::grammar::{CheckError, GrammarChecker, Outcome};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Handle to a spawned background run.
///
/// Dropping the handle detaches the run; it still finishes and records its
/// outcome.
pub struct TaskHandle {
    id: Uuid,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait until the run has recorded its terminal state.
    pub async fn finished(self) {
        if let Err(e) = self.join.await {
            warn!(task_id = %self.id, "Background run did not complete: {}", e);
        }
    }
}

/// Owns the task store and launches one background run per task.
#[derive(Clone)]
pub struct TaskManager {
    store: Arc<TaskStore>,
    checker: GrammarChecker,
}

impl TaskManager {
    pub fn new(checker: GrammarChecker) -> Self {
        Self::with_store(Arc::new(TaskStore::new()), checker)
    }

    pub fn with_store(store: Arc<TaskStore>, checker: GrammarChecker) -> Self {
        Self { store, checker }
    }

    pub fn model(&self) -> &str {
        self.checker.model()
    }

    /// Register a pending task for `text` and start checking it in the
    /// background. Returns as soon as the record exists.
    pub async fn create(&self, text: String) -> Result<TaskHandle, TaskError> {
        let id = Uuid::new_v4();
        self.store.insert(Task::pending(id)).await?;
        info!(task_id = %id, chars = text.len(), "Task created");

        let join = tokio::spawn(run_check(
            Arc::clone(&self.store),
            self.checker.clone(),
            id,
            text,
        ));
        Ok(TaskHandle { id, join })
    }

    pub async fn get(&self, id: Uuid) -> Result<Task, TaskError> {
        self.store.get(id).await.ok_or(TaskError::NotFound(id))
    }

    pub async fn list(&self, limit: usize, offset: usize) -> Vec<Task> {
        self.store.list(limit, offset).await
    }

    pub async fn stats(&self) -> TaskStats {
        self.store.stats().await
    }
}

/// Background unit: check `text` and commit the outcome for `id`.
async fn run_check(store: Arc<TaskStore>, checker: GrammarChecker, id: Uuid, text: String) {
    let run = AssertUnwindSafe(checker.check(&text)).catch_unwind().await;

    let (completion, attempts) = match run {
        Ok(Outcome {
            result: Ok(corrections),
            attempts,
        }) => (Completion::Succeeded(corrections), attempts),
        Ok(Outcome {
            result: Err(err),
            attempts,
        }) => {
            error!(task_id = %id, attempts, "Grammar check failed: {}", err);
            (Completion::Failed(err.to_string()), attempts)
        }
        Err(panic) => {
            let err = CheckError::Unexpected(panic_message(panic.as_ref()));
            error!(task_id = %id, "Grammar check panicked: {}", err);
            // The first attempt starts before anything can panic.
            (Completion::Failed(err.to_string()), 1)
        }
    };

    match store.finish(id, completion, attempts).await {
        Ok(task) => info!(task_id = %id, status = ?task.status, attempts, "Task finished"),
        Err(e) => warn!(task_id = %id, "Could not record task outcome: {}", e),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "background run panicked".to_string()
    }
}
