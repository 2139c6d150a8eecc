//! In-memory task store (non-persistent).
//!
//! Records are replaced whole under the write lock, so readers never see a
//! half-applied transition.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Completion, Task, TaskStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Task {0} already exists")]
    Duplicate(Uuid),

    #[error("Task {0} not found")]
    NotFound(Uuid),

    #[error("Task {0} already finished")]
    AlreadyTerminal(Uuid),
}

/// Task counts by status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskStats {
    pub total_tasks: usize,
    pub pending_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    /// Completed over finished (1.0 when nothing has finished yet)
    pub success_rate: f64,
}

#[derive(Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record. Ids are never reused.
    pub async fn insert(&self, task: Task) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.task_id) {
            return Err(StoreError::Duplicate(task.task_id));
        }
        tasks.insert(task.task_id, task);
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().await.get(&id).cloned()
    }

    /// Commit the terminal transition of a pending task.
    pub async fn finish(
        &self,
        id: Uuid,
        completion: Completion,
        attempts: u32,
    ) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        let current = tasks.get(&id).ok_or(StoreError::NotFound(id))?;
        if current.status.is_terminal() {
            return Err(StoreError::AlreadyTerminal(id));
        }

        let (status, result, error) = match completion {
            Completion::Succeeded(corrections) => (TaskStatus::Completed, Some(corrections), None),
            Completion::Failed(message) => (TaskStatus::Failed, None, Some(message)),
        };
        let finished = Task {
            task_id: id,
            status,
            result,
            error,
            attempts,
            created_at: current.created_at,
            finished_at: Some(Utc::now()),
        };
        tasks.insert(id, finished.clone());
        Ok(finished)
    }

    /// List tasks, most recent first.
    pub async fn list(&self, limit: usize, offset: usize) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks.into_iter().skip(offset).take(limit).collect()
    }

    pub async fn stats(&self) -> TaskStats {
        let tasks = self.tasks.read().await;
        let count = |status: TaskStatus| tasks.values().filter(|t| t.status == status).count();

        let pending_tasks = count(TaskStatus::Pending);
        let completed_tasks = count(TaskStatus::Completed);
        let failed_tasks = count(TaskStatus::Failed);

        let finished = completed_tasks + failed_tasks;
        let success_rate = if finished > 0 {
            completed_tasks as f64 / finished as f64
        } else {
            1.0
        };

        TaskStats {
            total_tasks: tasks.len(),
            pending_tasks,
            completed_tasks,
            failed_tasks,
            success_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Correction;

    fn fix() -> Correction {
        Correction {
            wrong_sentence: "He buyed a book.".to_string(),
            corrected_sentence: "He bought a book.".to_string(),
            error_type: "Verb tense".to_string(),
        }
    }

    #[tokio::test]
    async fn pending_then_completed() {
        let store = TaskStore::new();
        let id = Uuid::new_v4();
        store.insert(Task::pending(id)).await.unwrap();

        let pending = store.get(id).await.unwrap();
        assert_eq!(pending.status, TaskStatus::Pending);
        assert!(pending.result.is_none() && pending.error.is_none());

        let done = store
            .finish(id, Completion::Succeeded(vec![fix()]), 1)
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.result, Some(vec![fix()]));
        assert!(done.error.is_none());
        assert!(done.finished_at.is_some());
        assert_eq!(done.created_at, pending.created_at);
        assert_eq!(store.get(id).await.unwrap(), done);
    }

    #[tokio::test]
    async fn terminal_state_is_final() {
        let store = TaskStore::new();
        let id = Uuid::new_v4();
        store.insert(Task::pending(id)).await.unwrap();
        let failed = store
            .finish(id, Completion::Failed("boom".to_string()), 3)
            .await
            .unwrap();

        let second = store.finish(id, Completion::Succeeded(Vec::new()), 1).await;
        assert_eq!(second.unwrap_err(), StoreError::AlreadyTerminal(id));
        assert_eq!(store.get(id).await.unwrap(), failed);
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert!(failed.result.is_none());
    }

    #[tokio::test]
    async fn rejects_duplicates_and_unknown_ids() {
        let store = TaskStore::new();
        let id = Uuid::new_v4();
        store.insert(Task::pending(id)).await.unwrap();

        assert_eq!(
            store.insert(Task::pending(id)).await.unwrap_err(),
            StoreError::Duplicate(id)
        );

        let unknown = Uuid::new_v4();
        assert!(store.get(unknown).await.is_none());
        assert_eq!(
            store
                .finish(unknown, Completion::Failed("x".to_string()), 1)
                .await
                .unwrap_err(),
            StoreError::NotFound(unknown)
        );
    }

    #[tokio::test]
    async fn stats_and_listing() {
        let store = TaskStore::new();
        assert_eq!(store.stats().await.success_rate, 1.0);

        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            store.insert(Task::pending(*id)).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        store
            .finish(ids[0], Completion::Succeeded(Vec::new()), 1)
            .await
            .unwrap();
        store
            .finish(ids[1], Completion::Failed("x".to_string()), 3)
            .await
            .unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.total_tasks, 4);
        assert_eq!(stats.pending_tasks, 2);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.failed_tasks, 1);
        assert_eq!(stats.success_rate, 0.5);

        let listed = store.list(2, 0).await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].task_id, ids[3]);
        assert_eq!(listed[1].task_id, ids[2]);
        assert_eq!(store.list(10, 3).await[0].task_id, ids[0]);
    }
}
