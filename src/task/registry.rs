//! In-memory task registry shared by request handlers and background runners.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::task::{AnalysisResults, Task, TaskError, TaskId, TaskStatus};

/// Process-lifetime store of analysis tasks.
///
/// Entries are never removed. Only the runner that owns a task writes to it;
/// the lock is never held across an await.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

/// Shared registry wrapped in Arc for concurrent access.
pub type SharedTaskRegistry = Arc<TaskRegistry>;

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending task and return its id.
    pub async fn create(&self, codebase_path: PathBuf) -> TaskId {
        let task = Task::new(codebase_path);
        let id = task.id;
        self.tasks.write().await.insert(id, task);
        id
    }

    /// Get a snapshot of a task.
    pub async fn get(&self, id: TaskId) -> Option<Task> {
        self.tasks.read().await.get(&id).cloned()
    }

    /// Move a task to `status` with new details.
    pub async fn update(
        &self,
        id: TaskId,
        status: TaskStatus,
        details: impl Into<String>,
    ) -> Result<(), TaskError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        task.transition(status, details)
    }

    /// Attach results and mark the task completed.
    pub async fn set_results(
        &self,
        id: TaskId,
        results: AnalysisResults,
        details: impl Into<String>,
    ) -> Result<(), TaskError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or(TaskError::NotFound(id))?;
        task.transition(TaskStatus::Completed, details)?;
        task.results = Some(results);
        Ok(())
    }

    /// Mark a task failed.
    pub async fn fail(&self, id: TaskId, message: impl Into<String>) -> Result<(), TaskError> {
        self.update(id, TaskStatus::Failed, message).await
    }

    /// Snapshot of all tasks, newest first.
    pub async fn list(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks
    }

    /// Number of tasks in each status.
    pub async fn counts(&self) -> HashMap<TaskStatus, usize> {
        let mut counts: HashMap<TaskStatus, usize> =
            TaskStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for task in self.tasks.read().await.values() {
            *counts.entry(task.status).or_default() += 1;
        }
        counts
    }
}
