//! Request and response bodies for the HTTP API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::{AnalysisResults, Task, TaskStatus};

/// Body of `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    /// Directory containing the PL/SQL sources, as seen by the server
    pub codebase_path: String,
}

/// Task status as reported to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskResponse {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub details: String,
    /// Directory the task analyzes
    pub codebase_path: String,
    pub created_at: DateTime<Utc>,
    /// Time of the last status change
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            task_id: task.id,
            status: task.status,
            details: task.details,
            codebase_path: task.codebase_path.to_string_lossy().into_owned(),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Body of `GET /results/{task_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub task_id: Uuid,
    pub results: AnalysisResults,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Task counts keyed by status name
    pub tasks: BTreeMap<String, usize>,
}
