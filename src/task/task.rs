//! Analysis task state and its lifecycle rules.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a submitted analysis.
pub type TaskId = Uuid;

/// Lifecycle state of an analysis task.
///
/// Forward order is `Pending → Parsing → GeneratingDocs → GeneratingSummary →
/// Completed`; any non-terminal state may move to `Failed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Parsing,
    GeneratingDocs,
    GeneratingSummary,
    Completed,
    Failed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        Self::Pending,
        Self::Parsing,
        Self::GeneratingDocs,
        Self::GeneratingSummary,
        Self::Completed,
        Self::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Parsing => "parsing",
            Self::GeneratingDocs => "generating_docs",
            Self::GeneratingSummary => "generating_summary",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `Completed` and `Failed` never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// The next state on the success path, if any.
    pub fn next(&self) -> Option<TaskStatus> {
        match self {
            Self::Pending => Some(Self::Parsing),
            Self::Parsing => Some(Self::GeneratingDocs),
            Self::GeneratingDocs => Some(Self::GeneratingSummary),
            Self::GeneratingSummary => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    pub fn can_transition_to(&self, to: TaskStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Failed || self.next() == Some(to)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifacts of a completed analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResults {
    pub documentation: String,
    pub summary: String,
}

/// One submitted analysis and its current state.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub codebase_path: PathBuf,
    pub status: TaskStatus,
    pub details: String,
    pub results: Option<AnalysisResults>,
    /// Every status the task has entered, oldest first
    pub history: Vec<TaskStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub const QUEUED_DETAILS: &'static str = "Analysis has been queued.";

    /// Create a pending task with a fresh identifier.
    pub fn new(codebase_path: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            codebase_path,
            status: TaskStatus::Pending,
            details: Self::QUEUED_DETAILS.to_string(),
            results: None,
            history: vec![TaskStatus::Pending],
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `status`, enforcing the lifecycle rules.
    pub fn transition(
        &mut self,
        status: TaskStatus,
        details: impl Into<String>,
    ) -> Result<(), TaskError> {
        if !self.status.can_transition_to(status) {
            return Err(TaskError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        self.details = details.into();
        self.history.push(status);
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Errors raised by task bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("Task {0} not found")]
    NotFound(TaskId),
    #[error("Task {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },
}
