//! Background execution of an analysis task.
//!
//! The runner owns every write to its task after submission. Pipeline errors
//! stop at this boundary and become the task's `failed` state.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::pipeline::{Pipeline, PipelineError};

use super::registry::TaskRegistry;
use super::task::{AnalysisResults, TaskError, TaskId, TaskStatus};

/// Why a run stopped early.
#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Launch the analysis for `task_id` in the background.
///
/// Completion is reported only through the registry. The run is supervised:
/// if it panics or is cancelled, the task is marked failed instead of being
/// left in a non-terminal state.
pub fn spawn_analysis(
    registry: Arc<TaskRegistry>,
    pipeline: Arc<Pipeline>,
    task_id: TaskId,
    codebase_path: PathBuf,
) -> JoinHandle<()> {
    let run = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            run_analysis(&registry, &pipeline, task_id, codebase_path).await;
        })
    };

    tokio::spawn(async move {
        let Err(join_err) = run.await else {
            return;
        };

        let reason = if join_err.is_panic() {
            "analysis task panicked"
        } else {
            "analysis task was cancelled"
        };
        tracing::error!("Task {}: {}: {}", task_id, reason, join_err);
        if let Err(update_err) = registry
            .fail(task_id, format!("An error occurred: {}", reason))
            .await
        {
            tracing::error!("Task {}: failed to record failure: {}", task_id, update_err);
        }
    })
}

/// Run the full analysis for one task, recording each phase in the registry.
pub async fn run_analysis(
    registry: &TaskRegistry,
    pipeline: &Pipeline,
    task_id: TaskId,
    codebase_path: PathBuf,
) {
    tracing::info!("Starting analysis for task {}...", task_id);

    match run_phases(registry, pipeline, task_id, codebase_path).await {
        Ok(()) => tracing::info!("Task {}: Analysis complete.", task_id),
        Err(RunError::Task(e)) => {
            // Registry refused a write; the task was never ours to update.
            tracing::error!("Task {}: bookkeeping failed: {}", task_id, e);
        }
        Err(RunError::Pipeline(e)) => {
            tracing::error!("Error during analysis for task {}: {}", task_id, e);
            if let Err(update_err) = registry
                .fail(task_id, format!("An error occurred: {}", e))
                .await
            {
                tracing::error!("Task {}: failed to record failure: {}", task_id, update_err);
            }
        }
    }
}

async fn run_phases(
    registry: &TaskRegistry,
    pipeline: &Pipeline,
    task_id: TaskId,
    codebase_path: PathBuf,
) -> Result<(), RunError> {
    registry
        .update(task_id, TaskStatus::Parsing, "Parsing PL/SQL files...")
        .await?;
    let structured_docs = pipeline.parse(&codebase_path).await?;

    tracing::info!("Task {}: Parsing complete. Generating documentation...", task_id);
    registry
        .update(
            task_id,
            TaskStatus::GeneratingDocs,
            "Generating file-level documentation...",
        )
        .await?;
    let documentation = crate::pipeline::formatter::render_documentation(&structured_docs);

    tracing::info!("Task {}: Documentation complete. Generating summary...", task_id);
    registry
        .update(
            task_id,
            TaskStatus::GeneratingSummary,
            "Generating codebase summary...",
        )
        .await?;
    let summary = pipeline.generate_summary(&codebase_path).await?;

    registry
        .set_results(
            task_id,
            AnalysisResults {
                documentation,
                summary,
            },
            "Analysis successfully completed.",
        )
        .await?;
    Ok(())
}
