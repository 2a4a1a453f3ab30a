//! Analysis task endpoints.
//!
//! - `POST /analyze` - queue an analysis of a codebase directory
//! - `GET /tasks` - every known task, newest first
//! - `GET /status/:task_id` - current phase of a task
//! - `GET /results/:task_id` - documentation and summary of a completed task

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::task::{self, Task, TaskStatus};

use super::routes::AppState;
use super::types::{AnalysisRequest, ResultsResponse, TaskResponse};

/// Create the analysis routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze", post(start_analysis))
        .route("/tasks", get(list_tasks))
        .route("/status/:task_id", get(get_status))
        .route("/results/:task_id", get(get_results))
}

/// Look up a task by its path segment; malformed ids are reported as unknown.
async fn find_task(state: &AppState, task_id: &str) -> Result<Task, (StatusCode, String)> {
    let not_found = || (StatusCode::NOT_FOUND, "Task not found".to_string());
    let id = Uuid::parse_str(task_id).map_err(|_| not_found())?;
    state.tasks.get(id).await.ok_or_else(not_found)
}

/// POST /analyze - Queue a new analysis task.
async fn start_analysis(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), (StatusCode, String)> {
    if req.codebase_path.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "codebase_path must not be empty".to_string(),
        ));
    }

    let codebase_path = PathBuf::from(&req.codebase_path);
    let id = state.tasks.create(codebase_path.clone()).await;
    // Snapshot before the runner can move it past `pending`.
    let queued = state.tasks.get(id).await.ok_or_else(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Task vanished after creation".to_string(),
        )
    })?;

    task::spawn_analysis(
        Arc::clone(&state.tasks),
        Arc::clone(&state.pipeline),
        id,
        codebase_path,
    );

    tracing::info!("Task {} created for path: {}", id, req.codebase_path);

    Ok((StatusCode::ACCEPTED, Json(queued.into())))
}

/// GET /tasks - All tasks, most recent first.
async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<Vec<TaskResponse>> {
    let tasks = state.tasks.list().await;
    Json(tasks.into_iter().map(TaskResponse::from).collect())
}

/// GET /status/:task_id - Current status of a task.
async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>, (StatusCode, String)> {
    let task = find_task(&state, &task_id).await?;
    Ok(Json(task.into()))
}

/// GET /results/:task_id - Results of a completed task.
async fn get_results(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<ResultsResponse>, (StatusCode, String)> {
    let task = find_task(&state, &task_id).await?;

    match (task.status, task.results) {
        (TaskStatus::Completed, Some(results)) => Ok(Json(ResultsResponse {
            task_id: task.id,
            results,
        })),
        (status, _) => Err((
            StatusCode::BAD_REQUEST,
            format!("Task is not yet complete. Current status: {}", status),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{write_file, StubCollaborator};
    use crate::pipeline::Pipeline;
    use crate::task::TaskRegistry;
    use std::time::Duration;
    use tempfile::tempdir;

    fn state(extractor: StubCollaborator) -> Arc<AppState> {
        Arc::new(AppState {
            tasks: Arc::new(TaskRegistry::new()),
            pipeline: Arc::new(Pipeline::new(
                Arc::new(extractor),
                Arc::new(StubCollaborator::new("SUM:")),
            )),
        })
    }

    async fn wait_for_terminal(state: &AppState, id: Uuid) -> Task {
        for _ in 0..500 {
            let task = state.tasks.get(id).await.unwrap();
            if task.status.is_terminal() {
                return task;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("task {} did not finish", id);
    }

    #[tokio::test]
    async fn test_analyze_then_fetch_results() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "a.sql", "SELECT 1;");
        write_file(temp.path(), "b.pkb", "BEGIN NULL; END;");
        let state = state(StubCollaborator::new("STRUCT:"));

        let (code, Json(accepted)) = start_analysis(
            State(Arc::clone(&state)),
            Json(AnalysisRequest {
                codebase_path: temp.path().to_string_lossy().to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(code, StatusCode::ACCEPTED);
        assert_eq!(accepted.status, TaskStatus::Pending);
        assert_eq!(accepted.details, "Analysis has been queued.");

        wait_for_terminal(&state, accepted.task_id).await;

        let task_id = accepted.task_id.to_string();
        let Json(status) = get_status(State(Arc::clone(&state)), Path(task_id.clone()))
            .await
            .unwrap();
        assert_eq!(status.status, TaskStatus::Completed);

        let Json(results) = get_results(State(Arc::clone(&state)), Path(task_id))
            .await
            .unwrap();
        assert_eq!(results.task_id, accepted.task_id);
        assert!(results.results.documentation.contains("STRUCT:SELECT 1;"));
        assert!(results.results.summary.contains("SUM:BEGIN NULL; END;"));
    }

    #[tokio::test]
    async fn test_status_unknown_id_is_not_found() {
        let state = state(StubCollaborator::new("S:"));

        let (code, _) = get_status(State(Arc::clone(&state)), Path(Uuid::new_v4().to_string()))
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::NOT_FOUND);

        let (code, _) = get_status(State(Arc::clone(&state)), Path("not-a-uuid".to_string()))
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::NOT_FOUND);

        let (code, _) = get_results(State(state), Path(Uuid::new_v4().to_string()))
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_results_while_parsing_is_client_error() {
        let state = state(StubCollaborator::new("S:"));
        let id = state.tasks.create(PathBuf::from("/code")).await;
        state
            .tasks
            .update(id, TaskStatus::Parsing, "Parsing PL/SQL files...")
            .await
            .unwrap();

        let (code, message) = get_results(State(state), Path(id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Task is not yet complete. Current status: parsing");
        assert!(!message.contains("results"));
    }

    #[tokio::test]
    async fn test_failed_task_never_exposes_results() {
        let temp = tempdir().unwrap();
        write_file(temp.path(), "a.sql", "A");
        write_file(temp.path(), "b.sql", "B");
        write_file(temp.path(), "c.sql", "C");
        let state = state(StubCollaborator::failing_on("S:", 1));

        let (_, Json(accepted)) = start_analysis(
            State(Arc::clone(&state)),
            Json(AnalysisRequest {
                codebase_path: temp.path().to_string_lossy().to_string(),
            }),
        )
        .await
        .unwrap();

        let task = wait_for_terminal(&state, accepted.task_id).await;
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.results.is_none());

        let task_id = accepted.task_id.to_string();
        let Json(status) = get_status(State(Arc::clone(&state)), Path(task_id.clone()))
            .await
            .unwrap();
        assert_eq!(status.status, TaskStatus::Failed);
        assert!(status.details.contains("model unavailable"));

        let (code, message) = get_results(State(state), Path(accepted.task_id.to_string()))
            .await
            .unwrap_err();
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert!(message.ends_with("failed"));
    }

    #[tokio::test]
    async fn test_empty_codebase_path_rejected() {
        let state = state(StubCollaborator::new("S:"));
        let (code, _) = start_analysis(
            State(Arc::clone(&state)),
            Json(AnalysisRequest {
                codebase_path: "  ".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(code, StatusCode::BAD_REQUEST);
        let Json(tasks) = list_tasks(State(state)).await;
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_list_tasks_newest_first() {
        let state = state(StubCollaborator::new("S:"));
        let first = state.tasks.create(PathBuf::from("/code/first")).await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = state.tasks.create(PathBuf::from("/code/second")).await;

        let Json(tasks) = list_tasks(State(state)).await;
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.task_id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(tasks[0].codebase_path, "/code/second");
        assert_eq!(tasks[1].status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_status_reports_last_change() {
        let state = state(StubCollaborator::new("S:"));
        let id = state.tasks.create(PathBuf::from("/code")).await;

        let Json(queued) = get_status(State(Arc::clone(&state)), Path(id.to_string()))
            .await
            .unwrap();
        assert_eq!(queued.created_at, queued.updated_at);
        assert_eq!(queued.codebase_path, "/code");

        tokio::time::sleep(Duration::from_millis(2)).await;
        state
            .tasks
            .update(id, TaskStatus::Parsing, "Parsing PL/SQL files...")
            .await
            .unwrap();

        let Json(parsing) = get_status(State(state), Path(id.to_string()))
            .await
            .unwrap();
        assert_eq!(parsing.status, TaskStatus::Parsing);
        assert_eq!(parsing.created_at, queued.created_at);
        assert!(parsing.updated_at > queued.updated_at);
    }

    #[test]
    fn test_task_response_json_shape() {
        let task = Task::new(PathBuf::from("/code"));
        let json = serde_json::to_value(TaskResponse::from(task.clone())).unwrap();
        assert_eq!(json["task_id"], task.id.to_string());
        assert_eq!(json["status"], "pending");
        assert_eq!(json["details"], "Analysis has been queued.");
        assert_eq!(json["codebase_path"], "/code");
        assert!(json["updated_at"].is_string());
    }
}
