//! HTTP server setup and shared state.

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::llm::{ChatOptions, LlmClient, OpenRouterClient};
use crate::pipeline::{structure_extractor, summary_inferer, Pipeline};
use crate::task::{SharedTaskRegistry, TaskRegistry};

use super::analysis;
use super::types::HealthResponse;

/// Shared application state.
pub struct AppState {
    /// All submitted tasks
    pub tasks: SharedTaskRegistry,
    /// Pipeline run by every background task
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    /// Build the state backed by the configured LLM provider.
    pub fn from_config(config: &Config) -> Self {
        let llm: Arc<dyn LlmClient> = Arc::new(OpenRouterClient::with_api_url(
            config.api_key.clone(),
            config.api_url.clone(),
        ));
        let options = ChatOptions {
            temperature: config.temperature,
            max_tokens: None,
        };

        let extractor = structure_extractor(Arc::clone(&llm), config.default_model.clone())
            .with_options(options.clone());
        let summarizer =
            summary_inferer(Arc::clone(&llm), config.default_model.clone()).with_options(options);

        let pipeline = Pipeline::new(Arc::new(extractor), Arc::new(summarizer))
            .with_file_concurrency(config.file_concurrency);

        Self {
            tasks: Arc::new(TaskRegistry::new()),
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(analysis::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Using model {} with up to {} concurrent file requests",
        config.default_model,
        config.file_concurrency
    );

    let state = Arc::new(AppState::from_config(&config));
    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGTERM/SIGINT.
///
/// In-flight analyses are abandoned; task state is memory-only.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let tasks = state
        .tasks
        .counts()
        .await
        .into_iter()
        .map(|(status, count)| (status.to_string(), count))
        .collect();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tasks,
    })
}
