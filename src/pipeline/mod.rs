//! Analysis pipeline: collect PL/SQL files, run collaborators, render Markdown.
//!
//! ```text
//!   collect ──► structure extractor ──► render_documentation ──► documentation
//!   collect ──► summary inferer     ──► render_summary       ──► summary
//! ```
//!
//! Each path collects the codebase on its own. Per-file collaborator calls may
//! run concurrently; results are always kept in collection order and the first
//! failing file aborts the whole path.

pub mod collaborator;
pub mod collector;
pub mod formatter;

pub use collaborator::{
    structure_extractor, summary_inferer, Collaborator, CollaboratorRef, LlmCollaborator,
    PromptTemplate,
};
pub use collector::{collect, collect_async, CollectError, FileRecord, PLSQL_EXTENSIONS};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};

/// Structure extraction result for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredDoc {
    pub path: PathBuf,
    pub structure: String,
}

/// Summary result for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub summary: String,
}

/// Errors raised by the analysis pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error("{collaborator} failed on {}: {error:#}", .path.display())]
    Collaborator {
        collaborator: String,
        path: PathBuf,
        error: anyhow::Error,
    },
}

/// Sequences collection, collaborator calls and rendering.
pub struct Pipeline {
    extractor: CollaboratorRef,
    summarizer: CollaboratorRef,
    file_concurrency: usize,
}

impl Pipeline {
    /// Create a pipeline that processes files one at a time.
    pub fn new(extractor: CollaboratorRef, summarizer: CollaboratorRef) -> Self {
        Self {
            extractor,
            summarizer,
            file_concurrency: 1,
        }
    }

    /// Allow up to `n` collaborator calls in flight per phase (minimum 1).
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }

    /// Collect the codebase and extract the structure of every file.
    pub async fn parse(&self, root: &Path) -> Result<Vec<StructuredDoc>, PipelineError> {
        let records = collect_async(root.to_path_buf()).await?;
        tracing::info!(
            "Extracting structure from {} files under {}",
            records.len(),
            root.display()
        );

        let results = self.apply(&self.extractor, records).await?;
        Ok(results
            .into_iter()
            .map(|(path, structure)| StructuredDoc { path, structure })
            .collect())
    }

    /// Build the documentation artifact for a codebase.
    pub async fn generate_documentation(&self, root: &Path) -> Result<String, PipelineError> {
        let docs = self.parse(root).await?;
        Ok(formatter::render_documentation(&docs))
    }

    /// Build the summary artifact for a codebase.
    ///
    /// Collects the files again rather than reusing the documentation pass.
    pub async fn generate_summary(&self, root: &Path) -> Result<String, PipelineError> {
        let records = collect_async(root.to_path_buf()).await?;
        tracing::info!("Summarizing {} files under {}", records.len(), root.display());

        let results = self.apply(&self.summarizer, records).await?;
        let summaries: Vec<FileSummary> = results
            .into_iter()
            .map(|(path, summary)| FileSummary { path, summary })
            .collect();
        Ok(formatter::render_summary(&summaries))
    }

    /// Run a collaborator over every record, preserving input order.
    async fn apply(
        &self,
        collaborator: &CollaboratorRef,
        records: Vec<FileRecord>,
    ) -> Result<Vec<(PathBuf, String)>, PipelineError> {
        stream::iter(records)
            .map(|record| {
                let collaborator = Arc::clone(collaborator);
                async move {
                    tracing::debug!("{}: {}", collaborator.name(), record.path.display());
                    match collaborator.run(&record.content).await {
                        Ok(output) => Ok((record.path, output)),
                        Err(error) => Err(PipelineError::Collaborator {
                            collaborator: collaborator.name().to_string(),
                            path: record.path,
                            error,
                        }),
                    }
                }
            })
            .buffered(self.file_concurrency)
            .try_collect()
            .await
    }
}
