//! Task module - analysis tasks, their registry and the background runner.
//!
//! A task moves strictly forward through its phases:
//! - `pending → parsing → generating_docs → generating_summary → completed`
//! - any non-terminal phase may end in `failed`
//!
//! The transition rules live on `TaskStatus` so the registry can refuse any
//! write that would break them.

pub mod registry;
pub mod runner;
pub mod task;

pub use registry::{SharedTaskRegistry, TaskRegistry};
pub use runner::{run_analysis, spawn_analysis};
pub use task::{AnalysisResults, Task, TaskError, TaskId, TaskStatus};
