//! # plsql-docgen
//!
//! A background analysis service that documents PL/SQL codebases with an LLM.
//!
//! This library provides:
//! - An HTTP API for task submission and status polling
//! - A pipeline that walks `.sql`/`.pks`/`.pkb` sources and asks an LLM for
//!   their structure and a business-level summary
//! - An in-memory task registry with a strictly forward state machine
//!
//! ## Task Flow
//! 1. Receive a codebase path via `POST /analyze`
//! 2. Spawn a background run and return the task id
//! 3. Extract per-file structure and render the documentation
//! 4. Summarize each file and render the summary
//! 5. Serve both artifacts from `GET /results/{task_id}`
//!
//! ## Modules
//! - `api`: axum routes and server
//! - `pipeline`: file collection, collaborators and Markdown rendering
//! - `task`: task state, registry and runner
//! - `llm`: chat-completions client

pub mod api;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod task;

pub use config::Config;
