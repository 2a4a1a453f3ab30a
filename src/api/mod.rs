//! HTTP API for submitting analyses and polling their progress.

mod analysis;
mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
