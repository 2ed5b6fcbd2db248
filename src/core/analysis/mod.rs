//! Batch analysis of clusters
//!
//! - [`runner`] - Sequential, resumable batch runner
//! - [`summary`] - Per-run counts and errors

pub mod runner;
pub mod summary;

pub use runner::{BatchRunner, ItemOutcome};
pub use summary::{RunError, RunErrorKind, RunSummary};
