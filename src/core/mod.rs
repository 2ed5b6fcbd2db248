//! Core business logic for Phenoscribe.
//!
//! # Modules
//!
//! - [`input`] - Gene table loading and reshaping into clusters
//! - [`analysis`] - Batch runner and run summary
//! - [`state`] - Per-cluster checkpoint store
//! - [`report`] - Combined JSON and summary TSV
//!
//! # Workflow
//!
//! 1. **Load**: Read the gene-level TSV
//! 2. **Reshape**: Group genes into one work item per cluster
//! 3. **Discover**: List clusters that already have a checkpoint
//! 4. **Analyze**: Call the analyzer for each remaining cluster, saving each result immediately
//! 5. **Combine**: Rebuild the aggregate outputs from all checkpoints

pub mod analysis;
pub mod input;
pub mod report;
pub mod state;
