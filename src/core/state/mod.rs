//! Checkpoint state
//!
//! Resume works off the checkpoint directory alone: a cluster is complete
//! exactly when a valid checkpoint document for it exists.

pub mod store;

pub use store::{CheckpointSet, CheckpointStore, CHECKPOINT_DIR};
