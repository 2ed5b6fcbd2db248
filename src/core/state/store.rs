//! File-backed checkpoint store
//!
//! One pretty-printed JSON document per cluster under `<output_dir>/clusters/`.
//! The directory is the ground truth for which clusters are complete.

use crate::domain::{ClusterAnnotation, ClusterId, PhenoscribeError, Result};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Completed clusters keyed by the string form of their id
pub type CheckpointSet = BTreeMap<String, ClusterAnnotation>;

/// Name of the checkpoint subdirectory inside the output directory
pub const CHECKPOINT_DIR: &str = "clusters";

/// Per-cluster checkpoint store
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Create a store rooted at `<output_dir>/clusters`
    ///
    /// Nothing is created on disk until the first save.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: output_dir.as_ref().join(CHECKPOINT_DIR),
        }
    }

    /// Checkpoint directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the checkpoint file for a cluster
    pub fn checkpoint_path(&self, cluster_id: &ClusterId) -> PathBuf {
        self.dir.join(format!("cluster_{}.json", cluster_id.as_str()))
    }

    fn temp_path(&self, cluster_id: &ClusterId) -> PathBuf {
        self.dir
            .join(format!(".cluster_{}.json.tmp", cluster_id.as_str()))
    }

    /// Discover completed clusters
    ///
    /// Every `*.json` file in the directory is parsed as an annotation and
    /// keyed by the `cluster_id` inside it. Unreadable or malformed files are
    /// skipped with a warning. A missing directory yields an empty set.
    pub fn load_completed(&self) -> Result<CheckpointSet> {
        let mut completed = CheckpointSet::new();

        if !self.dir.exists() {
            tracing::debug!(dir = %self.dir.display(), "No checkpoint directory yet");
            return Ok(completed);
        }

        for path in self.checkpoint_files()? {
            let Some(annotation) = read_checkpoint(&path) else {
                continue;
            };

            let key = annotation.cluster_id.as_str().to_string();
            if completed.contains_key(&key) {
                tracing::warn!(
                    cluster_id = %key,
                    path = %path.display(),
                    "Duplicate checkpoint for cluster, keeping the later file"
                );
            }
            completed.insert(key, annotation);
        }

        tracing::debug!(
            dir = %self.dir.display(),
            completed = completed.len(),
            "Loaded checkpoints"
        );

        Ok(completed)
    }

    /// Persist one cluster's annotation
    ///
    /// The document is written to a temporary file and renamed into place,
    /// so the final path either holds the previous content or the complete
    /// new document. Existing content for the id is replaced.
    ///
    /// # Errors
    ///
    /// Returns `PhenoscribeError::Io` if the directory cannot be created or
    /// the file cannot be written.
    pub fn save(&self, cluster_id: &ClusterId, annotation: &ClusterAnnotation) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            PhenoscribeError::Io(format!(
                "Failed to create checkpoint directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let bytes = serde_json::to_vec_pretty(annotation)?;

        let temp_path = self.temp_path(cluster_id);
        let final_path = self.checkpoint_path(cluster_id);

        fs::write(&temp_path, bytes).map_err(|e| {
            PhenoscribeError::Io(format!(
                "Failed to write checkpoint {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            PhenoscribeError::Io(format!(
                "Failed to move checkpoint into place at {}: {}",
                final_path.display(),
                e
            ))
        })?;

        Ok(final_path)
    }

    /// Modification time of the most recently written checkpoint
    pub fn last_saved(&self) -> Option<DateTime<Local>> {
        self.checkpoint_files()
            .ok()?
            .iter()
            .filter_map(|path| fs::metadata(path).and_then(|m| m.modified()).ok())
            .max()
            .map(DateTime::<Local>::from)
    }

    /// All `*.json` files in the directory, sorted by name
    fn checkpoint_files(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            PhenoscribeError::Checkpoint(format!(
                "Failed to list checkpoint directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        Ok(files)
    }
}

fn read_checkpoint(path: &Path) -> Option<ClusterAnnotation> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable checkpoint");
            return None;
        }
    };

    match serde_json::from_str::<ClusterAnnotation>(&contents) {
        Ok(annotation) => Some(annotation),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping invalid checkpoint");
            None
        }
    }
}
