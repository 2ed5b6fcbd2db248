//! Sequential, resumable batch runner
//!
//! Each cluster goes `Pending -> Skipped` when a checkpoint already exists,
//! or `Pending -> Analyzing -> Saved | Failed`. Results are persisted as soon
//! as they arrive, so an interrupted run loses at most the in-flight cluster.

use super::summary::{RunError, RunErrorKind, RunSummary};
use crate::adapters::llm::ClusterAnalyzer;
use crate::core::state::{CheckpointSet, CheckpointStore};
use crate::domain::{AnalysisContext, ClusterRow, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Outcome of processing one cluster
#[derive(Debug)]
pub enum ItemOutcome {
    /// A checkpoint existed; the analyzer was not called
    Skipped,
    /// Analyzed and written to the given path
    Saved(PathBuf),
    /// Analysis or persistence failed
    Failed(RunError),
}

/// Runs the analyzer over clusters, skipping completed ones
pub struct BatchRunner {
    analyzer: Arc<dyn ClusterAnalyzer>,
    store: CheckpointStore,
    shutdown_signal: watch::Receiver<bool>,
}

impl BatchRunner {
    /// Create a new runner
    ///
    /// # Arguments
    ///
    /// * `analyzer` - Analyzer backend
    /// * `store` - Checkpoint store for the output directory
    /// * `shutdown_signal` - Flipped to `true` to stop after the current cluster
    pub fn new(
        analyzer: Arc<dyn ClusterAnalyzer>,
        store: CheckpointStore,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            analyzer,
            store,
            shutdown_signal,
        }
    }

    /// Checkpoint store used by this runner
    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Process every cluster in order
    ///
    /// Per-cluster failures are recorded in the summary and do not stop the
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns an error only if the checkpoint directory cannot be listed.
    pub async fn run(&self, items: &[ClusterRow], context: &AnalysisContext) -> Result<RunSummary> {
        let start_time = Instant::now();
        let mut summary = RunSummary::new(items.len());
        let mut completed = self.store.load_completed()?;

        if !completed.is_empty() {
            tracing::info!(
                completed = completed.len(),
                "Found previously completed clusters"
            );
        }

        tracing::info!(
            clusters = items.len(),
            model = %self.analyzer.model(),
            "Starting cluster analysis"
        );

        for (index, row) in items.iter().enumerate() {
            if *self.shutdown_signal.borrow() {
                summary.interrupted = true;
                summary.pending = items.len() - index;
                tracing::warn!(
                    pending = summary.pending,
                    "Shutdown requested, stopping before next cluster"
                );
                break;
            }

            crate::log_batch_progress!(index + 1, items.len());

            match self.process_item(row, context, &mut completed).await {
                ItemOutcome::Skipped => summary.skipped += 1,
                ItemOutcome::Saved(_) => summary.analyzed += 1,
                ItemOutcome::Failed(error) => summary.add_error(error),
            }
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();
        Ok(summary)
    }

    /// Process one cluster against the in-memory set of completed clusters
    pub async fn process_item(
        &self,
        row: &ClusterRow,
        context: &AnalysisContext,
        completed: &mut CheckpointSet,
    ) -> ItemOutcome {
        let cluster_id = &row.cluster_id;

        if completed.contains_key(cluster_id.as_str()) {
            crate::log_cluster_skipped!(cluster_id);
            return ItemOutcome::Skipped;
        }

        tracing::debug!(
            cluster_id = %cluster_id,
            genes = row.gene_count(),
            "Analyzing cluster"
        );

        let annotation = match self.analyzer.analyze(row, context).await {
            Ok(annotation) => annotation.with_cluster_id(cluster_id.clone()),
            Err(e) => {
                crate::log_cluster_failed!(cluster_id, e);
                return ItemOutcome::Failed(RunError::new(
                    RunErrorKind::Analysis,
                    cluster_id.clone(),
                    e.to_string(),
                ));
            }
        };

        match self.store.save(cluster_id, &annotation) {
            Ok(path) => {
                crate::log_cluster_saved!(cluster_id, path.display());
                completed.insert(cluster_id.as_str().to_string(), annotation);
                ItemOutcome::Saved(path)
            }
            Err(e) => {
                crate::log_cluster_failed!(cluster_id, e);
                ItemOutcome::Failed(RunError::new(
                    RunErrorKind::Persistence,
                    cluster_id.clone(),
                    e.to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalyzerError, ClusterAnnotation, ClusterId};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct EchoAnalyzer {
        calls: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    impl EchoAnalyzer {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl ClusterAnalyzer for EchoAnalyzer {
        async fn analyze(
            &self,
            row: &ClusterRow,
            _context: &AnalysisContext,
        ) -> Result<ClusterAnnotation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(row.cluster_id.as_str()) {
                return Err(AnalyzerError::ServerError {
                    status: 500,
                    message: "boom".to_string(),
                }
                .into());
            }
            let mut annotation = ClusterAnnotation::new(ClusterId::new("wrong").unwrap());
            annotation.established_genes = row.genes.iter().map(|g| g.as_str().into()).collect();
            Ok(annotation)
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    fn rows(ids: &[&str]) -> Vec<ClusterRow> {
        ids.iter()
            .map(|id| ClusterRow::new(ClusterId::new(*id).unwrap(), vec![format!("G{id}")]))
            .collect()
    }

    #[tokio::test]
    async fn test_run_saves_every_cluster_with_caller_id() {
        let temp = TempDir::new().unwrap();
        let analyzer = Arc::new(EchoAnalyzer::new(None));
        let (_tx, rx) = watch::channel(false);
        let runner = BatchRunner::new(analyzer.clone(), CheckpointStore::new(temp.path()), rx);

        let summary = runner
            .run(&rows(&["1", "2"]), &AnalysisContext::default())
            .await
            .unwrap();

        assert_eq!(summary.analyzed, 2);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
        let completed = runner.store().load_completed().unwrap();
        assert_eq!(completed["1"].cluster_id.as_str(), "1");
        assert!(!completed.contains_key("wrong"));
    }

    #[tokio::test]
    async fn test_run_continues_after_failure() {
        let temp = TempDir::new().unwrap();
        let analyzer = Arc::new(EchoAnalyzer::new(Some("1")));
        let (_tx, rx) = watch::channel(false);
        let runner = BatchRunner::new(analyzer, CheckpointStore::new(temp.path()), rx);

        let summary = runner
            .run(&rows(&["1", "2"]), &AnalysisContext::default())
            .await
            .unwrap();

        assert_eq!(summary.analyzed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors[0].kind, RunErrorKind::Analysis);
        assert_eq!(summary.errors[0].cluster_id.as_str(), "1");
    }

    #[tokio::test]
    async fn test_run_stops_when_shutdown_already_requested() {
        let temp = TempDir::new().unwrap();
        let analyzer = Arc::new(EchoAnalyzer::new(None));
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();
        let runner = BatchRunner::new(analyzer.clone(), CheckpointStore::new(temp.path()), rx);

        let summary = runner
            .run(&rows(&["1", "2", "3"]), &AnalysisContext::default())
            .await
            .unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.pending, 3);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_recorded() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("out");
        std::fs::write(&blocker, "not a directory").unwrap();

        let analyzer = Arc::new(EchoAnalyzer::new(None));
        let (_tx, rx) = watch::channel(false);
        let runner = BatchRunner::new(analyzer, CheckpointStore::new(&blocker), rx);

        let summary = runner
            .run(&rows(&["1"]), &AnalysisContext::default())
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors[0].kind, RunErrorKind::Persistence);
    }
}
