//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting batch results.

use crate::domain::ClusterId;
use std::time::Duration;

/// Summary of a batch run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of work items handed to the runner
    pub total: usize,

    /// Number of clusters analyzed and saved in this run
    pub analyzed: usize,

    /// Number of clusters skipped because a checkpoint already existed
    pub skipped: usize,

    /// Number of clusters that failed
    pub failed: usize,

    /// Number of clusters not attempted because the run was interrupted
    pub pending: usize,

    /// Whether a shutdown signal stopped the run early
    pub interrupted: bool,

    /// Duration of the run
    pub duration: Duration,

    /// Errors encountered, one per failed cluster
    pub errors: Vec<RunError>,
}

impl RunSummary {
    /// Create a new empty summary for `total` items
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a failure
    pub fn add_error(&mut self, error: RunError) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// Clusters complete after this run (saved now or earlier)
    pub fn completed(&self) -> usize {
        self.analyzed + self.skipped
    }

    /// True when every item is complete and nothing failed
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && !self.interrupted
    }

    /// Percentage of attempted clusters that succeeded
    pub fn success_rate(&self) -> f64 {
        let attempted = self.analyzed + self.failed;
        if attempted == 0 {
            return 100.0;
        }
        (self.analyzed as f64 / attempted as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        if self.skipped > 0 {
            tracing::info!(
                skipped = self.skipped,
                "Skipped previously completed clusters"
            );
        }

        tracing::info!(
            total = self.total,
            analyzed = self.analyzed,
            skipped = self.skipped,
            failed = self.failed,
            pending = self.pending,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Batch completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Batch completed with errors; failed clusters will be retried on the next run"
            );
            for error in &self.errors {
                tracing::warn!(
                    cluster_id = %error.cluster_id,
                    kind = ?error.kind,
                    message = %error.message,
                    "Cluster error"
                );
            }
        }
    }
}

/// Stage at which a cluster failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunErrorKind {
    /// The analyzer call failed or returned an unusable response
    Analysis,
    /// The checkpoint could not be written
    Persistence,
}

/// Failure of one cluster
#[derive(Debug, Clone)]
pub struct RunError {
    /// Failing stage
    pub kind: RunErrorKind,

    /// Cluster that failed
    pub cluster_id: ClusterId,

    /// Error message
    pub message: String,
}

impl RunError {
    /// Create a new run error
    pub fn new(kind: RunErrorKind, cluster_id: ClusterId, message: impl Into<String>) -> Self {
        Self {
            kind,
            cluster_id,
            message: message.into(),
        }
    }
}
