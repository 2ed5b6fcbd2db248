//! Logging and observability
//!
//! Structured logging through `tracing`, plus a handful of macros that keep
//! per-cluster events consistent across the runner and the CLI.
//!
//! # Example
//!
//! ```no_run
//! use phenoscribe::logging::init_logging;
//! use phenoscribe::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a cluster whose checkpoint was just written
///
/// # Example
///
/// ```no_run
/// use phenoscribe::log_cluster_saved;
/// use phenoscribe::domain::ClusterId;
///
/// let id = ClusterId::new("7").unwrap();
/// log_cluster_saved!(&id, "out/clusters/cluster_7.json");
/// ```
#[macro_export]
macro_rules! log_cluster_saved {
    ($cluster_id:expr, $path:expr) => {
        tracing::info!(
            cluster_id = %$cluster_id,
            path = %$path,
            "Saved cluster checkpoint"
        );
    };
}

/// Log a cluster skipped because a checkpoint already exists
#[macro_export]
macro_rules! log_cluster_skipped {
    ($cluster_id:expr) => {
        tracing::info!(
            cluster_id = %$cluster_id,
            "Skipping cluster (already completed)"
        );
    };
}

/// Log a cluster whose analysis or persistence failed
///
/// # Example
///
/// ```no_run
/// use phenoscribe::log_cluster_failed;
///
/// log_cluster_failed!("12", "analyzer returned HTTP 500");
/// ```
#[macro_export]
macro_rules! log_cluster_failed {
    ($cluster_id:expr, $error:expr) => {
        tracing::error!(
            cluster_id = %$cluster_id,
            error = %$error,
            "Cluster failed"
        );
    };
}

/// Log batch progress
#[macro_export]
macro_rules! log_batch_progress {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = (($current) as f64 / (($total) as f64).max(1.0) * 100.0),
            "Processing cluster"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use phenoscribe::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying analyzer request"
        );
    };
}
