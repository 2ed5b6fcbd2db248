//! Language-model analyzer adapters
//!
//! The batch runner only sees the [`ClusterAnalyzer`] trait. The HTTP
//! implementation talks to a Messages-style API; tests substitute stubs.

pub mod client;
pub mod models;
pub mod prompt;

use crate::domain::{AnalysisContext, ClusterAnnotation, ClusterRow, Result};
use async_trait::async_trait;

pub use client::MessagesClient;

/// Produces a structured annotation for one cluster
#[async_trait]
pub trait ClusterAnalyzer: Send + Sync {
    /// Analyze one cluster
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or its response
    /// cannot be turned into an annotation.
    async fn analyze(
        &self,
        row: &ClusterRow,
        context: &AnalysisContext,
    ) -> Result<ClusterAnnotation>;

    /// Model identifier used for this analyzer
    fn model(&self) -> &str;
}
