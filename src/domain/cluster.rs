//! Cluster-level work items and their shared analysis context

use crate::domain::ids::ClusterId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Functional annotation text per gene symbol
pub type GeneAnnotations = BTreeMap<String, String>;

/// One cluster to analyze
///
/// Produced by the reshape step, one per distinct cluster label in the input
/// table. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRow {
    /// Cluster identifier, the single source of truth for filing results
    pub cluster_id: ClusterId,

    /// Member gene symbols in input order, without duplicates
    pub genes: Vec<String>,
}

impl ClusterRow {
    /// Create a new cluster row
    pub fn new(cluster_id: ClusterId, genes: Vec<String>) -> Self {
        Self { cluster_id, genes }
    }

    /// Number of member genes
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }
}

/// Side context shared by every analyzer call in a run
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    /// Per-gene functional annotation text
    pub gene_annotations: GeneAnnotations,

    /// Free-text description of the screen the clusters come from
    pub screen_context: String,
}

impl AnalysisContext {
    /// Create a new analysis context
    pub fn new(gene_annotations: GeneAnnotations, screen_context: impl Into<String>) -> Self {
        Self {
            gene_annotations,
            screen_context: screen_context.into(),
        }
    }

    /// Annotations for the members of one cluster, in the cluster's gene order
    pub fn annotations_for<'a>(&'a self, row: &'a ClusterRow) -> Vec<(&'a str, &'a str)> {
        row.genes
            .iter()
            .filter_map(|gene| {
                self.gene_annotations
                    .get(gene)
                    .map(|text| (gene.as_str(), text.as_str()))
            })
            .collect()
    }
}
