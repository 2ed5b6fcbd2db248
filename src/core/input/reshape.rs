//! Reshaping gene-level rows into cluster-level work items

use super::table::{ColumnNames, GeneTable};
use crate::domain::{ClusterId, ClusterRow, GeneAnnotations, PhenoscribeError, Result};
use std::collections::{HashMap, HashSet};

/// Output of a reshape step
#[derive(Debug, Clone, Default)]
pub struct ReshapedClusters {
    /// One row per cluster, in processing order
    pub clusters: Vec<ClusterRow>,

    /// Functional annotation per gene symbol
    pub gene_annotations: GeneAnnotations,
}

/// Turns a gene table into cluster work items
pub trait Reshaper {
    /// Reshape the table
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing or a cluster label
    /// is not a valid identifier.
    fn reshape(&self, table: &GeneTable, columns: &ColumnNames) -> Result<ReshapedClusters>;
}

/// Groups genes by cluster label
///
/// Clusters appear in order of first appearance in the table. Genes are kept
/// in input order without duplicates. Each gene maps to its first non-empty
/// annotation. Rows with an empty gene or cluster cell are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupByCluster;

impl Reshaper for GroupByCluster {
    fn reshape(&self, table: &GeneTable, columns: &ColumnNames) -> Result<ReshapedClusters> {
        let gene_idx = column(table, &columns.gene)?;
        let cluster_idx = column(table, &columns.cluster)?;
        let annotation_idx = columns
            .annotation
            .as_deref()
            .and_then(|name| table.column_index(name));

        let mut order: Vec<ClusterId> = Vec::new();
        let mut members: HashMap<ClusterId, (Vec<String>, HashSet<String>)> = HashMap::new();
        let mut gene_annotations = GeneAnnotations::new();
        let mut dropped = 0usize;

        for row in 0..table.len() {
            let gene = table.cell(row, gene_idx);
            let label = table.cell(row, cluster_idx);
            if gene.is_empty() || label.is_empty() {
                dropped += 1;
                continue;
            }

            let cluster_id = ClusterId::new(label).map_err(|e| {
                PhenoscribeError::Input(format!("Row {}: invalid cluster label: {}", row + 2, e))
            })?;

            let (genes, seen) = members.entry(cluster_id.clone()).or_insert_with(|| {
                order.push(cluster_id.clone());
                (Vec::new(), HashSet::new())
            });
            if seen.insert(gene.to_string()) {
                genes.push(gene.to_string());
            }

            if let Some(idx) = annotation_idx {
                let text = table.cell(row, idx);
                if !text.is_empty() {
                    gene_annotations
                        .entry(gene.to_string())
                        .or_insert_with(|| text.to_string());
                }
            }
        }

        if dropped > 0 {
            tracing::warn!(dropped, "Dropped rows with an empty gene or cluster value");
        }

        let clusters = order
            .into_iter()
            .map(|id| {
                let genes = members.remove(&id).map(|(genes, _)| genes).unwrap_or_default();
                ClusterRow::new(id, genes)
            })
            .collect::<Vec<_>>();

        tracing::info!(
            clusters = clusters.len(),
            annotated_genes = gene_annotations.len(),
            "Reshaped gene table to clusters"
        );

        Ok(ReshapedClusters {
            clusters,
            gene_annotations,
        })
    }
}

fn column(table: &GeneTable, name: &str) -> Result<usize> {
    table.column_index(name).ok_or_else(|| {
        PhenoscribeError::Input(format!("Required column '{}' not found", name))
    })
}
