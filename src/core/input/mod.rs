//! Input loading and reshaping
//!
//! The input is a gene-level TSV (one row per gene). It is reshaped into one
//! [`ClusterRow`](crate::domain::ClusterRow) per cluster plus a gene →
//! annotation map shared by every analyzer call.

pub mod reshape;
pub mod table;

pub use reshape::{GroupByCluster, ReshapedClusters, Reshaper};
pub use table::{ColumnNames, GeneTable};
