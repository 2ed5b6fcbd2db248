//! Per-cluster annotation documents
//!
//! A `ClusterAnnotation` is what the analyzer returns and what the checkpoint
//! store persists. Only the fields needed for aggregation are typed; anything
//! else the analyzer produced is carried verbatim in `extra`.

use crate::domain::ids::ClusterId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Structured annotation of one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAnnotation {
    /// Cluster identifier
    ///
    /// The value echoed by the analyzer is untrusted; callers overwrite it
    /// with [`ClusterAnnotation::with_cluster_id`] before persisting.
    pub cluster_id: ClusterId,

    /// Dominant biological process label
    #[serde(default)]
    pub dominant_process: Option<String>,

    /// Confidence in the assigned process (e.g. "High", "Medium", "Low")
    #[serde(default, deserialize_with = "string_or_number")]
    pub pathway_confidence: Option<String>,

    /// Free-text summary
    #[serde(default)]
    pub summary: Option<String>,

    /// Genes with an established role in the dominant process
    #[serde(default, deserialize_with = "null_as_empty")]
    pub established_genes: Vec<Value>,

    /// Characterized genes with a plausible novel role in the process
    #[serde(default, deserialize_with = "null_as_empty")]
    pub novel_role_genes: Vec<Value>,

    /// Poorly characterized genes
    #[serde(default, deserialize_with = "null_as_empty")]
    pub uncharacterized_genes: Vec<Value>,

    /// Any other fields, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClusterAnnotation {
    /// Create an empty annotation for a cluster
    pub fn new(cluster_id: ClusterId) -> Self {
        Self {
            cluster_id,
            dominant_process: None,
            pathway_confidence: None,
            summary: None,
            established_genes: Vec::new(),
            novel_role_genes: Vec::new(),
            uncharacterized_genes: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Replace the self-reported cluster id with the caller's id
    pub fn with_cluster_id(mut self, cluster_id: ClusterId) -> Self {
        self.cluster_id = cluster_id;
        self
    }

    /// Number of established genes
    pub fn num_established(&self) -> usize {
        self.established_genes.len()
    }

    /// Number of genes with a novel role
    pub fn num_novel(&self) -> usize {
        self.novel_role_genes.len()
    }

    /// Number of uncharacterized genes
    pub fn num_uncharacterized(&self) -> usize {
        self.uncharacterized_genes.len()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number for pathway_confidence, got {other}"
        ))),
    }
}
