//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use phenoscribe::adapters::llm::ClusterAnalyzer;
use phenoscribe::config::PhenoscribeConfig;
use phenoscribe::domain::{
    AnalysisContext, AnalyzerError, ClusterAnnotation, ClusterId, ClusterRow, Result,
};
use serde_json::json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::watch;

/// Analyzer double that records calls and answers deterministically
pub struct StubAnalyzer {
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    fail_ids: HashSet<String>,
    echo_id: Option<String>,
    shutdown_after: Option<(usize, watch::Sender<bool>)>,
}

impl StubAnalyzer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            fail_ids: HashSet::new(),
            echo_id: None,
            shutdown_after: None,
        }
    }

    /// Fail with a server error for these cluster ids
    pub fn failing_on(mut self, ids: &[&str]) -> Self {
        self.fail_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Report this cluster id in every response instead of the requested one
    pub fn echoing(mut self, id: &str) -> Self {
        self.echo_id = Some(id.to_string());
        self
    }

    /// Request shutdown once `calls` analyses have completed
    pub fn shutting_down_after(mut self, calls: usize, tx: watch::Sender<bool>) -> Self {
        self.shutdown_after = Some((calls, tx));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClusterAnalyzer for StubAnalyzer {
    async fn analyze(
        &self,
        row: &ClusterRow,
        context: &AnalysisContext,
    ) -> Result<ClusterAnnotation> {
        let count = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.seen
            .lock()
            .unwrap()
            .push(row.cluster_id.as_str().to_string());

        if let Some((after, tx)) = &self.shutdown_after {
            if count >= *after {
                let _ = tx.send(true);
            }
        }

        if self.fail_ids.contains(row.cluster_id.as_str()) {
            return Err(AnalyzerError::ServerError {
                status: 500,
                message: format!("stub failure for cluster {}", row.cluster_id),
            }
            .into());
        }

        let reported = self
            .echo_id
            .clone()
            .unwrap_or_else(|| row.cluster_id.as_str().to_string());

        let (first, rest) = row.genes.split_first().map_or((None, &[][..]), |(f, r)| (Some(f), r));
        let doc = json!({
            "cluster_id": reported,
            "dominant_process": format!("Process of cluster {}", row.cluster_id),
            "pathway_confidence": "Medium",
            "summary": format!("{} genes, {} annotated", row.gene_count(), context.annotations_for(row).len()),
            "established_genes": first.into_iter().collect::<Vec<_>>(),
            "novel_role_genes": rest.iter().map(|g| json!({"gene": g, "rationale": "stub"})).collect::<Vec<_>>(),
            "model_notes": "stub analyzer"
        });

        Ok(serde_json::from_value(doc)?)
    }

    fn model(&self) -> &str {
        "stub/model"
    }
}

pub fn cluster(id: &str, genes: &[&str]) -> ClusterRow {
    ClusterRow::new(
        ClusterId::new(id).unwrap(),
        genes.iter().map(|g| g.to_string()).collect(),
    )
}

/// Write a gene table into `dir` and return its path
pub fn write_gene_table(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("clustering.tsv");
    std::fs::write(&path, contents).unwrap();
    path
}

/// Configuration pointing at test input and output locations
pub fn test_config(input: &Path, output: &Path) -> PhenoscribeConfig {
    let mut config = PhenoscribeConfig::default();
    config.analysis.model = "stub/model".to_string();
    config.input.file = input.to_string_lossy().to_string();
    config.output.dir = output.to_string_lossy().to_string();
    config
}

/// Sorted file names inside a directory
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
