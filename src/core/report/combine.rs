//! Combined JSON report and flattened TSV summary
//!
//! Both outputs are rebuilt from the checkpoint directory on every call and
//! never read back, so aggregation is idempotent and leaves the checkpoints
//! untouched.

use crate::config::schema::model_file_stem;
use crate::core::state::CheckpointStore;
use crate::domain::{ClusterAnnotation, PhenoscribeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Column order of the summary TSV
pub const SUMMARY_COLUMNS: [&str; 7] = [
    "cluster_id",
    "dominant_process",
    "pathway_confidence",
    "summary",
    "num_established",
    "num_novel",
    "num_uncharacterized",
];

/// All cluster annotations of one model, in report order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedReport {
    pub clusters: Vec<ClusterAnnotation>,
    pub model: String,
}

/// One line of the summary table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub cluster_id: String,
    pub dominant_process: Option<String>,
    pub pathway_confidence: Option<String>,
    pub summary: Option<String>,
    pub num_established: usize,
    pub num_novel: usize,
    pub num_uncharacterized: usize,
}

impl From<&ClusterAnnotation> for SummaryRow {
    fn from(annotation: &ClusterAnnotation) -> Self {
        Self {
            cluster_id: annotation.cluster_id.as_str().to_string(),
            dominant_process: annotation.dominant_process.clone(),
            pathway_confidence: annotation.pathway_confidence.clone(),
            summary: annotation.summary.clone(),
            num_established: annotation.num_established(),
            num_novel: annotation.num_novel(),
            num_uncharacterized: annotation.num_uncharacterized(),
        }
    }
}

/// Flattened per-cluster summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Build from annotations, preserving their order
    pub fn from_annotations(annotations: &[ClusterAnnotation]) -> Self {
        Self {
            rows: annotations.iter().map(SummaryRow::from).collect(),
        }
    }

    /// Render as tab-separated text with a header line
    pub fn to_tsv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(SUMMARY_COLUMNS).map_err(tsv_error)?;
        for row in &self.rows {
            writer.serialize(row).map_err(tsv_error)?;
        }

        writer
            .into_inner()
            .map_err(|e| PhenoscribeError::Report(format!("Failed to finish summary table: {e}")))
    }
}

/// Locations of the aggregate outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub tsv: PathBuf,
}

/// Output paths for a model: `<dir>/<model>_results.json` and
/// `<dir>/<model>_results_summaries.tsv`
pub fn output_paths(output_dir: impl AsRef<Path>, model: &str) -> ReportPaths {
    let base = format!("{}_results", model_file_stem(model));
    let dir = output_dir.as_ref();
    ReportPaths {
        json: dir.join(format!("{base}.json")),
        tsv: dir.join(format!("{base}_summaries.tsv")),
    }
}

/// Load every checkpoint and build both aggregates
///
/// Clusters are ordered by the `cluster_id` inside each document: numeric
/// ids ascending, then non-numeric ids lexically. Invalid checkpoint files
/// are skipped.
pub fn combine(output_dir: impl AsRef<Path>, model: &str) -> Result<(CombinedReport, SummaryTable)> {
    let store = CheckpointStore::new(output_dir);
    let completed = store.load_completed()?;

    let mut clusters: Vec<ClusterAnnotation> = completed.into_values().collect();
    clusters.sort_by(|a, b| a.cluster_id.report_cmp(&b.cluster_id));

    if clusters.is_empty() {
        tracing::warn!(dir = %store.dir().display(), "No cluster checkpoints to combine");
    }

    let table = SummaryTable::from_annotations(&clusters);
    let report = CombinedReport {
        clusters,
        model: model.to_string(),
    };

    Ok((report, table))
}

/// Write both aggregates into the output directory
///
/// # Errors
///
/// Returns an error if the directory or either file cannot be written.
pub fn write_outputs(
    output_dir: impl AsRef<Path>,
    report: &CombinedReport,
    table: &SummaryTable,
) -> Result<ReportPaths> {
    let output_dir = output_dir.as_ref();
    let paths = output_paths(output_dir, &report.model);

    fs::create_dir_all(output_dir).map_err(|e| {
        PhenoscribeError::Report(format!(
            "Failed to create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    let json = serde_json::to_vec_pretty(report)?;
    write_file(&paths.json, &json)?;
    write_file(&paths.tsv, &table.to_tsv()?)?;

    tracing::info!(
        clusters = report.clusters.len(),
        json = %paths.json.display(),
        tsv = %paths.tsv.display(),
        "Wrote combined results"
    );

    Ok(paths)
}

fn tsv_error(e: csv::Error) -> PhenoscribeError {
    PhenoscribeError::Report(format!("Failed to write summary table: {e}"))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|e| {
        PhenoscribeError::Report(format!("Failed to write {}: {}", path.display(), e))
    })
}
