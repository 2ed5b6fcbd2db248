//! Analyze command implementation
//!
//! Loads the gene table, reshapes it into clusters, analyzes every cluster
//! without a checkpoint and finally rebuilds the combined outputs.

use super::{effective_config, ConfigOverrides};
use crate::adapters::llm::{ClusterAnalyzer, MessagesClient};
use crate::config::PhenoscribeConfig;
use crate::core::analysis::{BatchRunner, RunSummary};
use crate::core::input::{ColumnNames, GeneTable, GroupByCluster, Reshaper};
use crate::core::report::{combine, write_outputs, ReportPaths};
use crate::core::state::CheckpointStore;
use crate::domain::{AnalysisContext, ClusterRow, PhenoscribeError, Result};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Resume from a previous run (completed clusters are always skipped)
    #[arg(long)]
    pub resume: bool,
}

/// Result of a full analysis pipeline
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Batch summary
    pub summary: RunSummary,

    /// Aggregate output files
    pub paths: ReportPaths,
}

/// Clusters and shared context read from the configured input table
#[derive(Debug)]
pub struct PreparedInput {
    pub clusters: Vec<ClusterRow>,
    pub context: AnalysisContext,
}

/// Load the gene table and reshape it into cluster work items
///
/// # Errors
///
/// Returns `PhenoscribeError::Input` if the table is missing, unreadable or
/// lacks a required column.
pub fn load_input(config: &PhenoscribeConfig) -> Result<PreparedInput> {
    let columns = ColumnNames::from(&config.input);

    tracing::info!(input = %config.input.file, "Loading clustering data");
    let table = GeneTable::from_tsv(&config.input.file, &columns)?;
    tracing::info!(rows = table.len(), "Loaded gene table");

    let reshaped = GroupByCluster.reshape(&table, &columns)?;
    let context = AnalysisContext::new(reshaped.gene_annotations, &config.analysis.screen_context);

    Ok(PreparedInput {
        clusters: reshaped.clusters,
        context,
    })
}

/// Analyze prepared clusters and rebuild the combined outputs
pub async fn run_batch(
    config: &PhenoscribeConfig,
    input: &PreparedInput,
    analyzer: Arc<dyn ClusterAnalyzer>,
    shutdown_signal: watch::Receiver<bool>,
) -> Result<PipelineOutcome> {
    std::fs::create_dir_all(&config.output.dir).map_err(|e| {
        PhenoscribeError::Io(format!(
            "Failed to create output directory {}: {}",
            config.output.dir, e
        ))
    })?;

    let runner = BatchRunner::new(
        analyzer,
        CheckpointStore::new(&config.output.dir),
        shutdown_signal,
    );
    let summary = runner.run(&input.clusters, &input.context).await?;

    tracing::info!("Combining results");
    let (report, summary_table) = combine(&config.output.dir, &config.analysis.model)?;
    let paths = write_outputs(&config.output.dir, &report, &summary_table)?;

    Ok(PipelineOutcome { summary, paths })
}

/// Run the whole pipeline with a given analyzer
///
/// Input problems are returned before any cluster is analyzed.
pub async fn run_pipeline(
    config: &PhenoscribeConfig,
    analyzer: Arc<dyn ClusterAnalyzer>,
    shutdown_signal: watch::Receiver<bool>,
) -> Result<PipelineOutcome> {
    let input = load_input(config)?;
    run_batch(config, &input, analyzer, shutdown_signal).await
}

impl AnalyzeArgs {
    /// Execute the analyze command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting analyze command");

        let config = match effective_config(config_path, &self.overrides) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        if !config.output.resume {
            tracing::warn!(
                "output.resume = false has no effect; clusters with a checkpoint are always skipped"
            );
        }
        if self.resume {
            tracing::debug!("Resume requested");
        }

        println!("Phenoscribe Analysis - Model: {}", config.analysis.model);
        println!("Input file: {}", config.input.file);
        println!("Output directory: {}", config.output.dir);
        println!();

        let input = match load_input(&config) {
            Ok(input) => input,
            Err(e) => {
                tracing::error!(error = %e, "Input could not be loaded");
                eprintln!("Input error: {e}");
                return Ok(2);
            }
        };

        let analyzer: Arc<dyn ClusterAnalyzer> = match MessagesClient::new(&config.analysis) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create analyzer client");
                eprintln!("Failed to initialize analyzer: {e}");
                return Ok(4);
            }
        };

        let outcome = match run_batch(&config, &input, analyzer, shutdown_signal).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Analysis failed");
                eprintln!("Analysis failed: {e}");
                return Ok(5);
            }
        };

        let summary = &outcome.summary;
        println!();
        println!("📊 Analysis Summary:");
        println!("  Clusters: {}", summary.total);
        println!("  Analyzed: {}", summary.analyzed);
        println!("  Skipped (already completed): {}", summary.skipped);
        println!("  Failed: {}", summary.failed);
        if summary.pending > 0 {
            println!("  Pending: {}", summary.pending);
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        if !summary.errors.is_empty() {
            println!("⚠️  Errors encountered:");
            for error in &summary.errors {
                println!(
                    "  - cluster {} ({:?}): {}",
                    error.cluster_id, error.kind, error.message
                );
            }
            println!();
        }

        println!(
            "  - Individual results: {}",
            CheckpointStore::new(&config.output.dir).dir().display()
        );
        println!("  - Combined JSON: {}", outcome.paths.json.display());
        println!("  - Summaries TSV: {}", outcome.paths.tsv.display());
        println!();

        Ok(exit_code(summary))
    }
}

/// Process exit code for a finished run
pub fn exit_code(summary: &RunSummary) -> i32 {
    if summary.interrupted {
        println!("⚠️  Analysis interrupted. Completed clusters are saved.");
        println!("   Run the same command to resume.");
        130
    } else if summary.failed > 0 {
        println!("⚠️  Analysis completed with failures; rerun to retry failed clusters");
        1
    } else {
        println!("✅ Analysis complete!");
        0
    }
}
