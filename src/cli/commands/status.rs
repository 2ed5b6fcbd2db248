//! Status command implementation
//!
//! Compares the clusters in the input table with the checkpoints on disk.

use super::{effective_config, ConfigOverrides};
use crate::core::input::{ColumnNames, GeneTable, GroupByCluster, Reshaper};
use crate::core::state::CheckpointStore;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// List every pending cluster instead of the first few
    #[arg(long)]
    pub all: bool,
}

const PENDING_PREVIEW: usize = 20;

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!("Checking analysis status");

        let config = match effective_config(config_path, &self.overrides) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let store = CheckpointStore::new(&config.output.dir);
        let completed = match store.load_completed() {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to read checkpoints");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        println!("📊 Analysis Status");
        println!();
        println!("  Checkpoints: {}", store.dir().display());
        println!("  Completed clusters: {}", completed.len());
        if let Some(saved_at) = store.last_saved() {
            println!("  Last saved: {}", saved_at.format("%Y-%m-%d %H:%M:%S"));
        }

        let columns = ColumnNames::from(&config.input);
        let clusters = match GeneTable::from_tsv(&config.input.file, &columns)
            .and_then(|table| GroupByCluster.reshape(&table, &columns))
        {
            Ok(reshaped) => reshaped.clusters,
            Err(e) => {
                println!();
                println!("⚠️  Could not load input table, pending clusters unknown");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let pending: Vec<_> = clusters
            .iter()
            .filter(|row| !completed.contains_key(row.cluster_id.as_str()))
            .map(|row| row.cluster_id.as_str())
            .collect();

        println!("  Clusters in input: {}", clusters.len());
        println!("  Pending clusters: {}", pending.len());

        if !pending.is_empty() {
            let shown = if self.all {
                pending.len()
            } else {
                pending.len().min(PENDING_PREVIEW)
            };
            println!();
            println!("  Pending: {}", pending[..shown].join(", "));
            if shown < pending.len() {
                println!("  ... and {} more (use --all)", pending.len() - shown);
            }
        } else {
            println!();
            println!("✅ All clusters analyzed");
        }

        Ok(0)
    }
}
