//! Combine command implementation
//!
//! Rebuilds the aggregate outputs from existing checkpoints without calling
//! the analyzer.

use super::{effective_config, ConfigOverrides};
use crate::core::report::{combine, write_outputs};
use clap::Args;

/// Arguments for the combine command
#[derive(Args, Debug)]
pub struct CombineArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

impl CombineArgs {
    /// Execute the combine command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let config = match effective_config(config_path, &self.overrides) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        tracing::info!(
            output_dir = %config.output.dir,
            model = %config.analysis.model,
            "Combining cluster results"
        );

        let (report, table) = combine(&config.output.dir, &config.analysis.model)?;
        let paths = write_outputs(&config.output.dir, &report, &table)?;

        println!("✅ Combined {} clusters", report.clusters.len());
        println!("  - Combined JSON: {}", paths.json.display());
        println!("  - Summaries TSV: {}", paths.tsv.display());

        Ok(0)
    }
}
