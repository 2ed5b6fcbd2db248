//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::config::schema::{DEFAULT_INPUT_FILE, DEFAULT_MODEL, DEFAULT_OUTPUT_DIR};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "phenoscribe.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            generate_config_with_examples()
        } else {
            generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your input and output paths", self.output);
                println!("  2. Set ANTHROPIC_API_KEY in your environment or a .env file");
                println!("  3. Validate configuration: phenoscribe validate-config");
                println!("  4. Run the analysis: phenoscribe analyze");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }
}

/// Minimal configuration
pub fn generate_minimal_config() -> String {
    format!(
        r#"# Phenoscribe Configuration File

[analysis]
model = "{DEFAULT_MODEL}"
temperature = 0.0
# API key is read from ANTHROPIC_API_KEY when not set here
# api_key = "${{ANTHROPIC_API_KEY}}"

[input]
file = "{DEFAULT_INPUT_FILE}"

[output]
dir = "{DEFAULT_OUTPUT_DIR}"
"#
    )
}

/// Configuration with every option and comments
pub fn generate_config_with_examples() -> String {
    format!(
        r#"# Phenoscribe Configuration File
#
# Every setting is optional. Environment variables of the form
# PHENOSCRIBE_<SECTION>_<KEY> override values from this file, and
# ${{VAR}} placeholders are replaced from the environment.

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[analysis]
# Model identifier; "/" is replaced by "_" in output file names
model = "{DEFAULT_MODEL}"

# Sampling temperature (0.0 - 1.0)
temperature = 0.0

# Maximum tokens in each response
max_tokens = 4096

# Messages API endpoint
base_url = "https://api.anthropic.com"
api_version = "2023-06-01"

# API key; falls back to ANTHROPIC_API_KEY when omitted
# api_key = "${{ANTHROPIC_API_KEY}}"

# Request timeout in seconds
timeout_seconds = 120

# Free-text description of the screen sent with every cluster
# screen_context = """..."""

[analysis.retry]
max_attempts = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

[input]
# Gene-level clustering table (tab-separated)
file = "{DEFAULT_INPUT_FILE}"
gene_column = "gene_symbol"
# Used when gene_column is absent from the table
alternate_gene_column = "gene_symbol_0"
cluster_column = "cluster"
annotation_column = "uniprot_function"

[output]
# Checkpoints go to <dir>/clusters/cluster_<id>.json
dir = "{DEFAULT_OUTPUT_DIR}"
resume = true

[logging]
local_enabled = false
local_path = "logs"
# daily, hourly or never
local_rotation = "daily"
"#
    )
}
