//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Phenoscribe using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::Path;

/// Configuration file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "phenoscribe.toml";

/// Phenoscribe - resumable LLM annotation of gene clusters
#[derive(Parser, Debug)]
#[command(name = "phenoscribe")]
#[command(version, about, long_about = None)]
#[command(author = "Phenoscribe Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults to ./phenoscribe.toml when present)
    #[arg(short, long, env = "PHENOSCRIBE_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PHENOSCRIBE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration file to load, if any
    pub fn config_path(&self) -> Option<String> {
        self.config.clone().or_else(|| {
            Path::new(DEFAULT_CONFIG_FILE)
                .exists()
                .then(|| DEFAULT_CONFIG_FILE.to_string())
        })
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze all clusters, skipping completed ones, then combine results
    Analyze(commands::analyze::AnalyzeArgs),

    /// Rebuild the combined JSON and summary TSV from checkpoints
    Combine(commands::combine::CombineArgs),

    /// Show completed and pending clusters
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
