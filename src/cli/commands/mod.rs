//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod analyze;
pub mod combine;
pub mod init;
pub mod status;
pub mod validate;

use crate::config::{resolve_config, PhenoscribeConfig};
use crate::domain::Result;
use clap::Args;

/// Settings that can be overridden on the command line
///
/// Precedence: command line, then `PHENOSCRIBE_*` environment variables,
/// then the configuration file, then built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Model to use
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Gene-level clustering TSV
    #[arg(long)]
    pub input_file: Option<String>,

    /// Output directory
    #[arg(long)]
    pub output_dir: Option<String>,
}

impl ConfigOverrides {
    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut PhenoscribeConfig) {
        if let Some(model) = &self.model {
            tracing::debug!(model = %model, "Overriding model from CLI");
            config.analysis.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.analysis.temperature = temperature;
        }
        if let Some(input_file) = &self.input_file {
            config.input.file = input_file.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output.dir = output_dir.clone();
        }
    }
}

/// Resolve configuration and apply command-line overrides, then validate
pub fn effective_config(
    config_path: Option<&str>,
    overrides: &ConfigOverrides,
) -> Result<PhenoscribeConfig> {
    let mut config = resolve_config(config_path)?;
    overrides.apply(&mut config);
    config.validate().map_err(|e| {
        crate::domain::PhenoscribeError::Configuration(format!(
            "Configuration validation failed: {e}"
        ))
    })?;
    Ok(config)
}
