//! Configuration management for Phenoscribe.
//!
//! # Overview
//!
//! Phenoscribe reads an optional TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Documented defaults for every setting
//! - `PHENOSCRIBE_<SECTION>_<KEY>` environment overrides
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use phenoscribe::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("phenoscribe.toml")?;
//! println!("Model: {}", config.analysis.model);
//! println!("Checkpoints: {}/clusters", config.output.dir);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`AnalysisConfig`] - Model, temperature, backend URL, API key, retries
//! - [`InputConfig`] - Gene table path and column names
//! - [`OutputConfig`] - Output directory and resume flag
//! - [`LoggingConfig`] - File logging
//!
//! # Example Configuration
//!
//! ```toml
//! [analysis]
//! model = "claude-sonnet-4-5-20250929"
//! temperature = 0.0
//! api_key = "${ANTHROPIC_API_KEY}"
//!
//! [input]
//! file = "phate_leiden_clustering.tsv"
//!
//! [output]
//! dir = "phenoscribe_output"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, resolve_config};
pub use schema::{
    AnalysisConfig, ApplicationConfig, InputConfig, LoggingConfig, OutputConfig,
    PhenoscribeConfig, RetryConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
