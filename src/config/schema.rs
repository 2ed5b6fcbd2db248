//! Configuration schema types
//!
//! Every field has a documented default so a run works without a config file;
//! the defaults reproduce the OPS screen setup the tool was written for.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Default language model identifier
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.0;

/// Default gene-level input table
pub const DEFAULT_INPUT_FILE: &str =
    "brieflow_output/cluster/Hoescht_COX4_AGP_ConA/all/filtered/10/phate_leiden_clustering.tsv";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str =
    "brieflow_output/cluster/Hoescht_COX4_AGP_ConA/all/filtered/10/phenoscribe";

/// Default screen context handed to the analyzer with every cluster
pub const DEFAULT_SCREEN_CONTEXT: &str = "\
These clusters are from an optical pooled screen (OPS) that measured morphological
phenotypes in human cells. The screen involved perturbing genes using CRISPR knockout
system and imaging the resulting cellular morphology via fluorescence microscopy adapted
from the cell-painting panel, specifically: stains of Hoechst (nucleus),
COX4 (mitochondria), AGP (actin/golgi/plasma membrane), and ConA (endoplasmic reticulum).
Genes grouped within a cluster tend to exhibit similar phenotypes, suggesting they
may participate in the same biological process or pathway.
";

/// Main Phenoscribe configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PhenoscribeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Analyzer backend settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Input table settings
    #[serde(default)]
    pub input: InputConfig,

    /// Output and checkpoint settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PhenoscribeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.analysis.validate()?;
        self.input.validate()?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Retry configuration for analyzer calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per cluster (1 disables retrying)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(format!(
                "analysis.retry.max_attempts must be between 1 and 10, got {}",
                self.max_attempts
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "analysis.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(
                "analysis.retry.initial_delay_ms cannot exceed analysis.retry.max_delay_ms"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Analyzer backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Model identifier; may contain a namespace separator ("org/model")
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum tokens in the analyzer response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Base URL of the Messages API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version header value
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// API key
    /// Stored securely in memory and automatically zeroized on drop.
    /// Falls back to the ANTHROPIC_API_KEY environment variable when unset.
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Free-text description of the screen, sent with every cluster
    #[serde(default = "default_screen_context")]
    pub screen_context: String,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            screen_context: default_screen_context(),
            retry: RetryConfig::default(),
        }
    }
}

impl AnalysisConfig {
    fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("analysis.model cannot be empty".to_string());
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "analysis.temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            ));
        }

        if self.max_tokens == 0 {
            return Err("analysis.max_tokens must be > 0".to_string());
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("analysis.base_url is not a valid URL: {e}"))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err("analysis.base_url must start with http:// or https://".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("analysis.timeout_seconds must be > 0".to_string());
        }

        self.retry.validate()
    }
}

/// Filename-safe form of a model identifier
pub fn model_file_stem(model: &str) -> String {
    model.replace('/', "_")
}

/// Input table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Gene-level TSV file
    #[serde(default = "default_input_file")]
    pub file: String,

    /// Column holding gene symbols
    #[serde(default = "default_gene_column")]
    pub gene_column: String,

    /// Accepted alternate name for the gene column, renamed when the canonical one is absent
    #[serde(default = "default_alternate_gene_column")]
    pub alternate_gene_column: Option<String>,

    /// Column holding cluster labels
    #[serde(default = "default_cluster_column")]
    pub cluster_column: String,

    /// Optional column holding functional annotation text
    #[serde(default = "default_annotation_column")]
    pub annotation_column: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            file: default_input_file(),
            gene_column: default_gene_column(),
            alternate_gene_column: default_alternate_gene_column(),
            cluster_column: default_cluster_column(),
            annotation_column: default_annotation_column(),
        }
    }
}

impl InputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.file.trim().is_empty() {
            return Err("input.file cannot be empty".to_string());
        }
        if self.gene_column.is_empty() || self.cluster_column.is_empty() {
            return Err("input.gene_column and input.cluster_column cannot be empty".to_string());
        }
        if self.gene_column == self.cluster_column {
            return Err("input.gene_column and input.cluster_column must differ".to_string());
        }
        Ok(())
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for checkpoints and aggregate reports
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Resume from existing checkpoints
    ///
    /// Informational: completed clusters are always skipped while their
    /// checkpoint file exists.
    #[serde(default = "default_true")]
    pub resume: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            resume: true,
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.dir.trim().is_empty() {
            return Err("output.dir cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_screen_context() -> String {
    DEFAULT_SCREEN_CONTEXT.to_string()
}

fn default_max_attempts() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_input_file() -> String {
    DEFAULT_INPUT_FILE.to_string()
}

fn default_gene_column() -> String {
    "gene_symbol".to_string()
}

fn default_alternate_gene_column() -> Option<String> {
    Some("gene_symbol_0".to_string())
}

fn default_cluster_column() -> String {
    "cluster".to_string()
}

fn default_annotation_column() -> Option<String> {
    Some("uniprot_function".to_string())
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
