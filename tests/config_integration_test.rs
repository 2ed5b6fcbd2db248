//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables hold `ENV_MUTEX` to avoid
//! interference between tests.

use phenoscribe::config::{load_config, resolve_config};
use phenoscribe::config::schema::{model_file_stem, DEFAULT_MODEL, DEFAULT_OUTPUT_DIR};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for var in [
        "PHENOSCRIBE_APPLICATION_LOG_LEVEL",
        "PHENOSCRIBE_ANALYSIS_MODEL",
        "PHENOSCRIBE_ANALYSIS_TEMPERATURE",
        "PHENOSCRIBE_ANALYSIS_API_KEY",
        "PHENOSCRIBE_ANALYSIS_RETRY_MAX_ATTEMPTS",
        "PHENOSCRIBE_INPUT_FILE",
        "PHENOSCRIBE_OUTPUT_DIR",
        "PHENOSCRIBE_OUTPUT_RESUME",
        "TEST_PHENOSCRIBE_KEY",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[application]
log_level = "debug"

[analysis]
model = "anthropic/claude-haiku"
temperature = 0.2
max_tokens = 2048
base_url = "http://localhost:8080"
api_key = "sk-test-123"
timeout_seconds = 30
screen_context = "CRISPRi screen in K562 cells"

[analysis.retry]
max_attempts = 5
initial_delay_ms = 500
max_delay_ms = 8000
backoff_multiplier = 3.0

[input]
file = "data/clusters.tsv"
gene_column = "symbol"
cluster_column = "leiden"
annotation_column = "function"

[output]
dir = "results"
resume = false

[logging]
local_enabled = true
local_path = "/tmp/phenoscribe-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.analysis.model, "anthropic/claude-haiku");
    assert_eq!(model_file_stem(&config.analysis.model), "anthropic_claude-haiku");
    assert_eq!(config.analysis.temperature, 0.2);
    assert_eq!(config.analysis.max_tokens, 2048);
    assert_eq!(config.analysis.base_url, "http://localhost:8080");
    assert_eq!(
        config.analysis.api_key.as_ref().unwrap().expose_secret(),
        "sk-test-123"
    );
    assert_eq!(config.analysis.timeout_seconds, 30);
    assert_eq!(config.analysis.screen_context, "CRISPRi screen in K562 cells");
    assert_eq!(config.analysis.retry.max_attempts, 5);
    assert_eq!(config.analysis.retry.backoff_multiplier, 3.0);
    assert_eq!(config.input.file, "data/clusters.tsv");
    assert_eq!(config.input.gene_column, "symbol");
    assert_eq!(config.input.cluster_column, "leiden");
    assert_eq!(config.input.annotation_column.as_deref(), Some("function"));
    assert_eq!(config.output.dir, "results");
    assert!(!config.output.resume);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("[input]\nfile = \"clusters.tsv\"\n");
    let config = load_config(temp_file.path()).unwrap();

    assert_eq!(config.analysis.model, DEFAULT_MODEL);
    assert_eq!(config.analysis.temperature, 0.0);
    assert!(config.analysis.api_key.is_none());
    assert_eq!(config.output.dir, DEFAULT_OUTPUT_DIR);
    assert!(config.output.resume);
    assert_eq!(config.input.gene_column, "gene_symbol");
    assert_eq!(config.input.alternate_gene_column.as_deref(), Some("gene_symbol_0"));
    assert_eq!(config.input.cluster_column, "cluster");
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_PHENOSCRIBE_KEY", "sk-from-env");

    let temp_file = write_config("[analysis]\napi_key = \"${TEST_PHENOSCRIBE_KEY}\"\n");
    let config = load_config(temp_file.path()).unwrap();

    assert_eq!(
        config.analysis.api_key.as_ref().unwrap().expose_secret(),
        "sk-from-env"
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("[analysis]\napi_key = \"${TEST_PHENOSCRIBE_KEY}\"\n");
    let err = load_config(temp_file.path()).unwrap_err();

    assert!(err.to_string().contains("TEST_PHENOSCRIBE_KEY"));
}

#[test]
fn test_env_overrides_take_precedence_over_file() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("PHENOSCRIBE_ANALYSIS_MODEL", "openai/gpt-4o");
    std::env::set_var("PHENOSCRIBE_ANALYSIS_TEMPERATURE", "0.5");
    std::env::set_var("PHENOSCRIBE_OUTPUT_DIR", "override_out");
    std::env::set_var("PHENOSCRIBE_ANALYSIS_RETRY_MAX_ATTEMPTS", "2");

    let temp_file = write_config(
        "[analysis]\nmodel = \"claude-haiku\"\ntemperature = 0.1\n\n[output]\ndir = \"file_out\"\n",
    );
    let config = load_config(temp_file.path()).unwrap();

    assert_eq!(config.analysis.model, "openai/gpt-4o");
    assert_eq!(config.analysis.temperature, 0.5);
    assert_eq!(config.output.dir, "override_out");
    assert_eq!(config.analysis.retry.max_attempts, 2);

    cleanup_env_vars();
}

#[test]
fn test_resolve_without_file_applies_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("PHENOSCRIBE_INPUT_FILE", "from_env.tsv");
    std::env::set_var("PHENOSCRIBE_ANALYSIS_API_KEY", "sk-override");

    let config = resolve_config(None).unwrap();

    assert_eq!(config.input.file, "from_env.tsv");
    assert_eq!(config.analysis.model, DEFAULT_MODEL);
    assert!(config.analysis.api_key.is_some());

    cleanup_env_vars();
}

#[test]
fn test_invalid_temperature_override_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("PHENOSCRIBE_ANALYSIS_TEMPERATURE", "warm");

    let result = resolve_config(None);
    cleanup_env_vars();

    assert!(result.is_err());
}

#[test]
fn test_validation_errors() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        "[application]\nlog_level = \"loud\"\n",
        "[analysis]\ntemperature = 1.5\n",
        "[analysis]\nbase_url = \"ftp://example.com\"\n",
        "[analysis.retry]\nmax_attempts = 0\n",
        "[input]\ngene_column = \"cluster\"\n",
        "[output]\ndir = \"\"\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
    ];

    for contents in cases {
        let temp_file = write_config(contents);
        let result = load_config(temp_file.path());
        assert!(result.is_err(), "expected validation failure for {contents:?}");
    }
}

#[test]
fn test_invalid_toml_fails() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("[analysis\nmodel = ");
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}
