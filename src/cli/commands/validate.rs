//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Phenoscribe configuration.

use crate::adapters::llm::client::API_KEY_ENV;
use crate::config::resolve_config;
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!(config_path = ?config_path, "Validating configuration");

        match config_path {
            Some(path) => println!("🔍 Validating configuration file: {path}"),
            None => println!("🔍 No configuration file, validating defaults and environment"),
        }
        println!();

        let config = match resolve_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2); // Configuration error exit code
            }
        };

        let api_key_source = if config.analysis.api_key.is_some() {
            "configuration"
        } else if std::env::var(API_KEY_ENV).is_ok_and(|v| !v.trim().is_empty()) {
            API_KEY_ENV
        } else {
            "missing"
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Model: {}", config.analysis.model);
        println!("  Temperature: {}", config.analysis.temperature);
        println!("  Max Tokens: {}", config.analysis.max_tokens);
        println!("  API Base URL: {}", config.analysis.base_url);
        println!("  API Key: {api_key_source}");
        println!("  Retry Attempts: {}", config.analysis.retry.max_attempts);
        println!("  Input File: {}", config.input.file);
        println!(
            "  Columns: gene={}, cluster={}, annotation={}",
            config.input.gene_column,
            config.input.cluster_column,
            config.input.annotation_column.as_deref().unwrap_or("-")
        );
        println!("  Output Directory: {}", config.output.dir);
        println!();

        if !Path::new(&config.input.file).exists() {
            println!("⚠️  Input file does not exist yet: {}", config.input.file);
        }
        if api_key_source == "missing" {
            println!("⚠️  No API key configured; `analyze` will fail until one is set");
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_missing_file_returns_config_error() {
        let args = ValidateArgs {};
        let code = args.execute(Some("does-not-exist.toml")).await.unwrap();
        assert_eq!(code, 2);
    }
}
