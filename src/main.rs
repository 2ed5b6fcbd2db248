// Phenoscribe - Resumable LLM annotation of gene clusters
// Copyright (c) 2025 Phenoscribe Contributors
// Licensed under the MIT License

use clap::Parser;
use phenoscribe::cli::{Cli, Commands};
use phenoscribe::config::{resolve_config, LoggingConfig};
use phenoscribe::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = cli.config_path();

    // Logging settings come from the config when it loads; commands report
    // configuration errors themselves.
    let config = resolve_config(config_path.as_deref()).ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = config
        .map(|c| c.logging)
        .unwrap_or_else(LoggingConfig::default);

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Phenoscribe - gene cluster annotation"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(listen_for_shutdown(shutdown_tx));

    let exit_code = match execute_command(&cli, config_path.as_deref(), shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // process::exit skips destructors
    drop(guard);
    process::exit(exit_code);
}

/// Flip the shutdown flag on SIGINT or SIGTERM
async fn listen_for_shutdown(shutdown_tx: watch::Sender<bool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                if tokio::signal::ctrl_c().await.is_ok() {
                    request_shutdown(&shutdown_tx, "SIGINT");
                }
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => request_shutdown(&shutdown_tx, "SIGINT"),
            _ = sigterm.recv() => request_shutdown(&shutdown_tx, "SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        } else {
            request_shutdown(&shutdown_tx, "SIGINT");
        }
    }
}

fn request_shutdown(shutdown_tx: &watch::Sender<bool>, signal: &str) {
    tracing::info!(signal, "Shutdown requested, finishing current cluster");
    println!("\n⚠️  Shutdown signal received, finishing current cluster...");
    let _ = shutdown_tx.send(true);
}

/// Execute the CLI command
async fn execute_command(
    cli: &Cli,
    config_path: Option<&str>,
    shutdown_signal: watch::Receiver<bool>,
) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Analyze(args) => args.execute(config_path, shutdown_signal).await,
        Commands::Combine(args) => args.execute(config_path).await,
        Commands::Status(args) => args.execute(config_path).await,
        Commands::ValidateConfig(args) => args.execute(config_path).await,
        Commands::Init(args) => args.execute().await,
    }
}
