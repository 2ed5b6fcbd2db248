// Phenoscribe - Resumable LLM annotation of gene clusters
// Copyright (c) 2025 Phenoscribe Contributors
// Licensed under the MIT License

//! # Phenoscribe - LLM annotation of gene clusters
//!
//! Phenoscribe takes the clusters of a genetic screen (one row per gene with a
//! cluster label), asks a language model to describe each cluster, and keeps
//! one checkpoint file per cluster so interrupted or partially failed runs
//! resume where they stopped.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Input reshaping, batch runner, checkpoint store, reports
//! - [`adapters`] - Language-model backends
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phenoscribe::adapters::llm::MessagesClient;
//! use phenoscribe::cli::commands::analyze::run_pipeline;
//! use phenoscribe::config::resolve_config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = resolve_config(Some("phenoscribe.toml"))?;
//!     let analyzer = Arc::new(MessagesClient::new(&config.analysis)?);
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let outcome = run_pipeline(&config, analyzer, shutdown_rx).await?;
//!     println!(
//!         "analyzed {}, skipped {}, failed {}",
//!         outcome.summary.analyzed, outcome.summary.skipped, outcome.summary.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Resuming
//!
//! A cluster is complete when `<output_dir>/clusters/cluster_<id>.json` holds
//! a valid annotation. Completed clusters are never sent to the model again;
//! deleting a checkpoint re-queues its cluster.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
