//! End-to-end pipeline tests: gene table in, checkpoints and aggregates out

mod common;

use common::{file_names, test_config, write_gene_table, StubAnalyzer};
use phenoscribe::cli::commands::analyze::run_pipeline;
use phenoscribe::domain::PhenoscribeError;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

const TABLE: &str = "\
gene_symbol\tcluster\tuniprot_function
A\t10\tKinase
B\t10\t
C\t2\tTransporter
";

#[tokio::test]
async fn test_pipeline_writes_checkpoints_and_aggregates() {
    let input_dir = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let input = write_gene_table(input_dir.path(), TABLE);
    let config = test_config(&input, output.path());

    let analyzer = Arc::new(StubAnalyzer::new());
    let (_tx, rx) = watch::channel(false);
    let outcome = run_pipeline(&config, analyzer.clone(), rx).await.unwrap();

    // Analyzed in input order
    assert_eq!(analyzer.seen(), vec!["10", "2"]);
    assert_eq!(outcome.summary.analyzed, 2);
    assert!(outcome.summary.is_successful());

    assert_eq!(
        file_names(&output.path().join("clusters")),
        vec!["cluster_10.json", "cluster_2.json"]
    );

    assert!(outcome.paths.json.ends_with("stub_model_results.json"));
    assert!(outcome
        .paths
        .tsv
        .ends_with("stub_model_results_summaries.tsv"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&outcome.paths.json).unwrap()).unwrap();
    assert_eq!(report["model"], "stub/model");
    assert_eq!(report["clusters"].as_array().unwrap().len(), 2);
    // Reported in numeric order
    assert_eq!(report["clusters"][0]["cluster_id"], "2");
    assert_eq!(report["clusters"][1]["cluster_id"], "10");
    assert_eq!(report["clusters"][1]["summary"], "2 genes, 1 annotated");

    let tsv = fs::read_to_string(&outcome.paths.tsv).unwrap();
    let lines: Vec<&str> = tsv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("cluster_id\t"));
    assert!(lines[1].starts_with("2\t"));
    assert!(lines[2].starts_with("10\t"));
}

#[tokio::test]
async fn test_failed_cluster_is_picked_up_on_rerun() {
    let input_dir = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let input = write_gene_table(input_dir.path(), TABLE);
    let config = test_config(&input, output.path());

    let (_tx, rx) = watch::channel(false);
    let first = Arc::new(StubAnalyzer::new().failing_on(&["2"]));
    let outcome = run_pipeline(&config, first, rx).await.unwrap();

    assert_eq!(outcome.summary.failed, 1);
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&outcome.paths.json).unwrap()).unwrap();
    assert_eq!(report["clusters"].as_array().unwrap().len(), 1);

    let checkpoint = output.path().join("clusters").join("cluster_10.json");
    let saved = fs::read(&checkpoint).unwrap();

    let (_tx, rx) = watch::channel(false);
    let second = Arc::new(StubAnalyzer::new());
    let outcome = run_pipeline(&config, second.clone(), rx).await.unwrap();

    assert_eq!(second.seen(), vec!["2"]);
    assert_eq!(outcome.summary.skipped, 1);
    assert_eq!(outcome.summary.analyzed, 1);
    assert_eq!(fs::read(&checkpoint).unwrap(), saved);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&outcome.paths.json).unwrap()).unwrap();
    assert_eq!(report["clusters"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_alternate_gene_column_is_accepted() {
    let input_dir = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let input = write_gene_table(input_dir.path(), "gene_symbol_0\tcluster\nX\t7\nY\t7\n");
    let config = test_config(&input, output.path());

    let analyzer = Arc::new(StubAnalyzer::new());
    let (_tx, rx) = watch::channel(false);
    let outcome = run_pipeline(&config, analyzer.clone(), rx).await.unwrap();

    assert_eq!(analyzer.seen(), vec!["7"]);
    assert_eq!(outcome.summary.analyzed, 1);
}

#[tokio::test]
async fn test_missing_input_fails_before_any_analysis() {
    let output = TempDir::new().unwrap();
    let config = test_config(&output.path().join("absent.tsv"), output.path());

    let analyzer = Arc::new(StubAnalyzer::new());
    let (_tx, rx) = watch::channel(false);
    let result = run_pipeline(&config, analyzer.clone(), rx).await;

    assert!(matches!(result, Err(PhenoscribeError::Input(_))));
    assert_eq!(analyzer.calls(), 0);
}

#[tokio::test]
async fn test_missing_cluster_column_is_an_input_error() {
    let input_dir = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let input = write_gene_table(input_dir.path(), "gene_symbol\tgroup\nA\t1\n");
    let config = test_config(&input, output.path());

    let analyzer = Arc::new(StubAnalyzer::new());
    let (_tx, rx) = watch::channel(false);
    let result = run_pipeline(&config, analyzer.clone(), rx).await;

    assert!(matches!(result, Err(PhenoscribeError::Input(_))));
    assert_eq!(analyzer.calls(), 0);
    assert!(!output.path().join("clusters").exists());
}
