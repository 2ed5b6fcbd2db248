//! Aggregation of per-cluster checkpoints into final reports

pub mod combine;

pub use combine::{
    combine, output_paths, write_outputs, CombinedReport, ReportPaths, SummaryRow, SummaryTable,
    SUMMARY_COLUMNS,
};
