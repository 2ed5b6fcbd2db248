//! Domain models and types for Phenoscribe.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ClusterId`])
//! - **Work items** ([`ClusterRow`]) and their shared [`AnalysisContext`]
//! - **Analysis results** ([`ClusterAnnotation`])
//! - **Error types** ([`PhenoscribeError`], [`AnalyzerError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, PhenoscribeError>`]:
//!
//! ```rust
//! use phenoscribe::domain::{ClusterId, PhenoscribeError, Result};
//!
//! fn parse(raw: &str) -> Result<ClusterId> {
//!     ClusterId::new(raw).map_err(PhenoscribeError::Validation)
//! }
//! # assert!(parse("3").is_ok());
//! ```

pub mod annotation;
pub mod cluster;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use annotation::ClusterAnnotation;
pub use cluster::{AnalysisContext, ClusterRow, GeneAnnotations};
pub use errors::{AnalyzerError, PhenoscribeError};
pub use ids::ClusterId;
pub use result::Result;
