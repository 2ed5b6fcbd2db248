//! Domain error types
//!
//! This module defines the error hierarchy for Phenoscribe.
//! Errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Phenoscribe error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum PhenoscribeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input table errors (missing file, missing columns, unreadable rows)
    #[error("Input error: {0}")]
    Input(String),

    /// Analyzer backend errors
    #[error("Analyzer error: {0}")]
    Analyzer(#[from] AnalyzerError),

    /// Checkpoint store errors
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Aggregate report errors
    #[error("Report error: {0}")]
    Report(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Analyzer backend errors
///
/// Errors that occur when calling the language-model backend.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Failed to reach the backend
    #[error("Failed to connect to analyzer backend: {0}")]
    ConnectionFailed(String),

    /// Authentication failed (401/403)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// No API key configured
    #[error("No API key configured (set analysis.api_key or ANTHROPIC_API_KEY)")]
    MissingApiKey,

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be interpreted as an annotation
    #[error("Invalid response from analyzer: {0}")]
    InvalidResponse(String),

    /// Response contained no annotation at all
    #[error("Analyzer returned an empty response for cluster {0}")]
    EmptyResponse(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl AnalyzerError {
    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AnalyzerError::ConnectionFailed(_)
                | AnalyzerError::RateLimitExceeded(_)
                | AnalyzerError::ServerError { .. }
                | AnalyzerError::Timeout(_)
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PhenoscribeError {
    fn from(err: std::io::Error) -> Self {
        PhenoscribeError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PhenoscribeError {
    fn from(err: serde_json::Error) -> Self {
        PhenoscribeError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PhenoscribeError {
    fn from(err: toml::de::Error) -> Self {
        PhenoscribeError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors (input table and summary TSV)
impl From<csv::Error> for PhenoscribeError {
    fn from(err: csv::Error) -> Self {
        PhenoscribeError::Input(format!("TSV error: {err}"))
    }
}
