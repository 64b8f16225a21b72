//! Analyzer error types.

use thiserror::Error;

/// Error type for analyzer operations.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Core validation error.
    #[error("Core error: {0}")]
    Core(#[from] vca_core::Error),

    /// The analyzer has been closed; no further results will arrive.
    #[error("Analyzer aborted")]
    Aborted,

    /// Internal engine error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using the analyzer error type.
pub type Result<T> = std::result::Result<T, AnalyzerError>;
