//! Error types for the volume-crossover system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the volume-crossover system.
///
/// Only run-level failures live here. Problems with a single row or a single
/// instrument are reported as [`crate::Diagnostic`] values instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Insufficient data for computation.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The row source failed while producing input.
    #[error("Upstream source error: {0}")]
    Upstream(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Error::InsufficientData(msg.into())
    }

    /// Create an upstream source error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Error::Upstream(msg.into())
    }

    /// Whether the run should abort because the input collaborator failed.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream(_) | Error::Io(_) | Error::Csv(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Error::config("window must be positive").to_string(),
            "Configuration error: window must be positive"
        );
        assert_eq!(
            Error::insufficient_data("no daily records").to_string(),
            "Insufficient data: no daily records"
        );
    }

    #[test]
    fn test_upstream_classification() {
        assert!(Error::upstream("disk gone").is_upstream());
        assert!(Error::Io(std::io::Error::other("eof")).is_upstream());
        assert!(!Error::config("bad").is_upstream());
    }
}
