//! Error types for clever-eval operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for clever-eval operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, analyzing, or plotting distances.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A required column is absent from the CSV header.
    #[error("Missing column '{column}' (available: {})", .available.join(", "))]
    MissingColumn {
        /// Column that was looked up.
        column: String,
        /// Header names actually present in the file.
        available: Vec<String>,
    },

    /// A cell could not be parsed as a number.
    #[error("Invalid number at line {line}, column '{column}': {value:?}")]
    ParseValue {
        /// 1-based line number, header included.
        line: usize,
        /// Column name.
        column: String,
        /// Raw cell contents.
        value: String,
    },

    /// Error reading a CSV record.
    #[error("CSV import error at line {line}: {reason}")]
    CsvImport {
        /// Line number where the error occurred.
        line: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// Norm name not recognized.
    #[error("Unknown norm: {0} (expected 1, 2 or inf)")]
    UnknownNorm(String),

    /// No norm in the file has a complete set of columns.
    #[error("No complete distance columns found in {0}")]
    NoDistanceColumns(PathBuf),

    /// Output file extension is not a supported plot format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The system viewer could not be launched.
    #[error("Viewer error: {0}")]
    Viewer(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_lists_available() {
        let err = Error::MissingColumn {
            column: "2-norm-PGD-dist".to_string(),
            available: vec!["a".to_string(), "b".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("2-norm-PGD-dist"));
        assert!(msg.contains("a, b"));
    }
}
