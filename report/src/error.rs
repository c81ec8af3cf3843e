//! Error types for figure export.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while rendering or writing the report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the output file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
