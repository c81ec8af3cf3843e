//! Error types for the analysis stages.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while clustering or projecting.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// K-means failed to fit.
    #[error("k-means fit failed: {0}")]
    KMeans(#[from] linfa_clustering::KMeansError),
}
