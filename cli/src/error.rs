//! Error types for the visualization pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur in any pipeline stage or command.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Loading records failed.
    #[error("store error: {0}")]
    Store(#[from] embedviz_store::StoreError),

    /// Parsing or stacking embeddings failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] embedviz_embeddings::EmbeddingError),

    /// Clustering failed.
    #[error("analysis error: {0}")]
    Analysis(#[from] embedviz_analysis::AnalysisError),

    /// Rendering or writing the report failed.
    #[error("report error: {0}")]
    Report(#[from] embedviz_report::ReportError),

    /// A command argument is unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
