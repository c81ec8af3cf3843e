//! Error types for embedding parsing and stacking.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur while parsing, stacking or generating embeddings.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The stored text is not a bracketed numeric list.
    #[error("malformed embedding: {0}")]
    Malformed(String),

    /// A list element is not a finite decimal number.
    #[error("invalid number {token:?} at position {position}")]
    InvalidNumber { token: String, position: usize },

    /// A record's embedding failed to parse.
    #[error("record {id}: {source}")]
    Record {
        id: String,
        #[source]
        source: Box<EmbeddingError>,
    },

    /// Nothing to stack.
    #[error("no embeddings to stack")]
    EmptyInput,

    /// Dimension mismatch.
    #[error("dimension mismatch at row {row}: expected {expected}, got {actual}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// The embedding service answered with an error status.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The embedding service answered with an unusable body.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
