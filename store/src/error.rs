//! Error types for the record store.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading or writing the embeddings table.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required environment variable is not set.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// An environment variable has an unusable value.
    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    /// Connection or query failure.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// The connection task panicked or was cancelled.
    #[error("connection task failed: {0}")]
    ConnectionTask(#[from] tokio::task::JoinError),

    /// A row has no embedding.
    #[error("record {id} has a NULL embedding")]
    NullEmbedding { id: String },

    /// A stored or query embedding could not be used.
    #[error("embedding error: {0}")]
    Embedding(#[from] embedviz_embeddings::EmbeddingError),

    /// The requested vector dimension cannot be stored and indexed.
    #[error("unsupported vector dimension {dimension} (expected 1..={max})")]
    InvalidDimension { dimension: usize, max: usize },
}
