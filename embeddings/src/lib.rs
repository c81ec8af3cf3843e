//! # Embeddings
//!
//! Record types, vector math and embedding generation for embedviz.
//!
//! ## Features
//!
//! - **Records**: raw rows as stored and their parsed form
//! - **Strict Parsing**: numeric-list parser for stored embedding text
//! - **Vector Matrix**: stacked embeddings with a uniform dimension
//! - **Similarity**: pairwise cosine similarity, per-item averages and L2 distance
//! - **Providers**: embedding generation through a local Ollama server
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings                                   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  StoredRecord ──► parse_records ──► Record ──► VectorMatrix    │
//! │                                                     │           │
//! │                                                     ▼           │
//! │                                  cosine_similarity_matrix       │
//! │                                                     │           │
//! │                                                     ▼           │
//! │                                       average_similarity        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod matrix;
pub mod parse;
pub mod provider;
pub mod record;
pub mod similarity;

pub use error::{EmbeddingError, Result};
pub use matrix::VectorMatrix;
pub use parse::{format_embedding, parse_embedding, parse_records};
pub use provider::{EmbeddingProvider, OllamaProvider};
pub use record::{Record, StoredRecord};
pub use similarity::{
    average_similarity, cosine_similarity, cosine_similarity_matrix, euclidean_distance,
};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
