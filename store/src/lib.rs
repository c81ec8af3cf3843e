//! # Store
//!
//! Reads and writes the `text_embeddings` table. [`RecordSource`] is the
//! seam between the visualization pipeline and the database;
//! [`EmbeddingStore`] adds schema bootstrap, inserts and nearest-neighbour
//! search. [`PostgresSource`] is the real implementation and
//! [`InMemorySource`] keeps records in memory.

pub mod config;
pub mod error;
pub mod schema;
pub mod source;

pub use config::{DatabaseConfig, SslMode};
pub use error::{Result, StoreError};
pub use schema::{MAX_INDEXED_DIMENSION, schema_statements};
pub use source::{
    EmbeddingStore, FETCH_QUERY, InMemorySource, PostgresSource, RecordSource, SearchHit,
};
