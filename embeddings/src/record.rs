//! Row types for the `text_embeddings` table.

use serde::{Deserialize, Serialize};

use crate::Embedding;

/// A row exactly as read from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Row identifier, rendered as text.
    pub id: String,

    /// The embedded text.
    pub text: String,

    /// Textual form of the embedding, e.g. `[0.1,0.2,0.3]`.
    pub embedding: String,
}

impl StoredRecord {
    /// Create a new stored record.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        embedding: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            embedding: embedding.into(),
        }
    }
}

/// A record whose embedding has been parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
    pub embedding: Embedding,
}
