//! Schema bootstrap for the `text_embeddings` table.

use crate::error::{Result, StoreError};

/// Name of the HNSW index over the embedding column.
pub const INDEX_NAME: &str = "text_embeddings_embedding_hnsw_idx";

/// Largest vector dimension pgvector can index with HNSW.
pub const MAX_INDEXED_DIMENSION: usize = 2000;

/// Idempotent statements that enable pgvector and create the table and its
/// cosine HNSW index for vectors of `dimension` components.
pub fn schema_statements(dimension: usize) -> Result<Vec<String>> {
    if dimension == 0 || dimension > MAX_INDEXED_DIMENSION {
        return Err(StoreError::InvalidDimension {
            dimension,
            max: MAX_INDEXED_DIMENSION,
        });
    }

    Ok(vec![
        "CREATE EXTENSION IF NOT EXISTS vector".to_string(),
        format!(
            "CREATE TABLE IF NOT EXISTS text_embeddings (\
             id BIGSERIAL PRIMARY KEY, \
             text TEXT NOT NULL, \
             embedding vector({dimension}) NOT NULL)"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {INDEX_NAME} \
             ON text_embeddings USING hnsw (embedding vector_cosine_ops)"
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_statements_in_dependency_order() {
        let statements = schema_statements(768).unwrap();
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0], "CREATE EXTENSION IF NOT EXISTS vector");
        assert!(statements[1].contains("embedding vector(768) NOT NULL"));
        assert!(statements[2].contains("USING hnsw (embedding vector_cosine_ops)"));
        assert!(statements.iter().all(|s| s.contains("IF NOT EXISTS")));
    }

    #[test]
    fn test_dimension_bounds() {
        assert!(schema_statements(1).is_ok());
        assert!(schema_statements(MAX_INDEXED_DIMENSION).is_ok());
        assert!(matches!(
            schema_statements(0),
            Err(StoreError::InvalidDimension { dimension: 0, .. })
        ));
        assert!(matches!(
            schema_statements(3072),
            Err(StoreError::InvalidDimension { dimension: 3072, max: 2000 })
        ));
    }
}
