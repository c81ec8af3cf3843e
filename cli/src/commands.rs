//! Schema bootstrap, insert and similarity search commands.

use tracing::{debug, info};

use embedviz_embeddings::{EmbeddingProvider, cosine_similarity, parse_embedding};
use embedviz_store::{EmbeddingStore, SearchHit};

use crate::error::{PipelineError, Result};

/// Number of results returned by a search unless asked otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// A search hit with its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub hit: SearchHit,

    /// Cosine similarity between the query and the stored vector.
    pub similarity: f64,
}

/// Create the extension, table and index for `dimension`-component vectors.
pub async fn init_schema(store: &dyn EmbeddingStore, dimension: usize) -> Result<()> {
    store.ensure_schema(dimension).await?;
    Ok(())
}

/// Embed `text` and store it. Returns the new record's id.
pub async fn insert_text(
    provider: &dyn EmbeddingProvider,
    store: &dyn EmbeddingStore,
    text: &str,
) -> Result<String> {
    if text.trim().is_empty() {
        return Err(PipelineError::InvalidInput(
            "text to insert must not be empty".to_string(),
        ));
    }

    let embedding = provider.embed(text).await?;
    debug!(
        "Embedded {} chars with {}/{}",
        text.chars().count(),
        provider.name(),
        provider.model()
    );

    let id = store.insert(text, &embedding).await?;
    info!("Stored text as record {id}");
    Ok(id)
}

/// Embed `query` and return the `top_k` nearest stored records, nearest
/// first.
pub async fn search_similar(
    provider: &dyn EmbeddingProvider,
    store: &dyn EmbeddingStore,
    query: &str,
    top_k: usize,
) -> Result<Vec<SearchResult>> {
    if top_k == 0 {
        return Err(PipelineError::InvalidInput(
            "top_k must be at least 1".to_string(),
        ));
    }

    let embedding = provider.embed(query).await?;
    let hits = store.search(&embedding, top_k).await?;

    let results = hits
        .into_iter()
        .map(|hit| -> Result<SearchResult> {
            let stored = parse_embedding(&hit.record.embedding)?;
            Ok(SearchResult {
                similarity: cosine_similarity(&embedding, &stored),
                hit,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Found {} similar records", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use embedviz_embeddings::{Embedding, EmbeddingError, StoredRecord};
    use embedviz_store::{InMemorySource, RecordSource};
    use pretty_assertions::assert_eq;

    /// Embeds a text as its counts of the letters `a`, `b` and `c`.
    struct LetterCounts;

    #[async_trait]
    impl EmbeddingProvider for LetterCounts {
        fn name(&self) -> &str {
            "letters"
        }

        fn model(&self) -> &str {
            "abc"
        }

        async fn embed(&self, text: &str) -> embedviz_embeddings::Result<Embedding> {
            Ok(['a', 'b', 'c']
                .iter()
                .map(|&letter| text.chars().filter(|&c| c == letter).count() as f32)
                .collect())
        }
    }

    struct Unavailable;

    #[async_trait]
    impl EmbeddingProvider for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        fn model(&self) -> &str {
            "none"
        }

        async fn embed(&self, _text: &str) -> embedviz_embeddings::Result<Embedding> {
            Err(EmbeddingError::ApiRequest("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_insert_embeds_and_stores() {
        let store = InMemorySource::default();
        let id = insert_text(&LetterCounts, &store, "abba").await.unwrap();
        assert_eq!(id, "1");

        let records = store.fetch_records().await.unwrap();
        assert_eq!(records, vec![StoredRecord::new("1", "abba", "[2,2,0]")]);
    }

    #[tokio::test]
    async fn test_insert_rejects_blank_text() {
        let store = InMemorySource::default();
        let err = insert_text(&LetterCounts, &store, "  \n").await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert!(store.fetch_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_stores_nothing() {
        let store = InMemorySource::default();
        let err = insert_text(&Unavailable, &store, "abc").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Embedding(EmbeddingError::ApiRequest(_))
        ));
        assert!(store.fetch_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_returns_nearest_first() {
        let store = InMemorySource::default();
        for text in ["aaa", "ccc", "aab", "bbb"] {
            insert_text(&LetterCounts, &store, text).await.unwrap();
        }

        let results = search_similar(&LetterCounts, &store, "aaaab", 2).await.unwrap();
        let texts: Vec<_> = results.iter().map(|r| r.hit.record.text.as_str()).collect();
        assert_eq!(texts, vec!["aaa", "aab"]);
        assert!(results[0].hit.distance <= results[1].hit.distance);
        assert!(results.iter().all(|r| r.similarity > 0.9));
    }

    #[tokio::test]
    async fn test_search_rejects_zero_top_k() {
        let store = InMemorySource::default();
        let err = search_similar(&LetterCounts, &store, "a", 0).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_init_schema_validates_dimension() {
        let store = InMemorySource::default();
        init_schema(&store, 768).await.unwrap();
        assert!(matches!(
            init_schema(&store, 0).await,
            Err(PipelineError::Store(_))
        ));
    }
}
