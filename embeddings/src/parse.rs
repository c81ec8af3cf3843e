//! Strict parsing of stored embedding text.
//!
//! Stored embeddings arrive as text such as `[0.12,-0.5,3e-2]` (the text
//! form of a pgvector `vector`). Only a bracketed, comma-separated list of
//! finite decimal numbers is accepted; anything else is rejected.

use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::record::{Record, StoredRecord};

/// Parse a single stored embedding.
pub fn parse_embedding(raw: &str) -> Result<Embedding> {
    let trimmed = raw.trim();

    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            EmbeddingError::Malformed(format!("expected a [..] list, got {}", preview(trimmed)))
        })?;

    if inner.trim().is_empty() {
        return Err(EmbeddingError::Malformed("empty list".to_string()));
    }

    inner
        .split(',')
        .enumerate()
        .map(|(position, token)| parse_component(token.trim(), position))
        .collect()
}

fn parse_component(token: &str, position: usize) -> Result<f32> {
    let invalid = || EmbeddingError::InvalidNumber {
        token: token.to_string(),
        position,
    };

    // `f32::from_str` also accepts "inf" and "NaN"; only plain decimals pass.
    if token.is_empty()
        || !token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return Err(invalid());
    }

    let value: f32 = token.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}

/// Parse every stored record, keeping row order.
///
/// The error names the id of the first record that fails.
pub fn parse_records(rows: Vec<StoredRecord>) -> Result<Vec<Record>> {
    let records = rows
        .into_iter()
        .map(|row| {
            let embedding =
                parse_embedding(&row.embedding).map_err(|source| EmbeddingError::Record {
                    id: row.id.clone(),
                    source: Box::new(source),
                })?;
            Ok(Record {
                id: row.id,
                text: row.text,
                embedding,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Parsed {} stored embeddings", records.len());
    Ok(records)
}

/// Render an embedding in the text form pgvector accepts, e.g. `[0.5,-1,22.5]`.
///
/// Values are written with the shortest representation that parses back to
/// the same `f32`, so the output round-trips through [`parse_embedding`].
pub fn format_embedding(embedding: &[f32]) -> String {
    let parts: Vec<String> = embedding.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(","))
}

fn preview(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        format!("{text:?}")
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{head:?}...")
    }
}
