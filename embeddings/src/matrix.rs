//! The stacked vector matrix.

use ndarray::Array2;
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// All embeddings stacked into an `N x D` matrix.
///
/// Row order matches the order of the input embeddings. A `VectorMatrix`
/// always has at least one row and one column.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatrix {
    data: Array2<f64>,
}

impl VectorMatrix {
    /// Stack embeddings into a matrix.
    ///
    /// Fails on empty input and on any embedding whose dimension differs
    /// from the first one.
    pub fn stack(embeddings: &[Embedding]) -> Result<Self> {
        let first = embeddings.first().ok_or(EmbeddingError::EmptyInput)?;
        let dimension = first.len();
        if dimension == 0 {
            return Err(EmbeddingError::DimensionMismatch {
                row: 0,
                expected: 1,
                actual: 0,
            });
        }

        let mut data = Array2::<f64>::zeros((embeddings.len(), dimension));
        for (row, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    row,
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            for (col, &value) in embedding.iter().enumerate() {
                data[[row, col]] = f64::from(value);
            }
        }

        debug!(
            "Stacked vector matrix with {} rows of dimension {dimension}",
            embeddings.len()
        );

        Ok(Self { data })
    }

    /// Number of vectors.
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    /// `(rows, dimension)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// The underlying array.
    pub fn records(&self) -> &Array2<f64> {
        &self.data
    }
}
