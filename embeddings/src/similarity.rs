//! Similarity computation for embeddings.

use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use crate::matrix::VectorMatrix;

/// Compute the cosine similarity between two vectors.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors (or a zero vector)
/// - -1.0 means opposite vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    let magnitude_a = magnitude(a);
    let magnitude_b = magnitude(b);

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    (dot_product / (magnitude_a * magnitude_b)).clamp(-1.0, 1.0)
}

/// Euclidean (L2) distance, the ordering used by pgvector's `<->`.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

fn magnitude(v: &[f32]) -> f64 {
    v.iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt()
}

/// Compute the full `N x N` cosine similarity matrix.
///
/// The result is exactly symmetric. Diagonal entries are 1.0 for non-zero
/// rows; an all-zero row has similarity 0.0 with every row, itself included.
pub fn cosine_similarity_matrix(matrix: &VectorMatrix) -> Array2<f64> {
    let records = matrix.records();
    let n = matrix.n_rows();

    let norms: Array1<f64> = records.map_axis(Axis(1), |row| row.dot(&row).sqrt());
    let mut unit = records.clone();
    for (mut row, &norm) in unit.axis_iter_mut(Axis(0)).zip(norms.iter()) {
        if norm > 0.0 {
            row /= norm;
        }
    }

    let raw = unit.dot(&unit.t());

    let mut similarity = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        if norms[i] > 0.0 {
            similarity[[i, i]] = 1.0;
        }
        for j in (i + 1)..n {
            let value = raw[[i, j]].clamp(-1.0, 1.0);
            similarity[[i, j]] = value;
            similarity[[j, i]] = value;
        }
    }

    debug!("Computed {n}x{n} cosine similarity matrix");
    similarity
}

/// Mean of each row of a similarity matrix, self-similarity included.
pub fn average_similarity(similarity: &Array2<f64>) -> Vec<f64> {
    similarity
        .mean_axis(Axis(1))
        .map(|means| means.to_vec())
        .unwrap_or_default()
}
