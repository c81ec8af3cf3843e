//! Seeded k-means clustering of the vector matrix.

use std::collections::HashSet;

use linfa::DatasetBase;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2};
use rand_xoshiro::Xoshiro256Plus;
use rand_xoshiro::rand_core::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use embedviz_embeddings::VectorMatrix;

use crate::error::{AnalysisError, Result};

/// Upper bound on the number of clusters.
pub const DEFAULT_MAX_CLUSTERS: usize = 5;

/// Seed for k-means++ initialization.
pub const DEFAULT_SEED: u64 = 42;

/// Configuration for k-means clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Maximum number of clusters; the effective count is `min(max, N)`.
    pub max_clusters: usize,

    /// RNG seed for reproducible initialization.
    pub seed: u64,

    /// Maximum Lloyd iterations per run.
    pub max_iterations: u64,

    /// Convergence tolerance on centroid movement.
    pub tolerance: f64,

    /// Independent initializations; the lowest inertia wins.
    pub n_runs: usize,
}

impl ClusterConfig {
    /// Set the maximum number of clusters.
    pub fn with_max_clusters(mut self, max_clusters: usize) -> Self {
        self.max_clusters = max_clusters;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_clusters: DEFAULT_MAX_CLUSTERS,
            seed: DEFAULT_SEED,
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 10,
        }
    }
}

/// Result of clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clustering {
    /// One label per row, in row order.
    pub labels: Vec<usize>,

    /// Number of clusters requested from k-means (0 when skipped).
    pub n_clusters: usize,

    /// Sum of squared distances to the closest centroid, if a model was fit.
    pub inertia: Option<f64>,
}

impl Clustering {
    fn unclustered(n: usize) -> Self {
        Self {
            labels: vec![0; n],
            n_clusters: 0,
            inertia: None,
        }
    }

    /// Number of distinct labels actually assigned.
    pub fn distinct_labels(&self) -> usize {
        self.labels.iter().collect::<HashSet<_>>().len()
    }
}

/// Partition the rows of `matrix` into at most `config.max_clusters` groups.
///
/// When the effective cluster count is zero, or the matrix has fewer rows
/// than that count, every row gets label 0 and no model is fit.
pub fn assign_clusters(matrix: &VectorMatrix, config: &ClusterConfig) -> Result<Clustering> {
    let n = matrix.n_rows();
    let mut k = config.max_clusters.min(n);

    if k == 0 || n < k {
        debug!("Skipping clustering for {n} rows");
        return Ok(Clustering::unclustered(n));
    }

    let distinct = distinct_rows(matrix.records());
    if distinct < k {
        warn!("Only {distinct} distinct vectors, lowering cluster count from {k} to {distinct}");
        k = distinct;
    }
    if k <= 1 {
        return Ok(Clustering::unclustered(n));
    }

    let records = matrix.records();
    let dataset = DatasetBase::from(records.clone());
    let rng = Xoshiro256Plus::seed_from_u64(config.seed);

    let model = KMeans::params_with_rng(k, rng)
        .n_runs(config.n_runs)
        .max_n_iterations(config.max_iterations)
        .tolerance(config.tolerance)
        .fit(&dataset)
        .map_err(AnalysisError::KMeans)?;

    let mut memberships = Array1::<usize>::zeros(n);
    model.predict_inplace(records, &mut memberships);

    let clustering = Clustering {
        labels: memberships.to_vec(),
        n_clusters: k,
        inertia: Some(model.inertia()),
    };

    info!(
        "Clustered {n} vectors into {} groups (k = {k})",
        clustering.distinct_labels()
    );

    Ok(clustering)
}

fn distinct_rows(records: &Array2<f64>) -> usize {
    records
        .rows()
        .into_iter()
        // `+ 0.0` folds -0.0 into 0.0 so equal points hash equally.
        .map(|row| row.iter().map(|v| (v + 0.0).to_bits()).collect::<Vec<_>>())
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedviz_embeddings::Embedding;
    use pretty_assertions::assert_eq;

    fn blobs(n: usize, dim: usize) -> VectorMatrix {
        // Rows fall into five well separated groups.
        let rows: Vec<Embedding> = (0..n)
            .map(|i| {
                let group = (i % 5) as f32;
                (0..dim)
                    .map(|j| group * 10.0 + ((i * 31 + j * 17) % 7) as f32 * 0.01)
                    .collect()
            })
            .collect();
        VectorMatrix::stack(&rows).unwrap()
    }

    #[test]
    fn test_ten_records_five_clusters() {
        let clustering = assign_clusters(&blobs(10, 8), &ClusterConfig::default()).unwrap();
        assert_eq!(clustering.labels.len(), 10);
        assert_eq!(clustering.n_clusters, 5);
        assert!(clustering.distinct_labels() <= 5);
        assert!(clustering.labels.iter().all(|&l| l < 5));
        assert!(clustering.inertia.is_some());
    }

    #[test]
    fn test_separated_groups_share_labels() {
        let clustering = assign_clusters(&blobs(20, 4), &ClusterConfig::default()).unwrap();
        for i in 0..20 {
            for j in 0..20 {
                if i % 5 == j % 5 {
                    assert_eq!(clustering.labels[i], clustering.labels[j]);
                }
            }
        }
    }

    #[test]
    fn test_two_records_two_clusters() {
        let matrix = VectorMatrix::stack(&[vec![0.0, 1.0], vec![5.0, 5.0]]).unwrap();
        let clustering = assign_clusters(&matrix, &ClusterConfig::default()).unwrap();
        assert_eq!(clustering.n_clusters, 2);
        assert_eq!(clustering.distinct_labels(), 2);
    }

    #[test]
    fn test_zero_max_clusters_labels_all_zero() {
        let config = ClusterConfig::default().with_max_clusters(0);
        let clustering = assign_clusters(&blobs(6, 3), &config).unwrap();
        assert_eq!(clustering.labels, vec![0; 6]);
        assert_eq!(clustering.n_clusters, 0);
        assert_eq!(clustering.inertia, None);
    }

    #[test]
    fn test_duplicate_rows_lower_cluster_count() {
        let rows = vec![vec![1.0, 1.0]; 4]
            .into_iter()
            .chain(std::iter::once(vec![-3.0, 2.0]))
            .collect::<Vec<Embedding>>();
        let matrix = VectorMatrix::stack(&rows).unwrap();
        let clustering = assign_clusters(&matrix, &ClusterConfig::default()).unwrap();
        assert_eq!(clustering.n_clusters, 2);
        assert_eq!(clustering.labels[0], clustering.labels[3]);
        assert_ne!(clustering.labels[0], clustering.labels[4]);
    }

    #[test]
    fn test_single_distinct_row_is_unclustered() {
        let matrix = VectorMatrix::stack(&vec![vec![2.0, -2.0]; 3]).unwrap();
        let clustering = assign_clusters(&matrix, &ClusterConfig::default()).unwrap();
        assert_eq!(clustering.labels, vec![0, 0, 0]);
    }

    #[test]
    fn test_clustering_is_reproducible() {
        let matrix = blobs(15, 6);
        let config = ClusterConfig::default();
        let first = assign_clusters(&matrix, &config).unwrap();
        let second = assign_clusters(&matrix, &config).unwrap();
        assert_eq!(first, second);
    }
}
