//! PCA projection for visualization.
//!
//! Principal axes are the eigenvectors of whichever of `XᵀX` (D x D) and
//! `XXᵀ` (N x N) is smaller, where `X` is the centered matrix. Both share
//! their non-zero eigenvalues, so the Gram form keeps the decomposition at
//! O(N³) when there are fewer rows than dimensions, which is the usual case
//! for text embeddings.
//!
//! The decomposition is a cyclic Jacobi sweep over the full symmetric
//! kernel. It returns every eigenpair at once, so the leading components are
//! found regardless of how close their eigenvalues are, and it involves no
//! random start.

use ndarray::{Array1, Array2, Axis};
use tracing::{debug, warn};

use embedviz_embeddings::VectorMatrix;

const MAX_SWEEPS: usize = 100;
/// Off-diagonal mass, relative to the kernel's squared Frobenius norm, at
/// which the decomposition is considered converged.
const CONVERGENCE: f64 = 1e-24;
/// Eigenvalues below this fraction of the total variance are treated as zero.
const RELATIVE_EPSILON: f64 = 1e-10;

/// Result of projecting a matrix onto its principal components.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// `N x n_components` coordinates; unavailable components are zero.
    pub coordinates: Array2<f64>,

    /// Variance captured by each available component.
    pub explained_variance: Vec<f64>,

    /// Fraction of total variance captured by each available component.
    pub explained_variance_ratio: Vec<f64>,

    /// Unit principal axes, one row per available component.
    pub components: Array2<f64>,
}

impl Projection {
    /// Number of requested components (coordinate columns).
    pub fn n_components(&self) -> usize {
        self.coordinates.ncols()
    }

    /// Number of components that carry variance.
    pub fn n_available(&self) -> usize {
        self.explained_variance_ratio.len()
    }

    /// Coordinates along one component, in row order.
    pub fn column(&self, component: usize) -> Vec<f64> {
        self.coordinates.column(component).to_vec()
    }
}

/// Project `matrix` onto its first `n_components` principal components.
///
/// At most `min(N, D)` components are available, and fewer when the data
/// is degenerate. Coordinates for the missing components are zero-filled
/// and a warning is logged.
pub fn project(matrix: &VectorMatrix, n_components: usize) -> Projection {
    let records = matrix.records();
    let (n, d) = records.dim();

    let mean = records
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(d));
    let centered = records - &mean;
    let total: f64 = centered.iter().map(|v| v * v).sum();

    let use_gram = n <= d;
    let kernel = if use_gram {
        centered.dot(&centered.t())
    } else {
        centered.t().dot(&centered)
    };

    let (values, vectors) = symmetric_eigen(kernel);

    let mut order: Vec<usize> = (0..values.len()).collect();
    // Stable sort keeps ties in index order.
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let limit = n_components.min(n).min(d);
    let pairs: Vec<(f64, Array1<f64>)> = order
        .into_iter()
        .take(limit)
        .take_while(|&k| values[k] > RELATIVE_EPSILON * total)
        .map(|k| {
            let value = values[k];
            let vector = vectors.column(k);
            let mut axis = if use_gram {
                centered.t().dot(&vector) / value.sqrt()
            } else {
                vector.to_owned()
            };
            normalize(&mut axis);
            orient(&mut axis);
            (value, axis)
        })
        .collect();

    let available = pairs.len();
    if available < n_components {
        warn!(
            "Only {available} of {n_components} principal components carry variance; \
             zero-filling the remaining coordinates"
        );
    }

    let mut coordinates = Array2::<f64>::zeros((n, n_components));
    let mut components = Array2::<f64>::zeros((available, d));
    for (k, (_, axis)) in pairs.iter().enumerate() {
        coordinates.column_mut(k).assign(&centered.dot(axis));
        components.row_mut(k).assign(axis);
    }

    let explained_variance = pairs
        .iter()
        .map(|(value, _)| if n > 1 { value / (n - 1) as f64 } else { 0.0 })
        .collect();
    let explained_variance_ratio = pairs
        .iter()
        .map(|(value, _)| (value / total).clamp(0.0, 1.0))
        .collect();

    debug!(
        "Projected {n}x{d} matrix onto {n_components} components ({available} available, {} form)",
        if use_gram { "gram" } else { "covariance" }
    );

    Projection {
        coordinates,
        explained_variance,
        explained_variance_ratio,
        components,
    }
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns the eigenvalues and a matrix whose columns are the matching unit
/// eigenvectors, both in diagonal order (unsorted).
fn symmetric_eigen(mut a: Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let m = a.nrows();
    let mut v = Array2::<f64>::eye(m);
    let norm: f64 = a.iter().map(|x| x * x).sum();

    for sweep in 0..MAX_SWEEPS {
        let off = off_diagonal_mass(&a);
        if off <= CONVERGENCE * norm {
            debug!("Jacobi converged after {sweep} sweeps");
            break;
        }

        for p in 0..m {
            for q in (p + 1)..m {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }

                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..m {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..m {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..m {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_vec(), v)
}

fn off_diagonal_mass(a: &Array2<f64>) -> f64 {
    a.indexed_iter()
        .filter(|((i, j), _)| i != j)
        .map(|(_, x)| x * x)
        .sum()
}

fn normalize(v: &mut Array1<f64>) {
    let norm = v.dot(v).sqrt();
    if norm > 0.0 {
        *v /= norm;
    }
}

/// Flip the axis so its largest-magnitude loading is positive.
fn orient(axis: &mut Array1<f64>) {
    let pivot = axis
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        axis.mapv_inplace(|x| -x);
    }
}
