//! # Analysis
//!
//! Numerical stages that run over a stacked [`VectorMatrix`]:
//!
//! - **Clustering**: seeded k-means with the cluster count capped by row count
//! - **Projection**: PCA onto a fixed number of components, with
//!   explained-variance ratios for display
//!
//! [`VectorMatrix`]: embedviz_embeddings::VectorMatrix

pub mod cluster;
pub mod error;
pub mod reduce;

pub use cluster::{ClusterConfig, Clustering, assign_clusters};
pub use error::{AnalysisError, Result};
pub use reduce::{Projection, project};
