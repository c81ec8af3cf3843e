//! The end-to-end visualization pipeline.

use std::path::PathBuf;

use tracing::{debug, info};

use embedviz_analysis::{Clustering, assign_clusters, project};
use embedviz_embeddings::{
    Record, VectorMatrix, average_similarity, cosine_similarity_matrix, parse_records,
};
use embedviz_report::{PlotPoint, VarianceSummary, compose_figure, export, truncate_text};
use embedviz_store::RecordSource;

use crate::config::PipelineConfig;
use crate::error::Result;

/// Everything derived from a record set, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// One point per record, in record order.
    pub points: Vec<PlotPoint>,

    /// Explained-variance ratios of both projections.
    pub variance: VarianceSummary,

    /// Cluster assignment.
    pub clustering: Clustering,

    /// `(records, dimension)` of the vector matrix.
    pub shape: (usize, usize),
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub analysis: Analysis,

    /// Where the HTML page was written.
    pub output_path: PathBuf,
}

/// Loads, analyzes, renders and exports embeddings.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run every stage against `source`.
    pub async fn run(&self, source: &dyn RecordSource) -> Result<PipelineReport> {
        info!("Fetching records from {}", source.name());
        let stored = source.fetch_records().await?;
        let records = parse_records(stored)?;

        let analysis = self.analyze(&records)?;

        let figure = compose_figure(&analysis.points, &analysis.variance);
        let output_path = export(&figure, &self.config.export)?;

        Ok(PipelineReport {
            analysis,
            output_path,
        })
    }

    /// Derive similarity scores, clusters and projections for `records`.
    ///
    /// Fails on an empty record set before any clustering or projection.
    pub fn analyze(&self, records: &[Record]) -> Result<Analysis> {
        let embeddings: Vec<_> = records.iter().map(|r| r.embedding.clone()).collect();
        let matrix = VectorMatrix::stack(&embeddings)?;
        let shape = matrix.shape();
        info!("Analyzing {} vectors of dimension {}", shape.0, shape.1);

        let similarity = cosine_similarity_matrix(&matrix);
        let scores = average_similarity(&similarity);
        drop(similarity);

        let clustering = assign_clusters(&matrix, &self.config.cluster)?;

        let projection_2d = project(&matrix, 2);
        let projection_3d = project(&matrix, 3);
        debug!(
            "Explained variance: 2D {:?}, 3D {:?}",
            projection_2d.explained_variance_ratio, projection_3d.explained_variance_ratio
        );

        let xs = projection_2d.column(0);
        let ys = projection_2d.column(1);
        let zs = projection_3d.column(2);

        let points = records
            .iter()
            .enumerate()
            .map(|(i, record)| PlotPoint {
                id: record.id.clone(),
                display_text: truncate_text(&record.text, self.config.label_max_len),
                similarity_score: scores[i],
                cluster: clustering.labels[i],
                x: xs[i],
                y: ys[i],
                z: zs[i],
            })
            .collect();

        Ok(Analysis {
            points,
            variance: VarianceSummary {
                two_d: projection_2d.explained_variance_ratio,
                three_d: projection_3d.explained_variance_ratio,
            },
            clustering,
            shape,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedviz_embeddings::EmbeddingError;
    use pretty_assertions::assert_eq;

    use crate::error::PipelineError;

    fn record(id: usize, embedding: Vec<f32>) -> Record {
        Record {
            id: id.to_string(),
            text: format!("record number {id} with a fairly long description attached"),
            embedding,
        }
    }

    #[test]
    fn test_empty_input_fails_before_analysis() {
        let err = Pipeline::new(PipelineConfig::default())
            .analyze(&[])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Embedding(EmbeddingError::EmptyInput)
        ));
    }

    #[test]
    fn test_two_records() {
        let records = vec![record(1, vec![1.0, 0.0, 0.5]), record(2, vec![0.0, 1.0, 0.5])];
        let analysis = Pipeline::new(PipelineConfig::default())
            .analyze(&records)
            .unwrap();

        assert_eq!(analysis.shape, (2, 3));
        assert_eq!(analysis.clustering.n_clusters, 2);
        assert_eq!(analysis.points[0].similarity_score, analysis.points[1].similarity_score);
        // Only one direction carries variance between two points.
        assert_eq!(analysis.variance.three_d.len(), 1);
        assert!(analysis.points.iter().all(|p| p.z == 0.0 && p.y == 0.0));
    }

    #[test]
    fn test_labels_are_truncated() {
        let records = vec![record(1, vec![1.0, 2.0]), record(2, vec![2.0, 1.0])];
        let analysis = Pipeline::new(PipelineConfig::default())
            .analyze(&records)
            .unwrap();
        for point in &analysis.points {
            assert!(point.display_text.chars().count() <= 30);
            assert!(point.display_text.ends_with("..."));
        }
    }
}
