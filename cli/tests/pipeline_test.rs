//! End-to-end tests for the visualization pipeline.
//!
//! These run every stage against an in-memory record source and write the
//! report into a temporary directory.

use std::path::Path;

use embedviz_cli::{Pipeline, PipelineConfig, PipelineError};
use embedviz_embeddings::{EmbeddingError, StoredRecord};
use embedviz_report::{DEFAULT_OUTPUT_FILE, ExportConfig};
use embedviz_store::InMemorySource;
use pretty_assertions::assert_eq;

/// Config that writes into `dir` and never opens a browser.
fn config_for(dir: &Path) -> PipelineConfig {
    PipelineConfig::default().with_export(
        ExportConfig::default()
            .with_output_path(dir.join(DEFAULT_OUTPUT_FILE))
            .with_open_browser(false),
    )
}

/// Ten 8-dimensional records spread over a few directions.
fn ten_records() -> Vec<StoredRecord> {
    (0..10)
        .map(|i| {
            let values: Vec<String> = (0..8)
                .map(|j| {
                    let v = ((i * 3 + j * 5) % 7) as f32 * 0.5 - 1.0 + (i % 5) as f32 * (j as f32);
                    format!("{v}")
                })
                .collect();
            StoredRecord::new(
                format!("{}", i + 1),
                format!("Sample document {i} about topic {}", i % 5),
                format!("[{}]", values.join(",")),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_ten_records_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let source = InMemorySource::new(ten_records());

    let report = Pipeline::new(config_for(dir.path()))
        .run(&source)
        .await
        .unwrap();

    let analysis = &report.analysis;
    assert_eq!(analysis.shape, (10, 8));
    assert_eq!(analysis.points.len(), 10);
    assert_eq!(analysis.clustering.n_clusters, 5);
    assert!(analysis.clustering.distinct_labels() <= 5);
    assert_eq!(analysis.variance.two_d.len(), 2);
    assert_eq!(analysis.variance.three_d.len(), 3);
    assert!(analysis.points.iter().any(|p| p.z != 0.0));

    let ids: Vec<_> = analysis.points.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);

    assert_eq!(report.output_path, dir.path().join(DEFAULT_OUTPUT_FILE));
    let html = std::fs::read_to_string(&report.output_path).unwrap();
    assert!(html.contains("Vector Space Visualization of Text Embeddings"));
    assert!(html.contains("Explained variance"));
    assert!(html.contains("Sample document 3"));
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config_for(dir.path()));
    let source = InMemorySource::new(ten_records());

    let first = pipeline.run(&source).await.unwrap();
    let first_html = std::fs::read_to_string(&first.output_path).unwrap();
    let second = pipeline.run(&source).await.unwrap();
    let second_html = std::fs::read_to_string(&second.output_path).unwrap();

    assert_eq!(first.analysis, second.analysis);
    assert_eq!(first_html, second_html);
}

#[tokio::test]
async fn test_empty_table_fails_at_stacking() {
    let dir = tempfile::tempdir().unwrap();
    let source = InMemorySource::new(Vec::new());

    let err = Pipeline::new(config_for(dir.path()))
        .run(&source)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Embedding(EmbeddingError::EmptyInput)
    ));
    assert!(!dir.path().join(DEFAULT_OUTPUT_FILE).exists());
}

#[tokio::test]
async fn test_malformed_embedding_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut records = ten_records();
    records[4].embedding = "[1, 2, __import__('os')]".to_string();
    let source = InMemorySource::new(records);

    let err = Pipeline::new(config_for(dir.path()))
        .run(&source)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("record 5"));
    assert!(!dir.path().join(DEFAULT_OUTPUT_FILE).exists());
}

#[tokio::test]
async fn test_inconsistent_dimensions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = InMemorySource::new(vec![
        StoredRecord::new("1", "a", "[1.0, 2.0, 3.0]"),
        StoredRecord::new("2", "b", "[1.0, 2.0]"),
    ]);

    let err = Pipeline::new(config_for(dir.path()))
        .run(&source)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Embedding(EmbeddingError::DimensionMismatch { row: 1, .. })
    ));
}
