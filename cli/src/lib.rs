//! # embedviz
//!
//! Fetches stored text embeddings, scores, clusters and projects them, and
//! renders an interactive 2D/3D scatter plot. The [`commands`] module adds
//! new texts (embedded through Ollama), searches stored texts by similarity
//! and bootstraps the pgvector schema.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Pipeline                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  RecordSource ──► parse_records ──► VectorMatrix                │
//! │                                          │                      │
//! │            ┌─────────────────────────────┼──────────────┐       │
//! │            ▼                             ▼              ▼       │
//! │   cosine similarity              k-means clusters    PCA 2D/3D │
//! │            └─────────────────────────────┼──────────────┘       │
//! │                                          ▼                      │
//! │                          compose_figure ──► export (HTML)       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use embedviz_cli::{Pipeline, PipelineConfig};
//! use embedviz_cli::commands::{insert_text, search_similar};
//! use embedviz_embeddings::OllamaProvider;
//! use embedviz_store::{DatabaseConfig, PostgresSource};
//!
//! let source = PostgresSource::new(DatabaseConfig::from_env()?);
//! let report = Pipeline::new(PipelineConfig::from_env()?).run(&source).await?;
//! println!("{}", report.output_path.display());
//!
//! let provider = OllamaProvider::from_env();
//! let id = insert_text(&provider, &source, "a new document").await?;
//! let nearest = search_similar(&provider, &source, "document", 5).await?;
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;

pub use commands::{DEFAULT_TOP_K, SearchResult, init_schema, insert_text, search_similar};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{Analysis, Pipeline, PipelineReport};
