use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use embedviz_cli::{
    DEFAULT_TOP_K, Pipeline, PipelineConfig, init_schema, insert_text, search_similar,
};
use embedviz_embeddings::{EmbeddingProvider, OllamaProvider};
use embedviz_embeddings::provider::DEFAULT_DIMENSION;
use embedviz_store::{DatabaseConfig, PostgresSource};

/// Visualize, insert and search text embeddings stored in PostgreSQL.
#[derive(Debug, Parser)]
#[command(name = "embedviz", version)]
struct Cli {
    /// Defaults to `visualize`.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq)]
enum Command {
    /// Render every stored embedding as an interactive 2D/3D scatter plot.
    Visualize,

    /// Create the pgvector extension, table and index.
    Init {
        /// Vector dimension of the embedding column.
        #[arg(long, default_value_t = DEFAULT_DIMENSION)]
        dimension: usize,
    },

    /// Embed a text with Ollama and store it.
    Insert {
        /// Text to embed and store.
        text: String,
    },

    /// Find the stored texts nearest to a query.
    Search {
        /// Query text.
        query: String,

        /// Number of results.
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
}

fn ollama() -> OllamaProvider {
    let provider = OllamaProvider::from_env();
    debug!("Embedding with {} at {}", provider.model(), provider.base_url());
    provider
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env before the subscriber so RUST_LOG can come from it.
    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Ignoring unreadable .env file: {e}"),
    }

    let database = DatabaseConfig::from_env().context("loading database configuration")?;
    debug!("Database configuration: {database:?}");
    let store = PostgresSource::new(database);

    match cli.command.unwrap_or(Command::Visualize) {
        Command::Visualize => {
            let config = PipelineConfig::from_env().context("loading pipeline configuration")?;
            let report = Pipeline::new(config)
                .run(&store)
                .await
                .context("visualization pipeline failed")?;
            println!("Visualization saved to {}", report.output_path.display());
        }
        Command::Init { dimension } => {
            init_schema(&store, dimension)
                .await
                .context("creating schema")?;
            println!("Schema ready for vector({dimension})");
        }
        Command::Insert { text } => {
            let provider = ollama();
            let id = insert_text(&provider, &store, &text)
                .await
                .context("inserting text")?;
            println!("Stored record {id}");
        }
        Command::Search { query, top_k } => {
            let provider = ollama();
            let results = search_similar(&provider, &store, &query, top_k)
                .await
                .context("searching stored texts")?;
            for result in &results {
                println!(
                    "{:>8.4}  {:>8.4}  [{}] {}",
                    result.similarity,
                    result.hit.distance,
                    result.hit.record.id,
                    result.hit.record.text
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_arguments_visualizes() {
        let cli = Cli::try_parse_from(["embedviz"]).unwrap();
        assert_eq!(cli.command, None);

        let cli = Cli::try_parse_from(["embedviz", "visualize"]).unwrap();
        assert_eq!(cli.command, Some(Command::Visualize));
    }

    #[test]
    fn test_subcommand_arguments() {
        let cli = Cli::try_parse_from(["embedviz", "init"]).unwrap();
        assert_eq!(cli.command, Some(Command::Init { dimension: 768 }));

        let cli = Cli::try_parse_from(["embedviz", "insert", "hello world"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Insert {
                text: "hello world".to_string()
            })
        );

        let cli = Cli::try_parse_from(["embedviz", "search", "hello", "-k", "3"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Search {
                query: "hello".to_string(),
                top_k: 3
            })
        );
    }

    #[test]
    fn test_insert_requires_text() {
        assert!(Cli::try_parse_from(["embedviz", "insert"]).is_err());
    }
}
