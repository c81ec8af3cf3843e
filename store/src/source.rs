//! Record sources and stores.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, info, warn};

use embedviz_embeddings::{
    EmbeddingError, StoredRecord, euclidean_distance, format_embedding, parse_embedding,
};

use crate::config::DatabaseConfig;
use crate::error::{Result, StoreError};
use crate::schema::schema_statements;

/// Fixed query over the embeddings table. Ids and vectors are read as text
/// so integer ids and pgvector columns need no special types.
pub const FETCH_QUERY: &str = "SELECT id::text, text, embedding::text FROM text_embeddings";

/// Inserts one row; the vector is bound as text and cast by the server.
pub const INSERT_QUERY: &str = "INSERT INTO text_embeddings (text, embedding) \
     VALUES ($1, $2::text::vector) RETURNING id::text";

/// Nearest rows by L2 distance (pgvector `<->`).
pub const SEARCH_QUERY: &str = "SELECT id::text, text, embedding::text, \
     (embedding <-> $1::text::vector)::float8 AS distance \
     FROM text_embeddings \
     ORDER BY embedding <-> $1::text::vector \
     LIMIT $2";

/// Something that can produce the full record set.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Fetch every record, in storage order.
    async fn fetch_records(&self) -> Result<Vec<StoredRecord>>;
}

/// A record source that can also be written to and searched.
#[async_trait]
pub trait EmbeddingStore: RecordSource {
    /// Create the table and index for `dimension`-component vectors if they
    /// do not exist yet.
    async fn ensure_schema(&self, dimension: usize) -> Result<()>;

    /// Store `text` with its embedding and return the new row's id.
    async fn insert(&self, text: &str, embedding: &[f32]) -> Result<String>;

    /// The `top_k` rows closest to `query` by L2 distance, nearest first.
    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>>;
}

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub record: StoredRecord,

    /// L2 distance to the query vector.
    pub distance: f64,
}

/// Reads and writes records in PostgreSQL, one short-lived connection per
/// operation.
pub struct PostgresSource {
    config: DatabaseConfig,
}

/// An open connection and the task driving it.
struct Session {
    client: Client,
    driver: JoinHandle<std::result::Result<(), tokio_postgres::Error>>,
}

impl Session {
    /// Close the connection and wait for the driver to finish.
    async fn close(self) -> Result<()> {
        drop(self.client);
        if let Err(e) = self.driver.await? {
            warn!("Connection closed with error: {e}");
        }
        Ok(())
    }
}

impl PostgresSource {
    /// Create a new PostgreSQL source.
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> Result<Session> {
        debug!(
            "Connecting to {}:{}/{} as {}",
            self.config.host, self.config.port, self.config.dbname, self.config.user
        );

        let (client, connection) = self.config.to_pg_config().connect(NoTls).await?;
        Ok(Session {
            client,
            driver: tokio::spawn(connection),
        })
    }
}

#[async_trait]
impl RecordSource for PostgresSource {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn fetch_records(&self) -> Result<Vec<StoredRecord>> {
        let session = self.connect().await?;
        let rows = session.client.query(FETCH_QUERY, &[]).await;

        // Close the connection before any of the rows are processed.
        session.close().await?;

        let records = rows?
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>>>()?;

        info!("Loaded {} records from text_embeddings", records.len());
        Ok(records)
    }
}

#[async_trait]
impl EmbeddingStore for PostgresSource {
    async fn ensure_schema(&self, dimension: usize) -> Result<()> {
        let batch = schema_statements(dimension)?.join(";\n");

        let session = self.connect().await?;
        let result = session.client.batch_execute(&batch).await;
        session.close().await?;
        result?;

        info!("Ensured text_embeddings schema for vector({dimension})");
        Ok(())
    }

    async fn insert(&self, text: &str, embedding: &[f32]) -> Result<String> {
        let vector = format_embedding(embedding);

        let session = self.connect().await?;
        let row = session
            .client
            .query_one(INSERT_QUERY, &[&text, &vector])
            .await;
        session.close().await?;

        let id: String = row?.try_get(0)?;
        info!("Inserted record {id} ({} dimensions)", embedding.len());
        Ok(id)
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        let vector = format_embedding(query);
        let limit = i64::try_from(top_k).unwrap_or(i64::MAX);

        let session = self.connect().await?;
        let rows = session.client.query(SEARCH_QUERY, &[&vector, &limit]).await;
        session.close().await?;

        let hits = rows?
            .iter()
            .map(|row| -> Result<SearchHit> {
                Ok(SearchHit {
                    record: row_to_record(row)?,
                    distance: row.try_get(3)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Search returned {} of at most {top_k} rows", hits.len());
        Ok(hits)
    }
}

fn row_to_record(row: &Row) -> Result<StoredRecord> {
    let id: String = row.try_get(0)?;
    let text: Option<String> = row.try_get(1)?;
    let embedding: Option<String> = row.try_get(2)?;

    let embedding = embedding.ok_or_else(|| StoreError::NullEmbedding { id: id.clone() })?;

    Ok(StoredRecord {
        id,
        text: text.unwrap_or_default(),
        embedding,
    })
}

/// An in-memory record set with the same insert and search behavior as the
/// database.
#[derive(Debug, Default)]
pub struct InMemorySource {
    records: Mutex<Vec<StoredRecord>>,
}

impl InMemorySource {
    /// Create a source holding `records`.
    pub fn new(records: Vec<StoredRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    fn records(&self) -> MutexGuard<'_, Vec<StoredRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_records(&self) -> Result<Vec<StoredRecord>> {
        Ok(self.records().clone())
    }
}

#[async_trait]
impl EmbeddingStore for InMemorySource {
    async fn ensure_schema(&self, dimension: usize) -> Result<()> {
        schema_statements(dimension).map(|_| ())
    }

    async fn insert(&self, text: &str, embedding: &[f32]) -> Result<String> {
        let mut records = self.records();
        let next = records
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        let id = next.to_string();
        records.push(StoredRecord::new(id.clone(), text, format_embedding(embedding)));
        Ok(id)
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        let records = self.records();

        let mut hits = Vec::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            let embedding = parse_embedding(&record.embedding)?;
            if embedding.len() != query.len() {
                return Err(EmbeddingError::DimensionMismatch {
                    row,
                    expected: query.len(),
                    actual: embedding.len(),
                }
                .into());
            }
            hits.push(SearchHit {
                distance: euclidean_distance(query, &embedding),
                record: record.clone(),
            });
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(top_k);
        Ok(hits)
    }
}
