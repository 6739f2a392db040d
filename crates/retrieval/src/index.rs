//! SQLite-backed vector index.
//!
//! Stores chunk text, embeddings, and partition metadata in a single
//! database file, so `(chunk_id, embedding, metadata, text)` round-trips
//! across process restarts. Upserts key on the deterministic chunk id;
//! re-ingesting a source overwrites its chunks instead of duplicating
//! them.
//!
//! The embedding dimension (and model name) are pinned in the database the
//! first time it is opened. Reopening with a different dimension or model
//! is refused: mixing embedding versions without re-indexing produces
//! meaningless similarity scores.

use crate::embeddings::EmbeddingProvider;
use crate::policy::PartitionSet;
use crate::types::{Chunk, IndexStats, RetrievalResult};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection};
use scoperag_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Chunks embedded per upsert batch; bounds peak memory when the embedding
/// provider is remote.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// The vector index.
///
/// Queries and upserts may interleave from concurrent tasks; row
/// replacement is atomic per chunk id, so a reader observes either the
/// pre- or post-upsert state for any given id.
pub struct VectorIndex {
    conn: Mutex<Connection>,
    path: PathBuf,
    dimension: usize,
    batch_size: usize,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("path", &self.path)
            .field("dimension", &self.dimension)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl VectorIndex {
    /// Open (or create) the index at `path`, pinning the embedding
    /// dimension and model.
    pub fn open(
        path: &Path,
        dimension: usize,
        model: &str,
        batch_size: usize,
    ) -> AppResult<Self> {
        if dimension == 0 {
            return Err(AppError::Config(
                "embedding dimension must be non-zero".to_string(),
            ));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Index(format!("Failed to open index at {:?}: {}", path, e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS index_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sources (
                id TEXT PRIMARY KEY,
                partition TEXT NOT NULL,
                source_id TEXT NOT NULL,
                chunk_count INTEGER NOT NULL,
                truncated INTEGER NOT NULL,
                ingested_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                partition TEXT NOT NULL,
                source_id TEXT NOT NULL,
                ordinal INTEGER NOT NULL,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_partition ON chunks(partition);
            "#,
        )
        .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))?;

        pin_meta(&conn, "dimension", &dimension.to_string())?;
        pin_meta(&conn, "embedding_model", model)?;

        tracing::debug!("Opened vector index at {:?} (dim {})", path, dimension);

        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
            dimension,
            batch_size: batch_size.max(1),
        })
    }

    /// Embedding dimension this index was pinned to.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed and store chunks, keyed by chunk id.
    ///
    /// Batches are processed sequentially. A failure aborts the call with
    /// [`AppError::PartialIngestion`] carrying how many chunks were
    /// committed before it; re-running the full upsert is safe because ids
    /// collide rather than duplicate.
    pub async fn upsert(
        &self,
        chunks: &[Chunk],
        embedder: &dyn EmbeddingProvider,
    ) -> AppResult<usize> {
        let mut indexed = 0usize;

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = embedder.embed_batch(&texts).await.map_err(|e| {
                AppError::PartialIngestion {
                    indexed,
                    reason: e.to_string(),
                }
            })?;

            for (chunk, embedding) in batch.iter().zip(embeddings.iter()) {
                if embedding.len() != self.dimension {
                    return Err(AppError::PartialIngestion {
                        indexed,
                        reason: format!(
                            "embedding dimension {} does not match index dimension {}",
                            embedding.len(),
                            self.dimension
                        ),
                    });
                }

                let conn = self.lock()?;
                conn.execute(
                    "INSERT OR REPLACE INTO chunks (id, partition, source_id, ordinal, text, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        chunk.id,
                        chunk.partition,
                        chunk.source_id,
                        chunk.ordinal as i64,
                        chunk.text,
                        embedding_to_bytes(embedding),
                    ],
                )
                .map_err(|e| AppError::PartialIngestion {
                    indexed,
                    reason: format!("failed to insert chunk {}: {}", chunk.id, e),
                })?;
                drop(conn);

                indexed += 1;
            }

            tracing::debug!("Upserted batch, {} chunks committed so far", indexed);
        }

        Ok(indexed)
    }

    /// Record a source row for bookkeeping (counts, truncation flag).
    pub fn record_source(
        &self,
        partition: &str,
        source_id: &str,
        chunk_count: u32,
        truncated: bool,
    ) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO sources (id, partition, source_id, chunk_count, truncated, ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                format!("{}::{}", partition, source_id),
                partition,
                source_id,
                chunk_count as i64,
                truncated as i64,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Index(format!("Failed to record source: {}", e)))?;
        Ok(())
    }

    /// Top-k nearest chunks within the allowed partitions, by descending
    /// cosine similarity.
    ///
    /// The partition filter is mandatory and non-empty by construction;
    /// there is no unfiltered query surface. An empty result set is not an
    /// error.
    pub fn query(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        allowed: &PartitionSet,
    ) -> AppResult<Vec<RetrievalResult>> {
        if query_embedding.len() != self.dimension {
            return Err(AppError::Embedding(format!(
                "query embedding has {} dimensions, index expects {}",
                query_embedding.len(),
                self.dimension
            )));
        }

        let placeholders = vec!["?"; allowed.len()].join(", ");
        let sql = format!(
            "SELECT id, partition, source_id, ordinal, text, embedding
             FROM chunks WHERE partition IN ({})",
            placeholders
        );

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params_from_iter(allowed.iter()), |row| {
                let embedding_bytes: Vec<u8> = row.get(5)?;
                Ok((
                    RetrievalResult {
                        chunk_id: row.get(0)?,
                        partition: row.get(1)?,
                        source_id: row.get(2)?,
                        ordinal: row.get::<_, i64>(3)? as u32,
                        text: row.get(4)?,
                        score: 0.0,
                    },
                    embedding_bytes,
                ))
            })
            .map_err(|e| AppError::Index(format!("Failed to query chunks: {}", e)))?;

        let mut results: Vec<RetrievalResult> = Vec::new();
        for row in rows {
            let (mut result, embedding_bytes) =
                row.map_err(|e| AppError::Index(format!("Failed to read chunk row: {}", e)))?;
            let embedding = bytes_to_embedding(&embedding_bytes)?;
            result.score = cosine_similarity(query_embedding, &embedding);
            results.push(result);
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        tracing::debug!(
            "Query over {} partitions returned {} results (top-{})",
            allowed.len(),
            results.len(),
            top_k
        );

        Ok(results)
    }

    /// Source and chunk counts plus the database size on disk.
    pub fn stats(&self) -> AppResult<IndexStats> {
        let conn = self.lock()?;
        let sources_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sources", [], |row| row.get(0))
            .map_err(|e| AppError::Index(format!("Failed to count sources: {}", e)))?;
        let chunks_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(|e| AppError::Index(format!("Failed to count chunks: {}", e)))?;
        drop(conn);

        let db_size_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        Ok(IndexStats {
            sources_count: sources_count as u32,
            chunks_count: chunks_count as u32,
            db_size_bytes,
        })
    }

    /// Delete all indexed data, keeping the pinned metadata.
    pub fn reset(&self) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM chunks", [])
            .map_err(|e| AppError::Index(format!("Failed to delete chunks: {}", e)))?;
        conn.execute("DELETE FROM sources", [])
            .map_err(|e| AppError::Index(format!("Failed to delete sources: {}", e)))?;
        tracing::info!("Reset vector index");
        Ok(())
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Index("index lock poisoned".to_string()))
    }
}

/// Store a meta key, or verify it matches what was stored before.
fn pin_meta(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT value FROM index_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(AppError::Index(format!("Failed to read meta: {}", other))),
        })?;

    match existing {
        Some(stored) if stored != value => Err(AppError::Config(format!(
            "index {} is '{}' but configuration says '{}'; re-index from scratch to change it",
            key, stored, value
        ))),
        Some(_) => Ok(()),
        None => {
            conn.execute(
                "INSERT INTO index_meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| AppError::Index(format!("Failed to pin meta: {}", e)))?;
            Ok(())
        }
    }
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::MockProvider;
    use tempfile::TempDir;

    fn open_index(dir: &TempDir, dim: usize) -> VectorIndex {
        VectorIndex::open(&dir.path().join("index.sqlite"), dim, "token-hash-v1", 8).unwrap()
    }

    fn all_partitions() -> PartitionSet {
        PartitionSet::new(vec!["finance".to_string(), "general".to_string()]).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_and_query_round_trip() {
        let temp = TempDir::new().unwrap();
        let index = open_index(&temp, 64);
        let embedder = MockProvider::new(64);

        let chunks = vec![
            Chunk::new("finance", "q4.md", 0, "quarterly revenue grew".to_string()),
            Chunk::new("general", "handbook.md", 0, "vacation policy".to_string()),
        ];
        let indexed = index.upsert(&chunks, &embedder).await.unwrap();
        assert_eq!(indexed, 2);

        let query = embedder.embed("quarterly revenue").await.unwrap();
        let results = index.query(&query, 5, &all_partitions()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk_id, "finance::q4.md::chunk-0");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let index = open_index(&temp, 64);
        let embedder = MockProvider::new(64);

        let chunks = vec![
            Chunk::new("finance", "q4.md", 0, "first window".to_string()),
            Chunk::new("finance", "q4.md", 1, "second window".to_string()),
        ];

        index.upsert(&chunks, &embedder).await.unwrap();
        index.upsert(&chunks, &embedder).await.unwrap();

        let stats = index.stats().unwrap();
        assert_eq!(stats.chunks_count, 2);
    }

    #[tokio::test]
    async fn test_partition_filter_is_hard() {
        let temp = TempDir::new().unwrap();
        let index = open_index(&temp, 64);
        let embedder = MockProvider::new(64);

        let chunks = vec![
            Chunk::new("finance", "q4.md", 0, "quarterly revenue numbers".to_string()),
            Chunk::new("general", "handbook.md", 0, "office hours".to_string()),
        ];
        index.upsert(&chunks, &embedder).await.unwrap();

        // Query text matches the finance chunk best, but the filter only
        // allows general.
        let query = embedder.embed("quarterly revenue numbers").await.unwrap();
        let general = PartitionSet::new(vec!["general".to_string()]).unwrap();
        let results = index.query(&query, 5, &general).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].partition, "general");
    }

    #[tokio::test]
    async fn test_empty_filter_match_returns_empty_not_error() {
        let temp = TempDir::new().unwrap();
        let index = open_index(&temp, 64);
        let embedder = MockProvider::new(64);

        let chunks = vec![Chunk::new("finance", "q4.md", 0, "numbers".to_string())];
        index.upsert(&chunks, &embedder).await.unwrap();

        let query = embedder.embed("numbers").await.unwrap();
        let hr_only = PartitionSet::new(vec!["hr".to_string()]).unwrap();
        let results = index.query(&query, 5, &hr_only).unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.sqlite");
        let embedder = MockProvider::new(64);

        {
            let index = VectorIndex::open(&path, 64, "token-hash-v1", 8).unwrap();
            let chunks = vec![Chunk::new("general", "doc.md", 0, "persisted text".to_string())];
            index.upsert(&chunks, &embedder).await.unwrap();
        }

        let reopened = VectorIndex::open(&path, 64, "token-hash-v1", 8).unwrap();
        let query = embedder.embed("persisted text").await.unwrap();
        let general = PartitionSet::new(vec!["general".to_string()]).unwrap();
        let results = reopened.query(&query, 5, &general).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "persisted text");
    }

    #[test]
    fn test_reopen_with_different_dimension_refused() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.sqlite");

        VectorIndex::open(&path, 64, "token-hash-v1", 8).unwrap();
        let result = VectorIndex::open(&path, 128, "token-hash-v1", 8);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_reopen_with_different_model_refused() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.sqlite");

        VectorIndex::open(&path, 64, "token-hash-v1", 8).unwrap();
        let result = VectorIndex::open(&path, 64, "nomic-embed-text", 8);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_reported_as_partial() {
        let temp = TempDir::new().unwrap();
        let index = open_index(&temp, 64);
        // Embedder that disagrees with the index dimension.
        let embedder = MockProvider::new(32);

        let chunks = vec![Chunk::new("general", "doc.md", 0, "text".to_string())];
        match index.upsert(&chunks, &embedder).await {
            Err(AppError::PartialIngestion { indexed, reason }) => {
                assert_eq!(indexed, 0);
                assert!(reason.contains("dimension"));
            }
            other => panic!("expected PartialIngestion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_embedding_dimension_checked() {
        let temp = TempDir::new().unwrap();
        let index = open_index(&temp, 64);

        let wrong = vec![0.5f32; 32];
        let result = index.query(&wrong, 5, &all_partitions());
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_reset_clears_data() {
        let temp = TempDir::new().unwrap();
        let index = open_index(&temp, 64);
        let embedder = MockProvider::new(64);

        let chunks = vec![Chunk::new("general", "doc.md", 0, "text".to_string())];
        index.upsert(&chunks, &embedder).await.unwrap();
        index.record_source("general", "doc.md", 1, false).unwrap();

        index.reset().unwrap();
        let stats = index.stats().unwrap();
        assert_eq!(stats.chunks_count, 0);
        assert_eq!(stats.sources_count, 0);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
