//! Error types for ScopeRAG.
//!
//! A single error enum covers every failure category in the pipeline:
//! configuration, ingestion, retrieval, embedding, and generation.
//! Timeouts and empty results are distinct outcomes; callers must be able
//! to tell "nothing matched" apart from "the dependency never answered".

use thiserror::Error;

/// Unified error type for the ScopeRAG pipeline.
///
/// All library functions return `Result<T, AppError>`. We never panic;
/// errors are represented and propagated with `?`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors. Fatal at startup; the process must not serve
    /// queries in this state.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required path (e.g. the corpus root) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Generator (LLM) provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Vector index storage errors
    #[error("Index error: {0}")]
    Index(String),

    /// An ingestion batch failed after some chunks were committed.
    ///
    /// Upsert is idempotent per chunk id, so re-running the full ingestion
    /// is always safe.
    #[error("Ingestion aborted after {indexed} chunks were indexed: {reason}")]
    PartialIngestion { indexed: usize, reason: String },

    /// Documents were discovered under partitions no role can read.
    /// Ingestion refuses to index them rather than making them silently
    /// unretrievable.
    #[error("Partitions not mapped by any role: {0:?}")]
    UnmappedPartitions(Vec<String>),

    /// The embedding call did not answer within the configured deadline.
    /// Distinct from an empty result set.
    #[error("Retrieval timed out after {0}ms")]
    RetrievalTimeout(u64),

    /// The generator errored or timed out. Carries the context and the
    /// citation list that were about to be sent, so the caller can retry
    /// generation without re-querying the index.
    #[error("Generation failed: {message}")]
    Generation {
        message: String,
        context: String,
        sources: Vec<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
