//! Role-scoped retrieval pipeline for ScopeRAG.
//!
//! Documents are discovered from partition directories, chunked, embedded,
//! and stored in a durable vector index. Queries are scoped to the
//! partitions the caller's role is allowed to read before any similarity
//! search runs, and answers carry citations back to the chunks they came
//! from.

pub mod answer;
pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod loader;
pub mod pipeline;
pub mod policy;
pub mod retrieve;
pub mod types;

pub use answer::{AnswerAssembler, NO_MATCH_ANSWER};
pub use config::{RetrievalConfig, CONFIG_FILE, INDEX_FILE};
pub use index::VectorIndex;
pub use pipeline::Pipeline;
pub use policy::{AccessPolicy, PartitionSet, GENERAL_PARTITION};
pub use retrieve::{RetrievedContext, Retriever};
pub use types::{
    Answer, AnswerOptions, Chunk, Citation, IndexStats, IngestStats, RetrievalResult,
};

#[cfg(test)]
mod tests;
