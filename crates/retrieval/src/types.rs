//! Retrieval pipeline type definitions.

use serde::{Deserialize, Serialize};

/// A normalized source document produced by the loader.
///
/// One per discovered file; discarded after chunking.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Partition (department) the file was discovered under
    pub partition: String,

    /// Source file name, unique within its partition
    pub source_id: String,

    /// Normalized text content
    pub text: String,

    /// True if a tabular source was cut at the row cap
    pub truncated: bool,
}

/// An addressable window of a source document, the atomic unit of indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic identifier; re-ingesting the same source overwrites
    /// rather than duplicates.
    pub id: String,

    /// Partition the source belongs to
    pub partition: String,

    /// Source file name
    pub source_id: String,

    /// Window position within the source, starting at 0
    pub ordinal: u32,

    /// Window text
    pub text: String,
}

impl Chunk {
    /// Derive the chunk id from its identity triple.
    pub fn derive_id(partition: &str, source_id: &str, ordinal: u32) -> String {
        format!("{}::{}::chunk-{}", partition, source_id, ordinal)
    }

    /// Build a chunk, deriving its id.
    pub fn new(partition: &str, source_id: &str, ordinal: u32, text: String) -> Self {
        Self {
            id: Self::derive_id(partition, source_id, ordinal),
            partition: partition.to_string(),
            source_id: source_id.to_string(),
            ordinal,
            text,
        }
    }
}

/// A scored chunk returned by the vector index. Ephemeral, per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub chunk_id: String,
    pub text: String,
    pub partition: String,
    pub source_id: String,
    pub ordinal: u32,
    /// Cosine similarity to the query, higher is closer
    pub score: f32,
}

/// A `(source, chunk ordinal)` reference attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source_id: String,
    pub ordinal: u32,
}

impl Citation {
    /// Render as `source_id#chunk-N`.
    pub fn label(&self) -> String {
        format!("{}#chunk-{}", self.source_id, self.ordinal)
    }
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Number of source files discovered and indexed
    pub sources_count: u32,

    /// Number of chunks upserted into the index
    pub chunks_indexed: u32,

    /// Sources whose tabular content was cut at the row cap
    pub truncated_sources: Vec<String>,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Knobs for the answer operation.
#[derive(Debug, Clone)]
pub struct AnswerOptions {
    /// Number of chunks to retrieve
    pub top_k: usize,

    /// Maximum tokens the generator may produce
    pub max_tokens: u32,

    /// Generator sampling temperature
    pub temperature: f32,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_tokens: 300,
            temperature: 0.2,
        }
    }
}

/// The packaged result of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generator output, verbatim
    pub answer: String,

    /// Deduplicated citation labels, first-seen order
    pub sources: Vec<String>,

    /// How many chunks were retrieved (observability, not sent to the
    /// generator)
    pub retrieved_count: usize,
}

/// Counts reported by the index maintenance operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub sources_count: u32,
    pub chunks_count: u32,
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_is_deterministic() {
        let a = Chunk::new("finance", "q4.md", 2, "text".to_string());
        let b = Chunk::new("finance", "q4.md", 2, "other text".to_string());
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, "finance::q4.md::chunk-2");
    }

    #[test]
    fn test_citation_label() {
        let citation = Citation {
            source_id: "handbook.md".to_string(),
            ordinal: 0,
        };
        assert_eq!(citation.label(), "handbook.md#chunk-0");
        assert_eq!(citation.to_string(), "handbook.md#chunk-0");
    }
}
