//! Retrieval coordination: role scoping, query embedding, and context
//! assembly.
//!
//! The retriever is the only path from a question to the vector index. It
//! resolves the caller's role to a partition set before anything else
//! happens, so there is no code path that searches unscoped.

use crate::embeddings::EmbeddingProvider;
use crate::index::VectorIndex;
use crate::policy::{AccessPolicy, PartitionSet};
use crate::types::{Citation, RetrievalResult};
use scoperag_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Default wall-clock budget for embedding the query and searching, in
/// seconds.
pub const DEFAULT_RETRIEVAL_TIMEOUT_SECS: u64 = 30;

/// Retrieved context packaged for the generator.
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    /// Labeled chunk blocks joined with separators; empty when nothing
    /// matched.
    pub context: String,

    /// Deduplicated citations in first-seen (descending score) order.
    pub citations: Vec<Citation>,

    /// Number of chunks retrieved.
    pub retrieved_count: usize,
}

impl RetrievedContext {
    pub fn is_empty(&self) -> bool {
        self.retrieved_count == 0
    }
}

/// Coordinates a role-scoped similarity search.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    policy: AccessPolicy,
    timeout: Duration,
}

impl Retriever {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            index,
            embedder,
            policy,
            timeout: Duration::from_secs(DEFAULT_RETRIEVAL_TIMEOUT_SECS),
        }
    }

    /// Override the retrieval timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The embedding provider queries go through. Ingestion must use the
    /// same one.
    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    /// The partitions `role` is allowed to read. Unknown roles scope to
    /// general.
    pub fn scope_for(&self, role: &str) -> PartitionSet {
        self.policy.allowed_partitions(role)
    }

    /// Retrieve the top-k chunks for `question`, visible to `role`.
    ///
    /// Results are returned in descending similarity order, unchanged; no
    /// score floor is applied. Relevance judgment belongs to the caller's
    /// prompt, not a magic threshold here. An empty result is a normal
    /// outcome, not an error.
    pub async fn retrieve(
        &self,
        question: &str,
        role: &str,
        top_k: usize,
    ) -> AppResult<Vec<RetrievalResult>> {
        let allowed = self.scope_for(role);
        tracing::debug!(
            "Retrieving for role '{}' over partitions {:?}",
            role,
            allowed.as_slice()
        );

        let query_embedding = tokio::time::timeout(self.timeout, self.embedder.embed(question))
            .await
            .map_err(|_| AppError::RetrievalTimeout(self.timeout.as_millis() as u64))??;

        let results = self.index.query(&query_embedding, top_k, &allowed)?;

        tracing::info!(
            "Retrieved {} chunks for role '{}' (top-{})",
            results.len(),
            role,
            top_k
        );

        Ok(results)
    }

    /// Retrieve and assemble the generator-ready context.
    pub async fn retrieve_context(
        &self,
        question: &str,
        role: &str,
        top_k: usize,
    ) -> AppResult<RetrievedContext> {
        let results = self.retrieve(question, role, top_k).await?;
        Ok(assemble_context(&results))
    }
}

/// Format retrieved chunks into a provenance-labeled context string and
/// collect citations.
///
/// Each chunk becomes a block headed by its partition, source, and chunk
/// position, so the generator can ground statements in a specific source.
/// Citations are deduplicated by `(source, ordinal)`, preserving the
/// retrieval order.
pub fn assemble_context(results: &[RetrievalResult]) -> RetrievedContext {
    let blocks: Vec<String> = results
        .iter()
        .map(|r| {
            format!(
                "[{} | {} | chunk-{}]\n{}\n",
                r.partition, r.source_id, r.ordinal, r.text
            )
        })
        .collect();

    let mut citations: Vec<Citation> = Vec::new();
    for result in results {
        let citation = Citation {
            source_id: result.source_id.clone(),
            ordinal: result.ordinal,
        };
        if !citations.contains(&citation) {
            citations.push(citation);
        }
    }

    RetrievedContext {
        context: blocks.join("\n---\n"),
        citations,
        retrieved_count: results.len(),
    }
}
