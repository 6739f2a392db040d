//! End-to-end pipeline wiring: ingestion, question answering, and index
//! maintenance over one shared index and embedding provider.

use crate::answer::AnswerAssembler;
use crate::chunker;
use crate::config::{RetrievalConfig, INDEX_FILE};
use crate::embeddings::{create_provider, EmbeddingProvider};
use crate::index::VectorIndex;
use crate::loader;
use crate::policy::AccessPolicy;
use crate::retrieve::Retriever;
use crate::types::{Answer, AnswerOptions, Chunk, IndexStats, IngestStats};
use scoperag_core::{AppError, AppResult};
use scoperag_llm::LlmClient;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The assembled retrieval pipeline.
///
/// Holds the vector index and embedding provider both ingestion and
/// querying go through, guaranteeing the two sides use the same embedding
/// space.
pub struct Pipeline {
    config: RetrievalConfig,
    index: Arc<VectorIndex>,
    retriever: Retriever,
}

impl Pipeline {
    /// Wire up the pipeline from configuration, opening (or creating) the
    /// index under `state_dir`.
    pub fn open(state_dir: &Path, config: RetrievalConfig) -> AppResult<Self> {
        config.validate()?;

        let embedder = create_provider(&config.embedding)?;
        let index = Arc::new(VectorIndex::open(
            &state_dir.join(INDEX_FILE),
            embedder.dimensions(),
            embedder.model_name(),
            config.batch_size,
        )?);

        let retriever = Retriever::new(index.clone(), embedder.clone(), config.policy())
            .with_timeout(Duration::from_secs(config.retrieval_timeout_secs));

        tracing::debug!(
            "Pipeline ready: {} embeddings, index at {:?}",
            embedder.provider_name(),
            state_dir.join(INDEX_FILE)
        );

        Ok(Self {
            config,
            index,
            retriever,
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn policy(&self) -> AccessPolicy {
        self.config.policy()
    }

    fn embedder(&self) -> &dyn EmbeddingProvider {
        self.retriever.embedder()
    }

    /// Discover, chunk, embed, and index every document under `docs_root`.
    ///
    /// Ingestion is not scoped per role; callers must gate it behind an
    /// administrative role.
    ///
    /// Documents must live in partition directories the policy table can
    /// reach; an unmapped partition aborts the run before anything is
    /// indexed, so a typo'd directory never silently creates unreachable
    /// documents. Re-running over the same tree is idempotent.
    pub async fn ingest(&self, docs_root: &Path) -> AppResult<IngestStats> {
        let started = Instant::now();
        let documents = loader::discover(docs_root)?;

        let domain = self.policy().partition_domain();
        let mut unmapped: Vec<String> = documents
            .iter()
            .filter(|d| !domain.contains(&d.partition))
            .map(|d| d.partition.clone())
            .collect();
        unmapped.sort();
        unmapped.dedup();
        if !unmapped.is_empty() {
            return Err(AppError::UnmappedPartitions(unmapped));
        }

        let mut chunks_indexed = 0u32;
        let mut truncated_sources = Vec::new();

        for document in &documents {
            let windows = chunker::chunk(
                &document.text,
                self.config.chunk_window,
                self.config.chunk_overlap,
            )?;

            let chunks: Vec<Chunk> = windows
                .into_iter()
                .enumerate()
                .map(|(ordinal, text)| {
                    Chunk::new(&document.partition, &document.source_id, ordinal as u32, text)
                })
                .collect();

            let indexed = self.index.upsert(&chunks, self.embedder()).await?;
            chunks_indexed += indexed as u32;

            self.index.record_source(
                &document.partition,
                &document.source_id,
                chunks.len() as u32,
                document.truncated,
            )?;

            if document.truncated {
                truncated_sources
                    .push(format!("{}/{}", document.partition, document.source_id));
            }

            tracing::debug!(
                "Indexed {}/{} ({} chunks)",
                document.partition,
                document.source_id,
                chunks.len()
            );
        }

        let stats = IngestStats {
            sources_count: documents.len() as u32,
            chunks_indexed,
            truncated_sources,
            duration_secs: started.elapsed().as_secs_f64(),
        };

        tracing::info!(
            "Ingested {} sources, {} chunks in {:.2}s",
            stats.sources_count,
            stats.chunks_indexed,
            stats.duration_secs
        );

        Ok(stats)
    }

    /// Answer `question` as `role`, using `generator` for the final text.
    pub async fn answer(
        &self,
        question: &str,
        role: &str,
        generator: Arc<dyn LlmClient>,
        model: &str,
        options: &AnswerOptions,
    ) -> AppResult<Answer> {
        let retrieved = self
            .retriever
            .retrieve_context(question, role, options.top_k)
            .await?;

        let assembler = AnswerAssembler::new(generator, model)
            .with_timeout(Duration::from_secs(self.config.generation_timeout_secs));

        assembler.answer(question, &retrieved, options).await
    }

    /// Index counts and on-disk size.
    pub fn stats(&self) -> AppResult<IndexStats> {
        self.index.stats()
    }

    /// Delete all indexed data.
    pub fn reset(&self) -> AppResult<()> {
        self.index.reset()
    }
}
