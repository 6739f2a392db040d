//! Retrieval pipeline configuration.
//!
//! Persisted as YAML under the workspace state directory. Every field has
//! a default, so a missing or partial file still yields a working
//! deployment.

use crate::chunker::{DEFAULT_OVERLAP, DEFAULT_WINDOW};
use crate::embeddings::EmbeddingConfig;
use crate::index::DEFAULT_BATCH_SIZE;
use crate::policy::AccessPolicy;
use crate::retrieve::DEFAULT_RETRIEVAL_TIMEOUT_SECS;
use scoperag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Config file name under the state directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Index database file name under the state directory.
pub const INDEX_FILE: &str = "index.sqlite";

/// Pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunk window size in characters
    #[serde(default = "default_chunk_window")]
    pub chunk_window: usize,

    /// Overlap between consecutive chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks embedded per upsert batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Deadline for embedding the query and searching, in seconds
    #[serde(default = "default_retrieval_timeout_secs")]
    pub retrieval_timeout_secs: u64,

    /// Deadline for the generation call, in seconds
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Role → partitions table; the general partition is implied for every
    /// role
    #[serde(default = "AccessPolicy::default_table")]
    pub roles: BTreeMap<String, Vec<String>>,
}

fn default_chunk_window() -> usize {
    DEFAULT_WINDOW
}

fn default_chunk_overlap() -> usize {
    DEFAULT_OVERLAP
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_retrieval_timeout_secs() -> u64 {
    DEFAULT_RETRIEVAL_TIMEOUT_SECS
}

fn default_generation_timeout_secs() -> u64 {
    crate::answer::DEFAULT_GENERATION_TIMEOUT_SECS
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_window: default_chunk_window(),
            chunk_overlap: default_chunk_overlap(),
            batch_size: default_batch_size(),
            retrieval_timeout_secs: default_retrieval_timeout_secs(),
            generation_timeout_secs: default_generation_timeout_secs(),
            embedding: EmbeddingConfig::default(),
            roles: AccessPolicy::default_table(),
        }
    }
}

impl RetrievalConfig {
    /// Load configuration from a YAML file, or defaults if it does not
    /// exist.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        tracing::debug!("Wrote config to {:?}", path);
        Ok(())
    }

    /// Reject configurations that cannot chunk.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_window == 0 {
            return Err(AppError::Config("chunk_window must be non-zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_window {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_window ({})",
                self.chunk_overlap, self.chunk_window
            )));
        }
        Ok(())
    }

    /// The access policy defined by the roles table.
    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy::from_table(&self.roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.chunk_window, 800);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.batch_size, 64);
        assert!(config.roles.contains_key("c_level"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = RetrievalConfig::load(&temp.path().join("nope.yaml")).unwrap();
        assert_eq!(config.chunk_window, 800);
    }

    #[test]
    fn test_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state").join(CONFIG_FILE);

        let mut config = RetrievalConfig::default();
        config.chunk_window = 400;
        config.embedding.provider = "mock".to_string();
        config.save(&path).unwrap();

        let loaded = RetrievalConfig::load(&path).unwrap();
        assert_eq!(loaded.chunk_window, 400);
        assert_eq!(loaded.embedding.provider, "mock");
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "chunk_window: 500\n").unwrap();

        let config = RetrievalConfig::load(&path).unwrap();
        assert_eq!(config.chunk_window, 500);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.embedding.model, "nomic-embed-text");
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "chunk_window: 100\nchunk_overlap: 100\n").unwrap();

        assert!(matches!(
            RetrievalConfig::load(&path),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_custom_roles_table() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "roles:\n  research:\n    - research\n").unwrap();

        let config = RetrievalConfig::load(&path).unwrap();
        let policy = config.policy();
        let set = policy.allowed_partitions("research");
        assert!(set.contains("research"));
        assert!(set.contains("general"));
        // The default table is replaced, not merged.
        assert_eq!(
            policy.allowed_partitions("finance").as_slice(),
            &["general"]
        );
    }
}
