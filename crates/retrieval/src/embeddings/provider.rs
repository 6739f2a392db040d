//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use scoperag_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Provider name (e.g. "ollama", "mock")
    fn provider_name(&self) -> &str;

    /// Model identifier
    fn model_name(&self) -> &str;

    /// Embedding dimensionality, fixed per deployment
    fn dimensions(&self) -> usize;

    /// Embed multiple texts in one call.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "mock" => Ok(Arc::new(super::providers::mock::MockProvider::new(
            config.dimensions,
        ))),
        "ollama" => Ok(Arc::new(super::providers::ollama::OllamaProvider::new(
            config,
        )?)),
        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, mock",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_provider() {
        let config = EmbeddingConfig {
            provider: "mock".to_string(),
            dimensions: 128,
            ..Default::default()
        };

        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.dimensions(), 128);
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = EmbeddingConfig {
            provider: "sentence-transformers".to_string(),
            ..Default::default()
        };

        match create_provider(&config) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown embedding provider")),
            other => panic!("expected Config error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_single_embed_delegates_to_batch() {
        let config = EmbeddingConfig {
            provider: "mock".to_string(),
            dimensions: 64,
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();

        let embedding = provider.embed("quarterly report").await.unwrap();
        assert_eq!(embedding.len(), 64);
    }
}
