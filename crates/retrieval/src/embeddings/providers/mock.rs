//! Deterministic in-process embedding provider.

use crate::embeddings::provider::EmbeddingProvider;
use scoperag_core::AppResult;

/// Content-dependent stand-in for a real embedding model.
///
/// Hashes words and adjacent word pairs into vector slots weighted by
/// frequency, then normalizes to a unit vector. Not semantically accurate,
/// but deterministic and discriminative enough that similar texts score
/// closer than unrelated ones, which is what the tests need.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    /// Create a mock provider with the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_token(token: &str) -> u64 {
        // FNV-1a
        token.bytes().fold(0xcbf29ce484222325u64, |acc, b| {
            (acc ^ b as u64).wrapping_mul(0x100000001b3)
        })
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let lower = text.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() > 1)
            .collect();

        for token in &tokens {
            let slot = (Self::hash_token(token) as usize) % self.dimensions;
            embedding[slot] += 1.0;
        }

        // Adjacent pairs capture a little word order.
        for pair in tokens.windows(2) {
            let joined = format!("{} {}", pair[0], pair[1]);
            let slot = (Self::hash_token(&joined) as usize) % self.dimensions;
            embedding[slot] += 0.5;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "token-hash-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = MockProvider::new(256);
        let a = provider.embed("employee handbook policies").await.unwrap();
        let b = provider.embed("employee handbook policies").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_unit_norm() {
        let provider = MockProvider::new(256);
        let embedding = provider.embed("quarterly revenue report").await.unwrap();
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_similar_texts_score_closer() {
        let provider = MockProvider::new(256);
        let query = provider.embed("quarterly revenue numbers").await.unwrap();
        let related = provider
            .embed("the quarterly revenue numbers grew strongly")
            .await
            .unwrap();
        let unrelated = provider
            .embed("office dog vaccination schedule")
            .await
            .unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = MockProvider::new(64);
        let embedding = provider.embed("").await.unwrap();
        assert_eq!(embedding.len(), 64);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_order_preserved() {
        let provider = MockProvider::new(64);
        let texts = vec!["alpha".to_string(), "beta".to_string()];
        let batch = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], provider.embed("alpha").await.unwrap());
        assert_eq!(batch[1], provider.embed("beta").await.unwrap());
    }
}
