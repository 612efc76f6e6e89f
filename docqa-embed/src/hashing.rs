//! Deterministic feature-hashing embeddings.
//!
//! Each lower-cased alphanumeric token is hashed with FNV into one of
//! `dimension` buckets, with a second hash bit choosing the sign. The result
//! needs no model download and is identical across runs and machines, which
//! makes it the default for the CLI and for reproducible indexes. Semantic
//! quality is limited to lexical overlap.

use crate::error::{EmbedError, Result};
use crate::provider::{EmbeddingProvider, l2_normalize};
use async_trait::async_trait;
use fnv::FnvHasher;
use std::hash::Hasher;

/// Offline embedding provider based on the hashing trick
#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimension: usize,
    normalize: bool,
}

impl HashingEmbeddingProvider {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(EmbedError::invalid_config(
                "hashing dimension must be greater than zero",
            ));
        }
        Ok(Self {
            dimension,
            normalize: true,
        })
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Embed synchronously; never fails once constructed.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let mut hasher = FnvHasher::default();
            hasher.write(token.as_bytes());
            let hash = hasher.finish();

            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        if self.normalize {
            l2_normalize(&mut vector);
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn embedding_dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }

    fn provider_name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_deterministic_and_fixed_dimension() {
        let provider = HashingEmbeddingProvider::new(64).unwrap();
        let a = provider.embed_text("Reset the breaker panel").await.unwrap();
        let b = provider.embed_text("Reset the breaker panel").await.unwrap();

        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        assert_eq!(provider.embedding_dimension(), Some(64));
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let provider = HashingEmbeddingProvider::new(128).unwrap();
        let a = provider.embed_sync("warranty, claims!");
        let b = provider.embed_sync("WARRANTY claims");
        assert_eq!(a, b);
    }

    #[test]
    fn test_lexical_overlap_scores_higher() {
        let provider = HashingEmbeddingProvider::new(256).unwrap();
        let query = provider.embed_sync("how do I replace the water filter");
        let related = provider.embed_sync("To replace the water filter, turn the cartridge.");
        let unrelated = provider.embed_sync("Invoices are emailed monthly.");

        assert!(dot(&query, &related) > dot(&query, &unrelated));
    }

    #[test]
    fn test_normalized_output() {
        let provider = HashingEmbeddingProvider::new(32).unwrap();
        let vector = provider.embed_sync("several different words here");
        let norm = dot(&vector, &vector).sqrt();
        assert!((norm - 1.0).abs() < 1e-5);

        // No tokens: zero vector, nothing to normalize
        assert!(provider.embed_sync("  ... ").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            HashingEmbeddingProvider::new(0),
            Err(EmbedError::InvalidConfig { .. })
        ));
    }
}
