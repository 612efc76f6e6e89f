//! # docqa-embed
//!
//! Text embedding providers behind one async trait, [`EmbeddingProvider`]. The
//! retrieval engine only ever talks to the trait, so a local model, a remote API
//! or a test double can be swapped in without touching indexing code.
//!
//! ## Providers
//!
//! - [`HashingEmbeddingProvider`]: deterministic feature hashing, no downloads
//! - [`FastEmbedProvider`]: local ONNX models via fastembed, cached per process
//! - [`HttpEmbeddingProvider`]: OpenAI-compatible `/embeddings` endpoints
//!
//! ## Quick Start
//!
//! ```
//! use docqa_embed::{EmbedConfig, EmbeddingProvider, create_provider};
//!
//! # async fn example() -> docqa_embed::Result<()> {
//! let provider = create_provider(&EmbedConfig::hashing(256)).await?;
//! let vector = provider.embed_text("How do I reset the device?").await?;
//! assert_eq!(vector.len(), 256);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`] using the crate's [`EmbedError`] type.
//! Providers never substitute a zero vector for a failed call.

pub mod config;
pub mod error;
pub mod hashing;
pub mod http;
pub mod provider;

use std::sync::Arc;

// Re-export main types for easy access
pub use config::{DEFAULT_HASHING_DIMENSION, EmbedConfig, EmbedConfigBuilder, ProviderKind};
pub use error::{EmbedError, Result};
pub use hashing::HashingEmbeddingProvider;
pub use http::HttpEmbeddingProvider;
pub use provider::{EmbeddingProvider, EmbeddingResult, FastEmbedProvider};

/// Construct and initialize the provider selected by `config`.
pub async fn create_provider(config: &EmbedConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    config.validate()?;

    tracing::info!(
        "Creating {} embedding provider ({})",
        config.provider,
        config.model_name
    );

    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::Hashing => Arc::new(
            HashingEmbeddingProvider::new(config.hashing_dimension())?
                .with_normalize(config.normalize),
        ),
        ProviderKind::FastEmbed => Arc::new(FastEmbedProvider::create(config.clone()).await?),
        ProviderKind::Http => Arc::new(HttpEmbeddingProvider::new(config.clone())?),
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_hashing_provider() {
        let provider = create_provider(&EmbedConfig::hashing(32)).await.unwrap();

        assert_eq!(provider.provider_name(), "hashing");
        assert_eq!(provider.embedding_dimension(), Some(32));

        let result = provider
            .embed_texts(&["one".to_string(), "two".to_string()])
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.dimension, 32);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_config() {
        let config = EmbedConfig {
            provider: ProviderKind::Http,
            endpoint: None,
            ..EmbedConfig::default()
        };
        assert!(create_provider(&config).await.is_err());
    }
}
