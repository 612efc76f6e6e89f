//! The retrieval service: the one component other subsystems call.
//!
//! ## Lifecycle
//!
//! A new service has no index. The first call to [`RetrievalService::initialize`],
//! or to any query method, extracts the document, chunks it and builds the first
//! generation. Concurrent cold-start callers share that single build. A failed
//! build is not remembered, so the next caller tries again.
//!
//! [`RetrievalService::refresh`] rebuilds from a fresh extraction and swaps the
//! new generation in only when it is complete. Queries running meanwhile keep
//! reading whichever generation was current when they started.
//!
//! ## Entry points
//!
//! | method | on failure |
//! |---|---|
//! | [`get_relevant_sections`](RetrievalService::get_relevant_sections) | logs, returns `""` |
//! | [`search_relevant_context`](RetrievalService::search_relevant_context) | returns the error |
//! | [`query`](RetrievalService::query) | returns the error |
//! | [`refresh_vector_store`](RetrievalService::refresh_vector_store) | returns the error |

use crate::config::RetrieverConfig;
use crate::error::{Result, RetrievalError};
use crate::index::{BuildOptions, IndexGeneration, QueryResult, VectorIndex, embed_with_timeout};
use crate::query::{format_passages, normalize_query};
use crate::source::{DocumentSource, FileDocumentSource};
use crate::status::IndexStatus;
use docqa_context::Chunker;
use docqa_embed::{EmbeddingProvider, create_provider};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

/// Retrieval over a single reference document
pub struct RetrievalService {
    config: RetrieverConfig,
    chunker: Chunker,
    source: Arc<dyn DocumentSource>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: VectorIndex,
    /// Set once the first generation has been published
    ready: OnceCell<()>,
    /// Serializes builds so two refreshes never embed the document twice at once
    build_lock: Mutex<()>,
}

impl std::fmt::Debug for RetrievalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService")
            .field("document_path", &self.config.document_path)
            .field("source", &self.source.source_name())
            .field("provider", &self.embedder.provider_name())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl RetrievalService {
    /// Create a service from explicit collaborators. Nothing is read or embedded yet.
    pub fn new(
        config: RetrieverConfig,
        source: Arc<dyn DocumentSource>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let chunker = Chunker::new(config.chunking.clone())?;

        Ok(Self {
            config,
            chunker,
            source,
            embedder,
            index: VectorIndex::new(),
            ready: OnceCell::new(),
            build_lock: Mutex::new(()),
        })
    }

    /// Create a service reading from the filesystem with the provider named in
    /// `config.embedding`.
    pub async fn from_config(config: RetrieverConfig) -> Result<Self> {
        let embedder = create_provider(&config.embedding).await?;
        Self::new(config, Arc::new(FileDocumentSource::new()), embedder)
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Number of passages used when a caller has no preference
    pub fn default_k(&self) -> usize {
        self.config.query.default_k
    }

    pub fn is_initialized(&self) -> bool {
        self.ready.initialized()
    }

    /// Build the first generation if none exists yet.
    ///
    /// Safe to call any number of times. Concurrent callers on a cold service
    /// wait for the same build and share its outcome.
    pub async fn initialize(&self) -> Result<()> {
        self.ready
            .get_or_try_init(|| async {
                self.rebuild(false).await?;
                Ok::<(), RetrievalError>(())
            })
            .await?;
        Ok(())
    }

    /// Re-extract the document and publish a new generation.
    ///
    /// The previous generation keeps serving until the new one is complete, and
    /// stays in place if the rebuild fails.
    pub async fn refresh(&self) -> Result<Arc<IndexGeneration>> {
        let generation = self.rebuild(true).await?;
        // Fails only if already set or a cold-start build is running; both are fine
        let _ = self.ready.set(());
        Ok(generation)
    }

    /// Administrative refresh trigger.
    pub async fn refresh_vector_store(&self) -> Result<()> {
        let generation = self.refresh().await?;
        info!("Vector store refreshed to generation {}", generation.id());
        Ok(())
    }

    /// Extract, chunk and build while holding the build lock.
    ///
    /// Without `force`, an already published generation is returned as is. This
    /// covers a cold-start caller that queued behind a refresh.
    async fn rebuild(&self, force: bool) -> Result<Arc<IndexGeneration>> {
        let _guard = self.build_lock.lock().await;

        if !force {
            if let Some(generation) = self.index.snapshot().await {
                return Ok(generation);
            }
        }

        let path = self
            .config
            .document_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| RetrievalError::config("no document path configured"))?;

        info!(
            "Indexing {} via {} source",
            path.display(),
            self.source.source_name()
        );
        let text = self.source.extract_text(path).await?;
        let chunks = self.chunker.split(&text)?;
        debug!(
            "Split {} characters into {} chunks",
            text.chars().count(),
            chunks.len()
        );

        let options = BuildOptions::new(
            self.config.build.embed_concurrency,
            self.config.build.embed_timeout(),
        );
        self.index
            .build(chunks, self.embedder.as_ref(), &options)
            .await
    }

    /// Rank the document's chunks against `raw_query`, initializing first if needed.
    ///
    /// Returns at most `k` results. A query that is empty after normalization
    /// returns no results without calling the embedding provider.
    pub async fn query(&self, raw_query: &str, k: usize) -> Result<Vec<QueryResult>> {
        self.initialize().await?;

        let normalized = normalize_query(raw_query, &self.config.query);
        if normalized.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        debug!("Normalized query {:?} to {:?}", raw_query, normalized);

        let vector = embed_with_timeout(
            self.embedder.as_ref(),
            &normalized,
            self.config.build.embed_timeout(),
        )
        .await?;
        self.index.top_k(&vector, k).await
    }

    /// Formatted top-`k` passages; errors propagate for diagnosis.
    pub async fn search_relevant_context(&self, query: &str, k: usize) -> Result<String> {
        let results = self.query(query, k).await?;
        Ok(format_passages(&results))
    }

    /// Formatted top passages for a user message, or `""` if anything fails.
    ///
    /// This is the production path: a retrieval failure degrades the caller to
    /// answering without grounding context instead of failing the request.
    pub async fn get_relevant_sections(&self, user_message: &str, max_chunks: usize) -> String {
        match self.search_relevant_context(user_message, max_chunks).await {
            Ok(sections) => sections,
            Err(e) => {
                warn!("Retrieval failed, continuing without context: {}", e);
                String::new()
            }
        }
    }

    pub async fn status(&self) -> IndexStatus {
        let generation = self.index.snapshot().await;

        IndexStatus {
            initialized: generation.is_some(),
            generation_id: generation.as_ref().map(|g| g.id()),
            chunk_count: generation.as_ref().map_or(0, |g| g.len()),
            dimension: generation.as_ref().and_then(|g| g.dimension()),
            built_at: generation.as_ref().map(|g| g.built_at()),
            provider: self.embedder.provider_name().to_string(),
            source: self.source.source_name().to_string(),
            document_path: self.config.document_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docqa_embed::HashingEmbeddingProvider;
    use std::path::Path;

    struct StaticSource(&'static str);

    #[async_trait]
    impl DocumentSource for StaticSource {
        async fn extract_text(&self, _path: &Path) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    const MANUAL: &str = "To reset the router, hold the recessed button on the back panel for ten seconds until the lights blink.\n\
        The warranty covers manufacturing defects for two years from the date of purchase, excluding water damage.\n\
        Firmware updates are downloaded automatically overnight when the router is idle and connected.";

    fn service(config: RetrieverConfig) -> RetrievalService {
        RetrievalService::new(
            config,
            Arc::new(StaticSource(MANUAL)),
            Arc::new(HashingEmbeddingProvider::new(256).unwrap()),
        )
        .unwrap()
    }

    fn small_chunks() -> RetrieverConfig {
        RetrieverConfig::new("manual.txt")
            .with_chunking(docqa_context::ChunkerConfig::new(120, 10))
    }

    #[tokio::test]
    async fn test_query_initializes_lazily() {
        let service = service(small_chunks());
        assert!(!service.is_initialized());

        let results = service.query("warranty manufacturing defects purchase", 1).await.unwrap();
        assert!(service.is_initialized());
        assert_eq!(results.len(), 1);
        assert!(results[0].chunk.text.contains("warranty"));
    }

    #[tokio::test]
    async fn test_blank_query_returns_nothing() {
        let service = service(small_chunks());
        assert!(service.query("   ", 3).await.unwrap().is_empty());
        assert!(service.search_relevant_context("", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_document_path() {
        let service = service(RetrieverConfig::default());
        assert!(matches!(
            service.initialize().await,
            Err(RetrievalError::Configuration { .. })
        ));
        assert!(!service.is_initialized());
        assert_eq!(service.get_relevant_sections("anything", 3).await, "");
    }

    #[test]
    fn test_invalid_chunking_rejected_at_construction() {
        let config = RetrieverConfig::new("manual.txt")
            .with_chunking(docqa_context::ChunkerConfig::new(100, 150));
        let result = RetrievalService::new(
            config,
            Arc::new(StaticSource(MANUAL)),
            Arc::new(HashingEmbeddingProvider::new(8).unwrap()),
        );
        assert!(matches!(result, Err(RetrievalError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_status_reflects_generation() {
        let service = service(small_chunks());
        let before = service.status().await;
        assert!(!before.initialized);
        assert_eq!(before.provider, "hashing");

        service.initialize().await.unwrap();
        let after = service.status().await;
        assert!(after.initialized);
        assert_eq!(after.generation_id, Some(1));
        assert_eq!(after.dimension, Some(256));
        assert!(after.chunk_count >= 3);
    }

    #[tokio::test]
    async fn test_refresh_before_initialize_marks_ready() {
        let service = service(small_chunks());
        service.refresh_vector_store().await.unwrap();
        assert!(service.is_initialized());

        // Initialization after a refresh must not build again
        service.initialize().await.unwrap();
        assert_eq!(service.status().await.generation_id, Some(1));
    }
}
