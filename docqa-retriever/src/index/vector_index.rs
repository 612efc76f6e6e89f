//! In-memory vector index with atomic generation swaps.
//!
//! The index holds a pointer to the current [`IndexGeneration`]. Builds embed
//! every chunk with no lock held, validate the result, and then replace the
//! pointer in one short write. Readers clone the `Arc` under a read lock and scan
//! the snapshot lock-free, so a build never blocks a query for longer than the
//! pointer assignment and a failed build leaves the published generation as it
//! was.

use super::generation::{EmbeddedChunk, IndexGeneration};
use super::similarity::QueryResult;
use crate::error::{Result, RetrievalError};
use docqa_context::Chunk;
use docqa_embed::provider::ensure_finite;
use docqa_embed::{EmbedError, EmbeddingProvider};
use futures::{StreamExt, TryStreamExt, stream};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Tuning for a single build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Embedding calls allowed in flight at once
    pub concurrency: usize,
    /// Upper bound for one embedding call
    pub embed_timeout: Duration,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            embed_timeout: Duration::from_secs(30),
        }
    }
}

impl BuildOptions {
    pub fn new(concurrency: usize, embed_timeout: Duration) -> Self {
        Self {
            concurrency,
            embed_timeout,
        }
    }
}

/// Embed one text, failing with [`EmbedError::Timeout`] if it takes longer than `limit`.
pub async fn embed_with_timeout(
    embedder: &dyn EmbeddingProvider,
    text: &str,
    limit: Duration,
) -> Result<Vec<f32>> {
    match tokio::time::timeout(limit, embedder.embed_text(text)).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(EmbedError::timeout(limit).into()),
    }
}

/// The current-generation pointer
#[derive(Debug, Default)]
pub struct VectorIndex {
    current: RwLock<Option<Arc<IndexGeneration>>>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed `chunks` and publish them as the next generation.
    ///
    /// Results keep chunk order regardless of completion order. Any embedding
    /// failure, timeout, non-finite value or dimension mismatch aborts the build
    /// and leaves the current generation in place.
    pub async fn build(
        &self,
        chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingProvider,
        options: &BuildOptions,
    ) -> Result<Arc<IndexGeneration>> {
        if options.concurrency == 0 {
            return Err(RetrievalError::config(
                "embedding concurrency must be greater than zero",
            ));
        }

        let started = Instant::now();
        let total = chunks.len();
        let expected_dimension = embedder.embedding_dimension();
        info!(
            "Building index generation from {} chunks with {} (concurrency {})",
            total,
            embedder.provider_name(),
            options.concurrency
        );

        let timeout = options.embed_timeout;
        let entries: Vec<EmbeddedChunk> = stream::iter(chunks)
            .map(|chunk| async move {
                let vector = embed_with_timeout(embedder, &chunk.text, timeout).await?;
                ensure_finite(&vector)?;
                if let Some(expected) = expected_dimension {
                    if vector.len() != expected {
                        return Err(RetrievalError::DimensionMismatch {
                            expected,
                            found: vector.len(),
                            chunk_index: Some(chunk.index),
                        });
                    }
                }
                debug!("Embedded chunk {}/{}", chunk.index + 1, total);
                Ok(EmbeddedChunk::new(chunk, vector))
            })
            .buffered(options.concurrency)
            .try_collect()
            .await?;

        let generation = self.publish(entries).await?;
        info!(
            "Published index generation {} ({} chunks, dimension {:?}) in {:?}",
            generation.id(),
            generation.len(),
            generation.dimension(),
            started.elapsed()
        );
        Ok(generation)
    }

    /// Validate `entries` and swap them in as the next generation.
    ///
    /// Generation ids increase by one with every successful publish.
    pub async fn publish(&self, entries: Vec<EmbeddedChunk>) -> Result<Arc<IndexGeneration>> {
        let mut current = self.current.write().await;
        let next_id = current.as_ref().map_or(1, |generation| generation.id() + 1);
        let generation = Arc::new(IndexGeneration::new(next_id, entries)?);
        *current = Some(Arc::clone(&generation));
        Ok(generation)
    }

    /// The currently published generation, if any
    pub async fn snapshot(&self) -> Option<Arc<IndexGeneration>> {
        self.current.read().await.clone()
    }

    /// Rank the current generation against `query`.
    ///
    /// An index with nothing published yields no results.
    pub async fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        match self.snapshot().await {
            Some(generation) => generation.top_k(query, k),
            None => Ok(Vec::new()),
        }
    }

    /// True when no generation has been published or the current one has no chunks
    pub async fn is_empty(&self) -> bool {
        self.snapshot()
            .await
            .is_none_or(|generation| generation.is_empty())
    }

    pub async fn generation_id(&self) -> Option<u64> {
        self.snapshot().await.map(|generation| generation.id())
    }
}
