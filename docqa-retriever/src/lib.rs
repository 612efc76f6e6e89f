//! docqa-retriever: semantic retrieval over a single reference document
//!
//! Splits one document into overlapping chunks, embeds them, and answers
//! "top-k passages for this question" by cosine similarity. The index lives in
//! memory and is rebuilt on demand; readers always see one complete generation.
//!
//! ## Key Modules
//!
//! - **[`service`]**: [`RetrievalService`], lazy initialization, querying and refresh
//! - **[`index`]**: similarity scoring, immutable generations, atomic publication
//! - **[`query`]**: query normalization and passage formatting
//! - **[`source`]**: where the document text comes from
//! - **[`config`]**: TOML-loadable configuration
//! - **[`status`]**: diagnostic snapshot
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docqa_retriever::{RetrievalService, RetrieverConfig};
//!
//! # async fn example() -> docqa_retriever::Result<()> {
//! let service = RetrievalService::from_config(RetrieverConfig::new("manual.txt")).await?;
//!
//! // Never fails: an empty string means "answer without context"
//! let context = service.get_relevant_sections("How do I reset the router?", 3).await;
//!
//! // Diagnostic path: errors come back to the caller
//! let results = service.query("reset router", 5).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! DocumentSource → Chunker → EmbeddingProvider → IndexGeneration
//!                                                     ↓ (atomic swap)
//!        get_relevant_sections ← RetrievalService ← VectorIndex
//! ```

pub mod config;
pub mod error;
pub mod index;
pub mod query;
pub mod service;
pub mod source;
pub mod status;

pub use config::{BuildConfig, DEFAULT_MAX_CHUNKS, QueryConfig, RetrieverConfig};
pub use error::{Result, RetrievalError};
pub use index::{
    BuildOptions, EmbeddedChunk, IndexGeneration, QueryResult, VectorIndex, cosine_similarity,
};
pub use query::{format_passages, normalize_query};
pub use service::RetrievalService;
pub use source::{DocumentSource, FileDocumentSource};
pub use status::IndexStatus;
