//! Error taxonomy for the retrieval engine

use docqa_context::ChunkError;
use docqa_embed::EmbedError;
use std::path::PathBuf;

/// Result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors raised by indexing and querying.
///
/// Internal components always return one of these. Only
/// [`RetrievalService::get_relevant_sections`](crate::service::RetrievalService::get_relevant_sections)
/// converts them into an empty answer; every other entry point propagates them.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Parameters that cannot work: chunking that cannot make progress, a missing
    /// document path, zero concurrency. Not retried.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The source document is missing, unreadable or unparsable
    #[error("Failed to extract text from {}: {source}", .path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The embedding provider failed (auth, quota, network, timeout, bad response)
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    /// Vectors of inconsistent length, either within a build or between the
    /// index and a query
    #[error("Embedding dimension mismatch{}: expected {expected}, found {found}", .chunk_index.map(|i| format!(" at chunk {i}")).unwrap_or_default())]
    DimensionMismatch {
        expected: usize,
        found: usize,
        chunk_index: Option<usize>,
    },
}

impl RetrievalError {
    /// Create a configuration error with a custom message.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an extraction error for `path` from any error type.
    pub fn extraction<E>(path: impl Into<PathBuf>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Extraction {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl From<ChunkError> for RetrievalError {
    fn from(error: ChunkError) -> Self {
        Self::config(error.to_string())
    }
}
