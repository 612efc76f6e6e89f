//! Retriever configuration, loadable from TOML.
//!
//! ```toml
//! document_path = "manual.txt"
//!
//! [chunking]
//! chunk_size = 1000
//! overlap = 200
//!
//! [query]
//! default_k = 3
//! keyword_extraction = true
//!
//! [build]
//! embed_concurrency = 4
//! embed_timeout_secs = 30
//!
//! [embedding]
//! provider = "hashing"
//! dimension = 384
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration.

use crate::error::{Result, RetrievalError};
use docqa_context::ChunkerConfig;
use docqa_embed::EmbedConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Number of passages returned when the caller does not ask for a specific count.
pub const DEFAULT_MAX_CHUNKS: usize = 3;

/// How raw user queries are turned into embedding input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Passages returned when no explicit count is given
    pub default_k: usize,
    /// Reduce the query to its leading signal terms before embedding
    pub keyword_extraction: bool,
    /// Maximum number of terms kept by keyword extraction
    pub max_keywords: usize,
    /// Terms of this many characters or fewer are dropped by keyword extraction
    pub short_token_chars: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_k: DEFAULT_MAX_CHUNKS,
            keyword_extraction: true,
            max_keywords: 5,
            short_token_chars: 3,
        }
    }
}

/// How index generations are built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Maximum number of embedding calls in flight during a build
    pub embed_concurrency: usize,
    /// Upper bound for a single embedding call, in seconds
    pub embed_timeout_secs: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            embed_concurrency: 4,
            embed_timeout_secs: 30,
        }
    }
}

impl BuildConfig {
    pub fn embed_timeout(&self) -> Duration {
        Duration::from_secs(self.embed_timeout_secs)
    }
}

/// Top-level configuration for the retrieval service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// The single reference document served by this index
    pub document_path: Option<PathBuf>,
    pub chunking: ChunkerConfig,
    pub query: QueryConfig,
    pub build: BuildConfig,
    pub embedding: EmbedConfig,
}

impl RetrieverConfig {
    /// Create a configuration for `document_path` with defaults for everything else.
    pub fn new(document_path: impl Into<PathBuf>) -> Self {
        Self {
            document_path: Some(document_path.into()),
            ..Self::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| RetrievalError::config(format!("invalid configuration: {e}")))
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RetrievalError::config(format!("cannot read configuration {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn with_document_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.document_path = Some(path.into());
        self
    }

    pub fn with_chunking(mut self, chunking: ChunkerConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_embedding(mut self, embedding: EmbedConfig) -> Self {
        self.embedding = embedding;
        self
    }

    pub fn with_keyword_extraction(mut self, enabled: bool) -> Self {
        self.query.keyword_extraction = enabled;
        self
    }

    pub fn with_embed_concurrency(mut self, concurrency: usize) -> Self {
        self.build.embed_concurrency = concurrency;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.build.embed_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Check values that would make the service unusable.
    ///
    /// The document path is not checked here; a missing path is reported when
    /// the index is first built.
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.build.embed_concurrency == 0 {
            return Err(RetrievalError::config(
                "build.embed_concurrency must be greater than zero",
            ));
        }
        if self.build.embed_timeout_secs == 0 {
            return Err(RetrievalError::config(
                "build.embed_timeout_secs must be greater than zero",
            ));
        }
        if self.query.keyword_extraction && self.query.max_keywords == 0 {
            return Err(RetrievalError::config(
                "query.max_keywords must be greater than zero when keyword extraction is on",
            ));
        }
        Ok(())
    }
}
