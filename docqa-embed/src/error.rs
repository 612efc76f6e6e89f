//! Error types for the embedding system

use std::time::Duration;

/// Result type for embedding operations.
///
/// This is a convenience type alias that uses [`EmbedError`] as the error type.
/// Used throughout the crate for operations that can fail.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Comprehensive error type for all embedding operations.
///
/// Providers never fall back to a zero vector: every failure surfaces as one of
/// these variants so callers can decide whether to abort a build or degrade a
/// query.
///
/// # Error Categories
///
/// - **Configuration Errors**: Invalid provider settings or missing credentials
/// - **Initialization Errors**: Failures while loading a local model
/// - **Remote Errors**: Authentication, quota, transport and timeout failures
/// - **Response Errors**: Malformed or non-finite embeddings
/// - **Model Errors**: Failures inside a local model while embedding
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// Error when provider configuration is invalid
    #[error("Invalid embedding configuration: {message}")]
    InvalidConfig { message: String },

    /// Error during model initialization
    #[error("Model initialization failed: {source}")]
    ModelInitialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error during embedding generation
    #[error("Embedding generation failed: {source}")]
    EmbeddingGeneration {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The provider rejected our credentials
    #[error("Embedding provider rejected credentials (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    /// The provider refused the request because of rate or quota limits
    #[error("Embedding provider quota exceeded: {message}")]
    QuotaExceeded { message: String },

    /// Transport-level failure talking to a remote provider
    #[error("Network error calling embedding provider: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// The call did not finish in time
    #[error("Embedding call timed out after {after:?}")]
    Timeout { after: Duration },

    /// The provider answered with something that is not a usable embedding
    #[error("Invalid embedding response: {message}")]
    InvalidResponse { message: String },

    /// Async task join errors
    #[error("Async task failed: {source}")]
    AsyncTask {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl EmbedError {
    /// Create a model initialization error from any error type, including the
    /// `anyhow::Error` values fastembed returns.
    pub fn model_init<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::ModelInitialization {
            source: source.into(),
        }
    }

    /// Create an embedding generation error from any error type.
    pub fn embedding_gen<E>(source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::EmbeddingGeneration {
            source: source.into(),
        }
    }

    /// Create an invalid configuration error with a custom message.
    ///
    /// Used for configuration validation failures such as a missing endpoint,
    /// an unset API key variable or a zero dimension.
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid response error with a custom message.
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a timeout error for a call that ran longer than `after`.
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout { after }
    }
}
