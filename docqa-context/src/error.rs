//! Error types for text chunking

/// Result type for chunking operations.
pub type Result<T> = std::result::Result<T, ChunkError>;

/// Errors raised while configuring or running the chunker.
///
/// Every variant describes a configuration that cannot produce chunks. Callers
/// treat all of them as fatal and do not retry.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// Chunk size, overlap or ratio values that are out of range
    #[error("Invalid chunking configuration: {message}")]
    InvalidConfig { message: String },

    /// The break pattern is not a valid regular expression
    #[error("Invalid break pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The cursor failed to move forward between two windows
    #[error(
        "Chunk cursor did not advance (start {start}, next {next}): overlap {overlap} is too large for chunk size {chunk_size}"
    )]
    NoProgress {
        start: usize,
        next: usize,
        overlap: usize,
        chunk_size: usize,
    },
}

impl ChunkError {
    /// Create an invalid configuration error with a custom message.
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
