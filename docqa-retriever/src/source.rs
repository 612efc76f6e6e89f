//! Document sources: where the reference text comes from.
//!
//! The service never reads files directly. It asks a [`DocumentSource`] for the
//! plain text of the configured path, so PDF or HTML extraction can be plugged in
//! by implementing the trait.

use crate::error::{Result, RetrievalError};
use async_trait::async_trait;
use std::path::Path;

/// Produces the plain text of one document
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Extract the full text of the document at `path`.
    ///
    /// Errors are reported as [`RetrievalError::Extraction`].
    async fn extract_text(&self, path: &Path) -> Result<String>;

    /// Short name used in logs and status output
    fn source_name(&self) -> &str {
        "custom"
    }
}

/// Reads UTF-8 text files from the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FileDocumentSource;

impl FileDocumentSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentSource for FileDocumentSource {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RetrievalError::extraction(path, e))?;
        let text = String::from_utf8(bytes).map_err(|e| RetrievalError::extraction(path, e))?;

        tracing::debug!("Read {} bytes from {}", text.len(), path.display());
        Ok(text)
    }

    fn source_name(&self) -> &str {
        "file"
    }
}
