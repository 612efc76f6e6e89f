//! Point-in-time view of the service for diagnostics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Snapshot of the index and its collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStatus {
    /// A generation has been published
    pub initialized: bool,
    pub generation_id: Option<u64>,
    pub chunk_count: usize,
    pub dimension: Option<usize>,
    pub built_at: Option<DateTime<Utc>>,
    /// Embedding provider name
    pub provider: String,
    /// Document source name
    pub source: String,
    pub document_path: Option<PathBuf>,
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .document_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string());
        writeln!(f, "Document:    {path} (via {})", self.source)?;
        writeln!(f, "Provider:    {}", self.provider)?;

        match (self.generation_id, self.built_at) {
            (Some(id), Some(built_at)) => {
                writeln!(f, "Generation:  {id} (built {})", built_at.to_rfc3339())?;
                writeln!(f, "Chunks:      {}", self.chunk_count)?;
                match self.dimension {
                    Some(dimension) => write!(f, "Dimension:   {dimension}"),
                    None => write!(f, "Dimension:   -"),
                }
            }
            _ => write!(f, "Generation:  not built"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uninitialized() {
        let status = IndexStatus {
            initialized: false,
            generation_id: None,
            chunk_count: 0,
            dimension: None,
            built_at: None,
            provider: "hashing".to_string(),
            source: "file".to_string(),
            document_path: Some(PathBuf::from("manual.txt")),
        };
        let text = status.to_string();
        assert!(text.contains("manual.txt (via file)"));
        assert!(text.contains("not built"));
    }

    #[test]
    fn test_serializes_to_json() {
        let status = IndexStatus {
            initialized: true,
            generation_id: Some(2),
            chunk_count: 14,
            dimension: Some(384),
            built_at: None,
            provider: "fastembed".to_string(),
            source: "file".to_string(),
            document_path: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["generation_id"], 2);
        assert_eq!(json["chunk_count"], 14);
        assert_eq!(json["provider"], "fastembed");
    }
}
