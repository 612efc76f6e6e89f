//! Configuration for embedding providers

use crate::error::{EmbedError, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Dimension used by the hashing provider when none is configured.
pub const DEFAULT_HASHING_DIMENSION: usize = 384;

/// Which embedding backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Deterministic offline feature hashing
    #[default]
    Hashing,
    /// Local ONNX model through fastembed
    FastEmbed,
    /// OpenAI-compatible `/embeddings` HTTP endpoint
    Http,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Hashing => write!(f, "hashing"),
            ProviderKind::FastEmbed => write!(f, "fastembed"),
            ProviderKind::Http => write!(f, "http"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hashing" => Ok(ProviderKind::Hashing),
            "fastembed" => Ok(ProviderKind::FastEmbed),
            "http" => Ok(ProviderKind::Http),
            _ => Err(EmbedError::invalid_config(format!(
                "unknown embedding provider: {s}"
            ))),
        }
    }
}

/// Configuration for an embedding provider
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
#[serde(default)]
pub struct EmbedConfig {
    /// Backend that produces the vectors
    #[builder(default)]
    pub provider: ProviderKind,
    /// Model identifier understood by the backend
    #[builder(default = r#""hashing-v1".to_string()"#)]
    pub model_name: String,
    /// Base URL of the HTTP endpoint (e.g. "https://api.openai.com/v1")
    #[builder(default)]
    pub endpoint: Option<String>,
    /// Environment variable holding the bearer token for the HTTP endpoint
    #[builder(default = r#"Some("OPENAI_API_KEY".to_string())"#)]
    pub api_key_env: Option<String>,
    /// Vector dimension: required size for hashing, requested size for HTTP
    #[builder(default)]
    pub dimension: Option<usize>,
    /// Per-request timeout in seconds
    #[builder(default = "30")]
    pub timeout_secs: u64,
    /// Maximum number of texts sent in one request
    #[builder(default = "16")]
    pub batch_size: usize,
    /// Whether to L2-normalize embeddings
    #[builder(default = "true")]
    pub normalize: bool,
    /// Directory where local models are cached
    #[builder(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Hashing,
            model_name: "hashing-v1".to_string(),
            endpoint: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            dimension: None,
            timeout_secs: 30,
            batch_size: 16,
            normalize: true,
            cache_dir: None,
        }
    }
}

impl EmbedConfig {
    /// Create a new embedding configuration using the builder
    pub fn builder() -> EmbedConfigBuilder {
        EmbedConfigBuilder::default()
    }

    /// Offline hashing provider with the given dimension
    pub fn hashing(dimension: usize) -> Self {
        Self {
            dimension: Some(dimension),
            ..Self::default()
        }
    }

    /// Local fastembed model, e.g. "all-minilm-l6-v2"
    pub fn fastembed(model_name: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::FastEmbed,
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    /// OpenAI-compatible endpoint, e.g. ("https://api.openai.com/v1", "text-embedding-3-small")
    pub fn http(endpoint: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            provider: ProviderKind::Http,
            model_name: model_name.into(),
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Set the request timeout (builder style)
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout_secs: timeout.as_secs().max(1),
            ..self
        }
    }

    /// Set the batch size for embedding generation (builder style)
    pub fn with_batch_size(self, batch_size: usize) -> Self {
        Self { batch_size, ..self }
    }

    /// Set whether to normalize embeddings (builder style)
    pub fn with_normalize(self, normalize: bool) -> Self {
        Self { normalize, ..self }
    }

    /// Set the environment variable holding the API key (builder style)
    pub fn with_api_key_env(self, api_key_env: Option<String>) -> Self {
        Self {
            api_key_env,
            ..self
        }
    }

    /// Set the local model cache directory (builder style)
    pub fn with_cache_dir(self, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(cache_dir.into()),
            ..self
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Dimension the hashing provider should produce
    pub fn hashing_dimension(&self) -> usize {
        self.dimension.unwrap_or(DEFAULT_HASHING_DIMENSION)
    }

    /// Validate the settings required by the selected provider
    pub fn validate(&self) -> Result<()> {
        if self.model_name.trim().is_empty() {
            return Err(EmbedError::invalid_config("model_name must not be empty"));
        }
        if self.batch_size == 0 {
            return Err(EmbedError::invalid_config("batch_size must be greater than zero"));
        }
        if self.timeout_secs == 0 {
            return Err(EmbedError::invalid_config("timeout_secs must be greater than zero"));
        }
        if self.dimension == Some(0) {
            return Err(EmbedError::invalid_config("dimension must be greater than zero"));
        }

        if self.provider == ProviderKind::Http {
            match self.endpoint.as_deref() {
                Some(endpoint) if !endpoint.trim().is_empty() => {}
                _ => {
                    return Err(EmbedError::invalid_config(
                        "the http provider requires an endpoint",
                    ));
                }
            }
        }

        tracing::debug!("Embedding configuration valid for: {}", self.model_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = EmbedConfig::default();

        assert_eq!(config.provider, ProviderKind::Hashing);
        assert_eq!(config.batch_size, 16);
        assert!(config.normalize);
        assert_eq!(config.hashing_dimension(), DEFAULT_HASHING_DIMENSION);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder_methods() {
        let temp_dir = tempdir().unwrap();
        let config = EmbedConfig::fastembed("bge-small-en-v1.5")
            .with_batch_size(64)
            .with_normalize(false)
            .with_timeout(Duration::from_secs(5))
            .with_cache_dir(temp_dir.path());

        assert_eq!(config.provider, ProviderKind::FastEmbed);
        assert_eq!(config.batch_size, 64);
        assert!(!config.normalize);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.cache_dir.as_deref(), Some(temp_dir.path()));
    }

    #[test]
    fn test_derive_builder_pattern() {
        let config = EmbedConfig::builder()
            .provider(ProviderKind::Http)
            .model_name("text-embedding-3-small")
            .endpoint(Some("http://localhost:8080/v1".to_string()))
            .dimension(Some(256))
            .build()
            .unwrap();

        assert_eq!(config.model_name, "text-embedding-3-small");
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let built = EmbedConfig::builder().build().unwrap();
        assert_eq!(built, EmbedConfig::default());
    }

    #[test]
    fn test_validation_errors() {
        let missing_endpoint = EmbedConfig {
            provider: ProviderKind::Http,
            ..EmbedConfig::default()
        };
        assert!(matches!(
            missing_endpoint.validate(),
            Err(EmbedError::InvalidConfig { .. })
        ));

        assert!(EmbedConfig::hashing(0).validate().is_err());
        assert!(EmbedConfig::default().with_batch_size(0).validate().is_err());
    }

    #[test]
    fn test_provider_kind_from_toml_style_string() {
        let config: EmbedConfig =
            serde_json::from_str(r#"{"provider": "fastembed", "model_name": "all-minilm-l6-v2"}"#)
                .unwrap();
        assert_eq!(config.provider, ProviderKind::FastEmbed);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(ProviderKind::Http.to_string(), "http");
        assert_eq!("FastEmbed".parse::<ProviderKind>().unwrap(), ProviderKind::FastEmbed);
        assert!("onnx".parse::<ProviderKind>().is_err());
    }
}
