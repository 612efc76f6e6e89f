//! Embedding provider for OpenAI-compatible HTTP endpoints.
//!
//! Sends `POST {endpoint}/embeddings` with a JSON body of the form
//! `{"model": ..., "input": [...]}` and reads `data[].embedding` back, ordered by
//! `data[].index`. HTTP status codes are mapped onto [`EmbedError`] so that
//! authentication and quota problems are distinguishable from transport errors.

use crate::config::EmbedConfig;
use crate::error::{EmbedError, Result};
use crate::provider::{EmbeddingProvider, EmbeddingResult, ensure_finite, l2_normalize};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// Remote embedding provider speaking the OpenAI embeddings protocol
#[derive(Clone)]
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    config: EmbedConfig,
}

impl std::fmt::Debug for HttpEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingProvider")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.config.model_name)
            .finish()
    }
}

impl HttpEmbeddingProvider {
    /// Build a provider from `config`.
    ///
    /// # Errors
    /// - No endpoint configured
    /// - `api_key_env` names a variable that is not set
    /// - The HTTP client cannot be constructed
    pub fn new(config: EmbedConfig) -> Result<Self> {
        config.validate()?;

        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| EmbedError::invalid_config("the http provider requires an endpoint"))?;
        let url = format!("{}/embeddings", endpoint.trim_end_matches('/'));

        let api_key = match &config.api_key_env {
            Some(var) => Some(std::env::var(var).map_err(|_| {
                EmbedError::invalid_config(format!("environment variable {var} is not set"))
            })?),
            None => None,
        };

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        tracing::info!("HTTP embedding provider targeting {} ({})", url, config.model_name);

        Ok(Self {
            client,
            url,
            api_key,
            config,
        })
    }

    async fn request_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingRequest {
            model: &self.config.model_name,
            input: batch,
            dimensions: self.config.dimension,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.map_transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_transport_error(e))?;

        check_status(status, &text)?;
        parse_response(&text, batch.len())
    }

    fn map_transport_error(&self, error: reqwest::Error) -> EmbedError {
        if error.is_timeout() {
            EmbedError::timeout(self.config.timeout())
        } else {
            EmbedError::Network { source: error }
        }
    }
}

/// Map a non-success HTTP status onto the matching error variant.
fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    let message: String = body.chars().take(300).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(EmbedError::Authentication {
            status: status.as_u16(),
            message,
        }),
        StatusCode::TOO_MANY_REQUESTS => Err(EmbedError::QuotaExceeded { message }),
        _ => Err(EmbedError::invalid_response(format!(
            "HTTP {}: {message}",
            status.as_u16()
        ))),
    }
}

/// Decode a response body into exactly `expected` embeddings in request order.
fn parse_response(body: &str, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut response: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| EmbedError::invalid_response(format!("malformed JSON: {e}")))?;

    if response.data.len() != expected {
        return Err(EmbedError::invalid_response(format!(
            "expected {expected} embeddings, got {}",
            response.data.len()
        )));
    }

    // Indices, when given, must name each input exactly once
    let indexed = response.data.iter().filter(|d| d.index.is_some()).count();
    if indexed == expected {
        response.data.sort_by_key(|d| d.index);
        let in_order = response
            .data
            .iter()
            .enumerate()
            .all(|(position, d)| d.index == Some(position));
        if !in_order {
            return Err(EmbedError::invalid_response(
                "embedding indices are not a permutation of the inputs",
            ));
        }
    } else if indexed > 0 {
        return Err(EmbedError::invalid_response("only some embeddings carry an index"));
    }

    let embeddings: Vec<Vec<f32>> = response.data.into_iter().map(|d| d.embedding).collect();
    for embedding in &embeddings {
        ensure_finite(embedding)?;
    }
    Ok(embeddings)
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let texts = vec![text.to_string()];
        let result = self.embed_texts(&texts).await?;
        result
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::invalid_response("No embedding generated for text"))
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<EmbeddingResult> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.config.batch_size.max(1)) {
            tracing::debug!("Requesting {} embeddings from {}", batch.len(), self.url);
            for mut embedding in self.request_batch(batch).await? {
                if self.config.normalize {
                    l2_normalize(&mut embedding);
                }
                all_embeddings.push(embedding);
            }
        }

        Ok(EmbeddingResult::new(all_embeddings))
    }

    fn embedding_dimension(&self) -> Option<usize> {
        self.config.dimension
    }

    fn provider_name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_orders_by_index() {
        let body = r#"{"data": [
            {"embedding": [0.0, 1.0], "index": 1},
            {"embedding": [1.0, 0.0], "index": 0}
        ], "model": "m"}"#;

        let embeddings = parse_response(body, 2).unwrap();
        assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_parse_response_rejects_bad_payloads() {
        assert!(matches!(
            parse_response("not json", 1),
            Err(EmbedError::InvalidResponse { .. })
        ));
        assert!(matches!(
            parse_response(r#"{"data": []}"#, 1),
            Err(EmbedError::InvalidResponse { .. })
        ));
        assert!(matches!(
            parse_response(r#"{"data": [{"embedding": []}]}"#, 1),
            Err(EmbedError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_parse_response_rejects_bad_indices() {
        let duplicate = r#"{"data": [
            {"embedding": [0.0, 1.0], "index": 0},
            {"embedding": [1.0, 0.0], "index": 0}
        ]}"#;
        assert!(matches!(
            parse_response(duplicate, 2),
            Err(EmbedError::InvalidResponse { .. })
        ));

        let out_of_range = r#"{"data": [
            {"embedding": [0.0, 1.0], "index": 1},
            {"embedding": [1.0, 0.0], "index": 2}
        ]}"#;
        assert!(matches!(
            parse_response(out_of_range, 2),
            Err(EmbedError::InvalidResponse { .. })
        ));

        let partial = r#"{"data": [
            {"embedding": [0.0, 1.0], "index": 1},
            {"embedding": [1.0, 0.0]}
        ]}"#;
        assert!(matches!(
            parse_response(partial, 2),
            Err(EmbedError::InvalidResponse { .. })
        ));

        // No indices at all keeps response order
        let unindexed = r#"{"data": [{"embedding": [0.0, 1.0]}, {"embedding": [1.0, 0.0]}]}"#;
        assert_eq!(
            parse_response(unindexed, 2).unwrap(),
            vec![vec![0.0, 1.0], vec![1.0, 0.0]]
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(check_status(StatusCode::OK, "").is_ok());
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, "bad key"),
            Err(EmbedError::Authentication { status: 401, .. })
        ));
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            Err(EmbedError::QuotaExceeded { .. })
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY, "upstream"),
            Err(EmbedError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_request_serialization() {
        let input = vec!["a".to_string()];
        let body = EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &input,
            dimensions: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert!(json.get("dimensions").is_none());
    }

    #[test]
    fn test_missing_api_key_variable() {
        let config = EmbedConfig::http("http://localhost:9/v1", "m")
            .with_api_key_env(Some("DOCQA_TEST_KEY_THAT_IS_NEVER_SET".to_string()));
        assert!(matches!(
            HttpEmbeddingProvider::new(config),
            Err(EmbedError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_url_construction_without_key() {
        let config = EmbedConfig::http("http://localhost:9/v1/", "m").with_api_key_env(None);
        let provider = HttpEmbeddingProvider::new(config).unwrap();
        assert_eq!(provider.url, "http://localhost:9/v1/embeddings");
        assert_eq!(provider.provider_name(), "http");
    }
}
