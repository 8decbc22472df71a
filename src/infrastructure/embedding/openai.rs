//! OpenAI-compatible embedding provider

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Embedding provider speaking the OpenAI `/v1/embeddings` protocol.
///
/// Works against api.openai.com or any compatible endpoint via a custom
/// base URL.
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    auth_header: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddingProvider {
    /// Create a new provider against the default OpenAI endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self::with_base_url(api_key, model, dimensions, DEFAULT_BASE_URL)
    }

    /// Create a new provider with a custom base URL
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(self.embeddings_url())
            .header("Authorization", &self.auth_header)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::embedding(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::embedding(format!(
                "Embedding endpoint returned {}: {}",
                status, detail
            )));
        }

        let parsed: EmbeddingsResponse = response.json().await.map_err(|e| {
            DomainError::embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        if parsed.data.len() != texts.len() {
            return Err(DomainError::embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // The protocol does not guarantee response order
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embeddings_body(count: usize, dimensions: usize) -> serde_json::Value {
        let data: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                json!({
                    "index": i,
                    "embedding": vec![i as f32 * 0.1; dimensions],
                    "object": "embedding"
                })
            })
            .collect();

        json!({
            "model": "text-embedding-3-small",
            "data": data,
            "usage": {"prompt_tokens": 1, "total_tokens": 1}
        })
    }

    #[tokio::test]
    async fn test_embed_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(embeddings_body(2, 4)))
            .mount(&server)
            .await;

        let provider = OpenAiEmbeddingProvider::with_base_url(
            "test-key",
            "text-embedding-3-small",
            4,
            server.uri(),
        );

        let vectors = provider
            .embed(&["Hello".to_string(), "World".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 4);
    }

    #[tokio::test]
    async fn test_http_error_surfaces_as_embedding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let provider = OpenAiEmbeddingProvider::with_base_url(
            "test-key",
            "text-embedding-3-small",
            4,
            server.uri(),
        );

        let result = provider.embed(&["Hello".to_string()]).await;

        assert!(matches!(result, Err(DomainError::Embedding { .. })));
    }

    #[tokio::test]
    async fn test_count_mismatch_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(embeddings_body(1, 4)))
            .mount(&server)
            .await;

        let provider = OpenAiEmbeddingProvider::with_base_url(
            "test-key",
            "text-embedding-3-small",
            4,
            server.uri(),
        );

        let result = provider
            .embed(&["Hello".to_string(), "World".to_string()])
            .await;

        assert!(matches!(result, Err(DomainError::Embedding { .. })));
    }
}
