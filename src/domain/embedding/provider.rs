//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Trait for embedding providers.
///
/// Implementations must be deterministic: identical text always yields the
/// identical vector. Any failure surfaces as [`DomainError::Embedding`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Compute one embedding per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;

    /// The fixed output dimensionality of this provider
    fn dimensions(&self) -> usize;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Mock embedding provider for testing.
    ///
    /// Produces a deterministic pseudo-embedding from the text's byte sum,
    /// or a configured error.
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: usize,
        error: Option<String>,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                error: None,
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::embedding(error.clone()));
            }

            Ok(texts
                .iter()
                .map(|text| {
                    let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
                    (0..self.dimensions)
                        .map(|i| ((hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0) - 0.5)
                        .collect()
                })
                .collect())
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_is_deterministic() {
            let provider = MockEmbeddingProvider::new(16);
            let texts = vec!["Hello".to_string()];

            let first = provider.embed(&texts).await.unwrap();
            let second = provider.embed(&texts).await.unwrap();

            assert_eq!(first, second);
            assert_eq!(first[0].len(), 16);
        }

        #[tokio::test]
        async fn test_mock_provider_error() {
            let provider = MockEmbeddingProvider::new(16).with_error("API error");
            let result = provider.embed(&["Hello".to_string()]).await;

            assert!(matches!(result, Err(DomainError::Embedding { .. })));
        }
    }
}
