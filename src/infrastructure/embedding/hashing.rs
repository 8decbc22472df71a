//! Deterministic feature-hashing embedding provider
//!
//! Maps each lowercased alphanumeric token onto a dimension via XxHash64 and
//! accumulates term frequency, then L2-normalizes. No model weights, no
//! network: the same text always produces the same unit-length vector, and a
//! text compared with itself scores the maximum cosine similarity of 1.0.
//! Suited to local deployments and tests; shared vocabulary still drives
//! similarity, so related texts score above unrelated ones.

use std::hash::Hasher;

use async_trait::async_trait;
use twox_hash::XxHash64;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

/// Embedding provider backed by token feature hashing.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create a provider with the given output dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Embed one text synchronously.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &'static str {
        "hashing"
    }
}
