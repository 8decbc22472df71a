//! Cosine-similarity retriever over a loaded vector snapshot

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::chunk::ScoredChunk;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::retrieval::{Retriever, RetrieverMode};
use crate::domain::vector::VectorRecord;
use crate::domain::DomainError;

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero magnitude, so an empty query
/// never outranks a real match.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

/// Vector retriever bound to one knowledge base's loaded snapshot.
///
/// The whole record set is held in memory; queries embed the query text and
/// score every record. Immutable after construction and safe for concurrent
/// read-only queries.
pub struct VectorRetriever {
    records: Vec<VectorRecord>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl VectorRetriever {
    /// Bind a retriever to a loaded snapshot. `records` must be in
    /// insertion order - that order breaks score ties.
    pub fn new(
        records: Vec<VectorRecord>,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Self {
        debug!(records = records.len(), top_k, "vector retriever built");
        Self {
            records,
            embedder,
            top_k,
        }
    }
}

impl std::fmt::Debug for VectorRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorRetriever")
            .field("records", &self.records.len())
            .field("top_k", &self.top_k)
            .finish()
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn search(&self, query: &str) -> Result<Vec<ScoredChunk>, DomainError> {
        let query_vector = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::embedding("Provider returned no vector for query"))?;

        let mut hits: Vec<ScoredChunk> = self
            .records
            .iter()
            .map(|record| {
                ScoredChunk::new(
                    record.chunk.clone(),
                    cosine_similarity(&query_vector, &record.vector),
                )
            })
            .collect();

        // Stable sort: equal scores keep insertion order
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(self.top_k);

        Ok(hits)
    }

    fn mode(&self) -> RetrieverMode {
        RetrieverMode::Vector
    }

    fn top_k(&self) -> usize {
        self.top_k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chunk::Chunk;
    use crate::domain::embedding::mock::MockEmbeddingProvider;
    use crate::infrastructure::embedding::HashingEmbedder;

    fn record(source: &str, index: usize, text: &str, vector: Vec<f32>) -> VectorRecord {
        VectorRecord::new(
            Chunk::from_split(source, text, index, 1, index * 100, index * 100 + text.len()),
            vector,
        )
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let embedder = Arc::new(HashingEmbedder::new(64));
        let records = vec![
            record(
                "animals.txt",
                0,
                "Giraffes eat leaves from tall trees.",
                embedder.embed_text("Giraffes eat leaves from tall trees."),
            ),
            record(
                "animals.txt",
                1,
                "Elephants are large gray animals.",
                embedder.embed_text("Elephants are large gray animals."),
            ),
        ];

        let retriever = VectorRetriever::new(records, embedder, 1);
        let results = retriever.search("large animal").await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].chunk.text.contains("Elephants"));
    }

    #[tokio::test]
    async fn test_self_similarity_is_maximal() {
        let embedder = Arc::new(HashingEmbedder::new(64));
        let text = "Elephants are large gray animals.";
        let records = vec![
            record("a.txt", 0, "Something else entirely here.",
                embedder.embed_text("Something else entirely here.")),
            record("a.txt", 1, text, embedder.embed_text(text)),
        ];

        let retriever = VectorRetriever::new(records, embedder, 2);
        let results = retriever.search(text).await.unwrap();

        assert!(results[0].chunk.text == text);
        assert!((results[0].score - 1.0).abs() < 1e-5);
        for hit in &results {
            assert!(hit.score <= results[0].score + 1e-6);
        }
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let embedder = Arc::new(MockEmbeddingProvider::new(4));
        let records = vec![
            record("a.txt", 0, "alpha", vec![1.0, 0.0, 0.0, 0.0]),
            record("b.txt", 1, "beta", vec![1.0, 0.0, 0.0, 0.0]),
        ];

        let retriever = VectorRetriever::new(records, embedder, 2);
        let results = retriever.search("anything").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.source(), Some("a.txt"));
        assert_eq!(results[1].chunk.source(), Some("b.txt"));
    }

    #[tokio::test]
    async fn test_returns_at_most_top_k() {
        let embedder = Arc::new(MockEmbeddingProvider::new(4));
        let records = (0..5)
            .map(|i| record("a.txt", i, "text", vec![1.0, 0.0, 0.0, i as f32]))
            .collect();

        let retriever = VectorRetriever::new(records, embedder, 3);
        let results = retriever.search("query").await.unwrap();

        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let embedder = Arc::new(MockEmbeddingProvider::new(4).with_error("offline"));
        let records = vec![record("a.txt", 0, "text", vec![1.0])];

        let retriever = VectorRetriever::new(records, embedder, 1);
        let result = retriever.search("query").await;

        assert!(matches!(result, Err(DomainError::Embedding { .. })));
    }
}
