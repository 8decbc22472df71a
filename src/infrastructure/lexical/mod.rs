//! BM25 lexical index and retriever
//!
//! Wraps the [`bm25`](https://crates.io/crates/bm25) crate. BM25 scores
//! chunks by query term frequency, inverse document frequency across the
//! corpus, and document-length normalization, over stemmed, stop-word-aware
//! tokens. The index is rebuilt from the document store's chunk set on every
//! `build` - rebuilding is O(total chunks), which is acceptable because
//! ingestion is rare relative to queries.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use bm25::{Document, Language, SearchEngine, SearchEngineBuilder};
use tracing::debug;

use crate::domain::chunk::{Chunk, ScoredChunk};
use crate::domain::retrieval::{Retriever, RetrieverMode};
use crate::domain::DomainError;

/// Map a configured language name onto the stemmer language.
///
/// Unknown names fall back to English, the default.
pub fn parse_language(name: &str) -> Language {
    match name.to_lowercase().as_str() {
        "danish" => Language::Danish,
        "dutch" => Language::Dutch,
        "english" => Language::English,
        "french" => Language::French,
        "german" => Language::German,
        "italian" => Language::Italian,
        "norwegian" => Language::Norwegian,
        "portuguese" => Language::Portuguese,
        "russian" => Language::Russian,
        "spanish" => Language::Spanish,
        "swedish" => Language::Swedish,
        _ => Language::English,
    }
}

/// Lexical retriever bound to one knowledge base's chunk snapshot.
///
/// Immutable after construction and safe for concurrent read-only queries.
pub struct LexicalRetriever {
    engine: SearchEngine<String>,
    /// chunk id -> (insertion rank, chunk); the rank is the tie-breaker
    chunks_by_id: HashMap<String, (usize, Chunk)>,
    top_k: usize,
}

impl LexicalRetriever {
    /// Build the term-statistics structure from a chunk snapshot.
    ///
    /// `chunks` must be in insertion order; fails with a not-found error
    /// when the snapshot is empty.
    pub fn build(
        chunks: Vec<Chunk>,
        language: &str,
        top_k: usize,
    ) -> Result<Self, DomainError> {
        if chunks.is_empty() {
            return Err(DomainError::not_found(
                "Knowledge base has no indexed chunks",
            ));
        }

        let documents: Vec<Document<String>> = chunks
            .iter()
            .map(|chunk| Document {
                id: chunk.id.clone(),
                contents: chunk.text.clone(),
            })
            .collect();

        let engine = SearchEngineBuilder::<String>::with_documents(
            parse_language(language),
            documents,
        )
        .build();

        let chunks_by_id = chunks
            .into_iter()
            .enumerate()
            .map(|(rank, chunk)| (chunk.id.clone(), (rank, chunk)))
            .collect();

        debug!(top_k, language, "lexical retriever built");

        Ok(Self {
            engine,
            chunks_by_id,
            top_k,
        })
    }
}

impl std::fmt::Debug for LexicalRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexicalRetriever")
            .field("chunks", &self.chunks_by_id.len())
            .field("top_k", &self.top_k)
            .finish()
    }
}

#[async_trait]
impl Retriever for LexicalRetriever {
    async fn search(&self, query: &str) -> Result<Vec<ScoredChunk>, DomainError> {
        let mut hits: Vec<(usize, ScoredChunk)> = self
            .engine
            .search(query, self.top_k)
            .into_iter()
            .filter_map(|result| {
                self.chunks_by_id
                    .get(&result.document.id)
                    .map(|(rank, chunk)| (*rank, ScoredChunk::new(chunk.clone(), result.score)))
            })
            .collect();

        // Descending score, insertion order on equal scores
        hits.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        Ok(hits.into_iter().map(|(_, hit)| hit).collect())
    }

    fn mode(&self) -> RetrieverMode {
        RetrieverMode::Lexical
    }

    fn top_k(&self) -> usize {
        self.top_k
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(source: &str, index: usize, text: &str) -> Chunk {
        Chunk::from_split(source, text, index, 3, index * 100, index * 100 + text.len())
    }

    fn zoo_chunks() -> Vec<Chunk> {
        vec![
            chunk("animals.txt", 0, "Giraffes eat leaves from tall trees."),
            chunk("animals.txt", 1, "Elephants are large gray animals."),
            chunk("animals.txt", 2, "Zebras have black and white stripes."),
        ]
    }

    #[test]
    fn test_build_fails_on_empty_snapshot() {
        let result = LexicalRetriever::build(vec![], "english", 5);
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_search_finds_stemmed_term() {
        let retriever = LexicalRetriever::build(zoo_chunks(), "english", 1).unwrap();

        let results = retriever.search("giraffe").await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].chunk.text.contains("Giraffes"));
    }

    #[tokio::test]
    async fn test_search_returns_at_most_top_k() {
        let retriever = LexicalRetriever::build(zoo_chunks(), "english", 2).unwrap();

        let results = retriever.search("animals").await.unwrap();

        assert!(results.len() <= 2);
    }

    #[tokio::test]
    async fn test_scores_descend() {
        let retriever = LexicalRetriever::build(zoo_chunks(), "english", 3).unwrap();

        let results = retriever.search("large gray animals").await.unwrap();

        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_ties_break_by_insertion_order() {
        let chunks = vec![
            chunk("a.txt", 0, "identical wording here"),
            chunk("b.txt", 1, "identical wording here"),
        ];
        let retriever = LexicalRetriever::build(chunks, "english", 2).unwrap();

        let results = retriever.search("identical wording").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.source(), Some("a.txt"));
        assert_eq!(results[1].chunk.source(), Some("b.txt"));
    }

    #[tokio::test]
    async fn test_no_match_returns_empty() {
        let retriever = LexicalRetriever::build(zoo_chunks(), "english", 5).unwrap();

        let results = retriever.search("spaceship").await.unwrap();

        assert!(results.is_empty());
    }

    #[test]
    fn test_parse_language_defaults_to_english() {
        assert!(matches!(parse_language("english"), Language::English));
        assert!(matches!(parse_language("German"), Language::German));
        assert!(matches!(parse_language("klingon"), Language::English));
    }
}
