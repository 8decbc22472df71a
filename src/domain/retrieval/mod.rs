//! Retriever contract
//!
//! A retriever is a stateless, reusable query function bound at construction
//! time to one index snapshot and one `top_k`. Both retrieval modes expose
//! the same surface, so the answer-generation stage that consumes them is
//! mode-agnostic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::chunk::ScoredChunk;
use crate::domain::DomainError;

/// Which index a retriever queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrieverMode {
    /// BM25 term ranking over stemmed tokens
    Lexical,
    /// Embedding cosine similarity
    Vector,
}

impl std::fmt::Display for RetrieverMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Vector => write!(f, "vector"),
        }
    }
}

impl std::str::FromStr for RetrieverMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexical" | "keyword" | "bm25" => Ok(Self::Lexical),
            "vector" | "semantic" => Ok(Self::Vector),
            other => Err(DomainError::validation(format!(
                "Unknown retriever mode: {}",
                other
            ))),
        }
    }
}

/// A ready-to-query retriever bound to one knowledge base's storage.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return at most `top_k` chunks ordered by descending relevance,
    /// ties broken by original insertion order.
    async fn search(&self, query: &str) -> Result<Vec<ScoredChunk>, DomainError>;

    /// The mode this retriever was built for
    fn mode(&self) -> RetrieverMode;

    /// The bound result-count limit
    fn top_k(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("lexical".parse::<RetrieverMode>().unwrap(), RetrieverMode::Lexical);
        assert_eq!("bm25".parse::<RetrieverMode>().unwrap(), RetrieverMode::Lexical);
        assert_eq!("vector".parse::<RetrieverMode>().unwrap(), RetrieverMode::Vector);
        assert_eq!("semantic".parse::<RetrieverMode>().unwrap(), RetrieverMode::Vector);
        assert!("hybrid".parse::<RetrieverMode>().is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(RetrieverMode::Lexical.to_string(), "lexical");
        assert_eq!(RetrieverMode::Vector.to_string(), "vector");
    }
}
