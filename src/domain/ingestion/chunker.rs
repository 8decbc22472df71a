//! Chunking strategy trait and types

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::DomainError;

/// Configuration for chunking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    /// Create a new chunking configuration
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::configuration(
                "chunk_size must be greater than 0",
            ));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::configuration(
                "chunk_overlap must be less than chunk_size",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 64,
        }
    }
}

/// A contiguous span of text produced by a splitter, before it is turned
/// into an indexed [`Chunk`](crate::domain::chunk::Chunk).
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Segment content
    pub content: String,
    /// Index of this segment (0-based)
    pub index: usize,
    /// Total number of segments produced from the document
    pub total: usize,
    /// Character offset where this segment starts
    pub char_start: usize,
    /// Character offset where this segment ends
    pub char_end: usize,
}

impl Segment {
    pub fn new(
        content: impl Into<String>,
        index: usize,
        total: usize,
        char_start: usize,
        char_end: usize,
    ) -> Self {
        Self {
            content: content.into(),
            index,
            total,
            char_start,
            char_end,
        }
    }
}

/// Trait for chunking strategies
pub trait ChunkingStrategy: Send + Sync + Debug {
    /// Split content into segments. Deterministic: identical input and
    /// configuration always produce an identical segment sequence.
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Segment>, DomainError>;

    /// Get the strategy name
    fn name(&self) -> &'static str;
}
