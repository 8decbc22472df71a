//! Indexed chunk types shared by the document store and both indexes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Metadata key carrying the originating filename
pub const META_SOURCE: &str = "source";
/// Metadata key carrying the zero-based chunk position within its file
pub const META_CHUNK_INDEX: &str = "chunk_index";
/// Metadata key carrying the number of chunks the file produced
pub const META_TOTAL_CHUNKS: &str = "total_chunks";
/// Metadata key carrying the character offset where the chunk starts
pub const META_CHAR_START: &str = "char_start";
/// Metadata key carrying the character offset where the chunk ends
pub const META_CHAR_END: &str = "char_end";

/// A bounded segment of a source document, the unit of indexing and retrieval.
///
/// Chunks are immutable once created. The id is derived from the source
/// filename and the chunk's character offset, so re-ingesting the same file
/// with the same splitter parameters reproduces the same ids and the stores
/// can upsert instead of duplicating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier derived from source + offset
    pub id: String,
    /// Text payload
    pub text: String,
    /// Source metadata (filename, position, offsets) as string pairs
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    /// Create a chunk with a derived id and positional metadata.
    pub fn from_split(
        source: &str,
        text: impl Into<String>,
        chunk_index: usize,
        total_chunks: usize,
        char_start: usize,
        char_end: usize,
    ) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(META_SOURCE.to_string(), source.to_string());
        metadata.insert(META_CHUNK_INDEX.to_string(), chunk_index.to_string());
        metadata.insert(META_TOTAL_CHUNKS.to_string(), total_chunks.to_string());
        metadata.insert(META_CHAR_START.to_string(), char_start.to_string());
        metadata.insert(META_CHAR_END.to_string(), char_end.to_string());

        Self {
            id: derive_chunk_id(source, char_start),
            text: text.into(),
            metadata,
        }
    }

    /// The originating filename, if recorded.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(META_SOURCE).map(String::as_str)
    }
}

/// A chunk paired with a retriever-specific relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Relevance score, higher is better. BM25 scores are unbounded;
    /// cosine similarities lie in [-1, 1].
    pub score: f32,
}

impl ScoredChunk {
    pub fn new(chunk: Chunk, score: f32) -> Self {
        Self { chunk, score }
    }
}

/// Derive the stable chunk id for a source file and character offset.
///
/// SHA-256 of `"<source>:<char_start>"`, hex-encoded and truncated to 32
/// characters. Identical input always yields the identical id.
pub fn derive_chunk_id(source: &str, char_start: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b":");
    hasher.update(char_start.to_string().as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_is_deterministic() {
        let a = derive_chunk_id("animals.txt", 0);
        let b = derive_chunk_id("animals.txt", 0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_chunk_id_varies_with_source_and_offset() {
        let base = derive_chunk_id("animals.txt", 0);
        assert_ne!(base, derive_chunk_id("animals.txt", 50));
        assert_ne!(base, derive_chunk_id("plants.txt", 0));
    }

    #[test]
    fn test_from_split_records_metadata() {
        let chunk = Chunk::from_split("animals.txt", "Giraffes eat leaves.", 0, 3, 0, 20);

        assert_eq!(chunk.source(), Some("animals.txt"));
        assert_eq!(chunk.metadata.get(META_CHUNK_INDEX).unwrap(), "0");
        assert_eq!(chunk.metadata.get(META_TOTAL_CHUNKS).unwrap(), "3");
        assert_eq!(chunk.metadata.get(META_CHAR_START).unwrap(), "0");
        assert_eq!(chunk.metadata.get(META_CHAR_END).unwrap(), "20");
        assert_eq!(chunk.id, derive_chunk_id("animals.txt", 0));
    }

    #[test]
    fn test_reingestion_reproduces_ids() {
        let first = Chunk::from_split("a.txt", "text", 0, 1, 0, 4);
        let second = Chunk::from_split("a.txt", "text", 0, 1, 0, 4);
        assert_eq!(first.id, second.id);
    }
}
