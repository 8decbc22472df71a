//! Sentence-based chunking strategy

use unicode_segmentation::UnicodeSegmentation;

use crate::domain::ingestion::{ChunkingConfig, ChunkingStrategy, Segment};
use crate::domain::DomainError;

/// Chunking strategy that splits text at sentence boundaries.
///
/// Sentences are packed greedily into chunks of at most `chunk_size`
/// characters. A sentence longer than the budget becomes its own chunk
/// rather than being truncated mid-sentence. When `chunk_overlap` is
/// non-zero, the trailing characters of each chunk are repeated at the head
/// of the next one.
#[derive(Debug, Clone, Default)]
pub struct SentenceChunker;

impl SentenceChunker {
    /// Create a new sentence chunker
    pub fn new() -> Self {
        Self
    }

    fn split_sentences(text: &str) -> Vec<&str> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Trailing slice of at most `overlap` bytes, snapped forward to a
    /// char boundary so multi-byte text never splits a code point.
    fn overlap_tail(text: &str, overlap: usize) -> &str {
        let mut start = text.len().saturating_sub(overlap);
        while start < text.len() && !text.is_char_boundary(start) {
            start += 1;
        }
        &text[start..]
    }
}

impl ChunkingStrategy for SentenceChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Segment>, DomainError> {
        config.validate()?;

        let content = content.trim();

        if content.is_empty() {
            return Ok(vec![]);
        }

        if content.len() <= config.chunk_size {
            return Ok(vec![Segment::new(content, 0, 1, 0, content.len())]);
        }

        let sentences = Self::split_sentences(content);

        if sentences.is_empty() {
            return Ok(vec![Segment::new(content, 0, 1, 0, content.len())]);
        }

        // (content, char_start) pairs; char_start values are kept strictly
        // increasing so derived chunk ids stay unique within one file.
        let mut pieces: Vec<(String, usize)> = Vec::new();
        let mut current = String::new();
        let mut current_start = 0;
        let mut pos: usize = 0;

        for sentence in sentences {
            if current.is_empty() {
                current = sentence.to_string();
                current_start = pos;
            } else if current.len() + 1 + sentence.len() <= config.chunk_size {
                current.push(' ');
                current.push_str(sentence);
            } else {
                let finished = std::mem::take(&mut current);
                let finished_start = current_start;

                if config.chunk_overlap > 0 {
                    let overlap = Self::overlap_tail(&finished, config.chunk_overlap);
                    current = format!("{} {}", overlap, sentence);
                    current_start = pos.saturating_sub(overlap.len());
                } else {
                    current = sentence.to_string();
                    current_start = pos;
                }

                if current_start <= finished_start {
                    current_start = finished_start + 1;
                }

                pieces.push((finished, finished_start));
            }

            pos += sentence.len() + 1;
        }

        if !current.is_empty() {
            pieces.push((current, current_start));
        }

        let total = pieces.len();
        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(index, (content, start))| {
                let end = start + content.len();
                Segment::new(content, index, total, start, end)
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "sentence"
    }
}
