//! Document parser trait and types

use std::fmt::Debug;

use crate::domain::DomainError;

/// Input for document parsing: the uploaded bytes plus the original
/// filename, which drives format detection.
#[derive(Debug, Clone)]
pub struct ParserInput {
    pub filename: String,
    pub content: Vec<u8>,
}

impl ParserInput {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Decode the raw bytes as UTF-8 text.
    pub fn as_text(&self) -> Result<String, DomainError> {
        String::from_utf8(self.content.clone())
            .map_err(|e| DomainError::validation(format!("Invalid UTF-8: {}", e)))
    }
}

/// Trait for turning an uploaded document into plain indexable text
pub trait DocumentParser: Send + Sync + Debug {
    /// Extract plain text from the input
    fn parse(&self, input: &ParserInput) -> Result<String, DomainError>;

    /// Get the parser name
    fn name(&self) -> &'static str;
}
