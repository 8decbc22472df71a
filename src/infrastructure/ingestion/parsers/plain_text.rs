//! Plain text parser

use crate::domain::ingestion::{DocumentParser, ParserInput};
use crate::domain::DomainError;

/// Parser for plain text files
#[derive(Debug, Clone, Default)]
pub struct PlainTextParser;

impl PlainTextParser {
    /// Create a new plain text parser
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for PlainTextParser {
    fn parse(&self, input: &ParserInput) -> Result<String, DomainError> {
        input.as_text()
    }

    fn name(&self) -> &'static str {
        "plain_text"
    }
}
