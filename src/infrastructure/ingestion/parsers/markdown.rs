//! Markdown document parser

use pulldown_cmark::{Event, Parser, Tag};

use crate::domain::ingestion::{DocumentParser, ParserInput};
use crate::domain::DomainError;

/// Parser for Markdown files: strips formatting and keeps the prose.
#[derive(Debug, Clone, Default)]
pub struct MarkdownParser;

impl MarkdownParser {
    /// Create a new Markdown parser
    pub fn new() -> Self {
        Self
    }

    fn extract_text(markdown: &str) -> String {
        let parser = Parser::new(markdown);
        let mut text = String::new();

        for event in parser {
            match event {
                Event::Text(t) | Event::Code(t) => {
                    text.push_str(&t);
                }
                Event::SoftBreak | Event::HardBreak => {
                    text.push(' ');
                }
                Event::End(Tag::Heading(..))
                | Event::End(Tag::Paragraph)
                | Event::End(Tag::Item)
                | Event::End(Tag::CodeBlock(..)) => {
                    if !text.ends_with('\n') {
                        text.push('\n');
                    }
                }
                _ => {}
            }
        }

        text.trim().to_string()
    }
}

impl DocumentParser for MarkdownParser {
    fn parse(&self, input: &ParserInput) -> Result<String, DomainError> {
        let raw = input.as_text()?;
        Ok(Self::extract_text(&raw))
    }

    fn name(&self) -> &'static str {
        "markdown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_formatting() {
        let parser = MarkdownParser::new();
        let input = ParserInput::new(
            "doc.md",
            "# Title\n\nSome **bold** text with a [link](https://example.com).\n".as_bytes(),
        );

        let text = parser.parse(&input).unwrap();

        assert!(text.contains("Title"));
        assert!(text.contains("bold"));
        assert!(text.contains("link"));
        assert!(!text.contains("**"));
        assert!(!text.contains("https://example.com"));
    }

    #[test]
    fn test_list_items_separated() {
        let parser = MarkdownParser::new();
        let input = ParserInput::new("doc.md", "- first\n- second\n".as_bytes());

        let text = parser.parse(&input).unwrap();

        assert!(text.contains("first"));
        assert!(text.contains("second"));
    }
}
