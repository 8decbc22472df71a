//! Document parser implementations

mod html;
mod markdown;
mod plain_text;

pub use html::HtmlParser;
pub use markdown::MarkdownParser;
pub use plain_text::PlainTextParser;

use crate::domain::ingestion::{DocumentParser, ParserInput};
use crate::domain::DomainError;

/// Parser that picks an implementation from the filename's MIME type.
///
/// Markdown and HTML get format-aware extraction; everything else is
/// treated as plain UTF-8 text.
#[derive(Debug, Clone, Default)]
pub struct AutoParser {
    html: HtmlParser,
    markdown: MarkdownParser,
    plain_text: PlainTextParser,
}

impl AutoParser {
    /// Create a new auto-detecting parser
    pub fn new() -> Self {
        Self::default()
    }

    fn parser_for(&self, filename: &str) -> &dyn DocumentParser {
        let guess = mime_guess::from_path(filename).first_or_text_plain();

        match (guess.type_().as_str(), guess.subtype().as_str()) {
            ("text", "html") | ("application", "xhtml+xml") => &self.html,
            ("text", "markdown") | ("text", "x-markdown") => &self.markdown,
            _ => &self.plain_text,
        }
    }
}

impl DocumentParser for AutoParser {
    fn parse(&self, input: &ParserInput) -> Result<String, DomainError> {
        self.parser_for(&input.filename).parse(input)
    }

    fn name(&self) -> &'static str {
        "auto"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_extension() {
        let parser = AutoParser::new();

        assert_eq!(parser.parser_for("notes.txt").name(), "plain_text");
        assert_eq!(parser.parser_for("readme.md").name(), "markdown");
        assert_eq!(parser.parser_for("page.html").name(), "html");
        assert_eq!(parser.parser_for("unknown.bin").name(), "plain_text");
    }

    #[test]
    fn test_parse_dispatches() {
        let parser = AutoParser::new();
        let input = ParserInput::new("doc.md", "# Heading\n\nBody text.".as_bytes());

        let text = parser.parse(&input).unwrap();
        assert!(text.contains("Heading"));
        assert!(text.contains("Body text."));
    }
}
