//! HTML document parser

use scraper::{ElementRef, Html, Selector};

use crate::domain::ingestion::{DocumentParser, ParserInput};
use crate::domain::DomainError;

/// Parser for HTML files: extracts body text, skipping scripts and styles.
#[derive(Debug, Clone, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    fn extract_element_text(element: &ElementRef, text: &mut String) {
        for node in element.children() {
            if let Some(el) = ElementRef::wrap(node) {
                let tag = el.value().name();

                if matches!(tag, "script" | "style" | "noscript" | "head") {
                    continue;
                }

                Self::extract_element_text(&el, text);

                if matches!(
                    tag,
                    "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "br" | "li" | "tr"
                ) && !text.ends_with('\n')
                {
                    text.push('\n');
                }
            } else if let Some(t) = node.value().as_text() {
                text.push_str(t);
            }
        }
    }

    fn extract_text(html: &str) -> String {
        let document = Html::parse_document(html);
        let body_selector = Selector::parse("body").expect("static selector");

        let mut text = String::new();
        if let Some(body) = document.select(&body_selector).next() {
            Self::extract_element_text(&body, &mut text);
        } else {
            text = document.root_element().text().collect();
        }

        // Collapse runs of whitespace within lines, keep line structure
        text.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DocumentParser for HtmlParser {
    fn parse(&self, input: &ParserInput) -> Result<String, DomainError> {
        let raw = input.as_text()?;
        Ok(Self::extract_text(&raw))
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_body_text() {
        let parser = HtmlParser::new();
        let input = ParserInput::new(
            "page.html",
            "<html><head><title>T</title></head>\
             <body><h1>Animals</h1><p>Giraffes eat leaves.</p>\
             <script>var x = 1;</script></body></html>"
                .as_bytes(),
        );

        let text = parser.parse(&input).unwrap();

        assert!(text.contains("Animals"));
        assert!(text.contains("Giraffes eat leaves."));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let parser = HtmlParser::new();
        let input = ParserInput::new(
            "page.html",
            "<body><p>  spaced    out  </p></body>".as_bytes(),
        );

        assert_eq!(parser.parse(&input).unwrap(), "spaced out");
    }
}
