//! Ingestion infrastructure: chunker and parser implementations

pub mod chunkers;
pub mod parsers;

pub use chunkers::SentenceChunker;
pub use parsers::{AutoParser, HtmlParser, MarkdownParser, PlainTextParser};
