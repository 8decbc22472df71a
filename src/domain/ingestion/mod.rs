//! Ingestion domain: splitting and parsing contracts

mod chunker;
mod parser;

pub use chunker::{ChunkingConfig, ChunkingStrategy, Segment};
pub use parser::{DocumentParser, ParserInput};
