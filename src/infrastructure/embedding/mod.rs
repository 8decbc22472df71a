//! Embedding provider implementations

mod hashing;
mod openai;

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbeddingProvider;
