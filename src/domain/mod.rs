//! Domain layer: data model, contracts, and errors of the retrieval core

pub mod chunk;
pub mod docstore;
pub mod embedding;
pub mod error;
pub mod ingestion;
pub mod knowledge_base;
pub mod retrieval;
pub mod storage;
pub mod vector;

pub use chunk::{Chunk, ScoredChunk};
pub use docstore::DocumentStore;
pub use embedding::EmbeddingProvider;
pub use error::DomainError;
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseId};
pub use retrieval::{Retriever, RetrieverMode};
pub use storage::{Storage, StorageEntity};
pub use vector::{VectorBackend, VectorRecord};
