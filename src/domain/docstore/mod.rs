//! Document store contract
//!
//! A durable mapping from chunk id to chunk content and metadata, namespaced
//! per knowledge base. The lexical index is rebuilt from this store, so
//! `get_all` must return chunks in their original insertion order - that
//! order is the tie-breaker for equal relevance scores.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::chunk::Chunk;
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::DomainError;

/// Durable chunk storage, one namespace per knowledge base.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Idempotent upsert: re-adding a chunk with a known id overwrites its
    /// text and metadata instead of duplicating, and keeps its original
    /// position in the insertion order.
    async fn add(&self, kb_id: &KnowledgeBaseId, chunks: &[Chunk]) -> Result<(), DomainError>;

    /// All chunks of the namespace, in insertion order.
    async fn get_all(&self, kb_id: &KnowledgeBaseId) -> Result<Vec<Chunk>, DomainError>;

    /// Whether any chunk of the namespace originated from `filename`,
    /// checked via source metadata.
    async fn file_exists(
        &self,
        kb_id: &KnowledgeBaseId,
        filename: &str,
    ) -> Result<bool, DomainError>;

    /// Drop the whole namespace. Removing an absent namespace is not an
    /// error.
    async fn delete_namespace(&self, kb_id: &KnowledgeBaseId) -> Result<(), DomainError>;
}
