//! Retrieval service - query entry point over the retriever factory

use std::sync::Arc;

use crate::domain::chunk::ScoredChunk;
use crate::domain::retrieval::{Retriever, RetrieverMode};
use crate::domain::DomainError;
use crate::infrastructure::retrieval::RetrieverFactory;

use super::knowledge_base_service::parse_kb_id;

/// Retrieval service handing out retrievers and running queries
pub struct RetrievalService {
    factory: RetrieverFactory,
}

impl std::fmt::Debug for RetrievalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService").finish()
    }
}

impl RetrievalService {
    pub fn new(factory: RetrieverFactory) -> Self {
        Self { factory }
    }

    /// Build a retriever handle for downstream consumers (e.g. an answer
    /// generation stage) that want to run several queries.
    pub async fn retriever(
        &self,
        kb_id: &str,
        top_k: usize,
        mode: RetrieverMode,
    ) -> Result<Arc<dyn Retriever>, DomainError> {
        let kb_id = parse_kb_id(kb_id)?;
        self.factory.get(&kb_id, top_k, mode).await
    }

    /// One-shot query: build a retriever and search.
    pub async fn query(
        &self,
        kb_id: &str,
        query: &str,
        top_k: usize,
        mode: RetrieverMode,
    ) -> Result<Vec<ScoredChunk>, DomainError> {
        let retriever = self.retriever(kb_id, top_k, mode).await?;
        retriever.search(query).await
    }
}
