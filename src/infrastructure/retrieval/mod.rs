//! Retriever factory
//!
//! Builds a ready-to-query retriever for one knowledge base: lexical
//! retrievers from the document store's chunk snapshot, vector retrievers
//! from the vector backend's record snapshot. Callers pick a mode and a
//! `top_k`; everything else is injected at construction time.

use std::sync::Arc;

use tracing::debug;

use crate::domain::docstore::DocumentStore;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::retrieval::{Retriever, RetrieverMode};
use crate::domain::vector::VectorBackend;
use crate::domain::DomainError;
use crate::infrastructure::lexical::LexicalRetriever;
use crate::infrastructure::vector::VectorRetriever;

/// Factory producing mode-agnostic retriever handles.
#[derive(Debug)]
pub struct RetrieverFactory {
    doc_store: Arc<dyn DocumentStore>,
    vector_backend: Arc<dyn VectorBackend>,
    embedder: Arc<dyn EmbeddingProvider>,
    language: String,
}

impl RetrieverFactory {
    pub fn new(
        doc_store: Arc<dyn DocumentStore>,
        vector_backend: Arc<dyn VectorBackend>,
        embedder: Arc<dyn EmbeddingProvider>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            doc_store,
            vector_backend,
            embedder,
            language: language.into(),
        }
    }

    /// Build a retriever bound to `kb_id` and `top_k`.
    ///
    /// Fails with a configuration error for `top_k == 0` and with not-found
    /// when the knowledge base has no indexed chunks.
    pub async fn get(
        &self,
        kb_id: &KnowledgeBaseId,
        top_k: usize,
        mode: RetrieverMode,
    ) -> Result<Arc<dyn Retriever>, DomainError> {
        if top_k == 0 {
            return Err(DomainError::configuration("top_k must be greater than 0"));
        }

        debug!(%kb_id, top_k, %mode, "building retriever");

        match mode {
            RetrieverMode::Lexical => {
                let chunks = self.doc_store.get_all(kb_id).await?;
                if chunks.is_empty() {
                    return Err(Self::empty_kb(kb_id));
                }

                let retriever = LexicalRetriever::build(chunks, &self.language, top_k)?;
                Ok(Arc::new(retriever))
            }
            RetrieverMode::Vector => {
                let records = self.vector_backend.load(kb_id).await?;
                if records.is_empty() {
                    return Err(Self::empty_kb(kb_id));
                }

                let retriever = VectorRetriever::new(records, self.embedder.clone(), top_k);
                Ok(Arc::new(retriever))
            }
        }
    }

    fn empty_kb(kb_id: &KnowledgeBaseId) -> DomainError {
        DomainError::not_found(format!("Knowledge base '{}' has no indexed chunks", kb_id))
    }
}
