//! Knowledge base service - lifecycle of knowledge base configuration

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::domain::docstore::DocumentStore;
use crate::domain::ingestion::ChunkingConfig;
use crate::domain::knowledge_base::{coerce_params, KnowledgeBase, KnowledgeBaseId};
use crate::domain::storage::Storage;
use crate::domain::vector::VectorBackend;
use crate::domain::DomainError;

/// Parameter names the chunker consumes from the client's splitter config
const PARAM_CHUNK_SIZE: &str = "chunk_size";
const PARAM_CHUNK_OVERLAP: &str = "chunk_overlap";

/// Request to create a new knowledge base
#[derive(Debug, Clone)]
pub struct CreateKnowledgeBaseRequest {
    /// Display name; the id is derived from it
    pub name: String,
    /// String-typed splitter parameters as supplied by the client
    pub splitter_config: HashMap<String, String>,
}

/// Knowledge base service for create/list/get/delete
pub struct KnowledgeBaseService {
    storage: Arc<dyn Storage<KnowledgeBase>>,
    doc_store: Arc<dyn DocumentStore>,
    vector_backend: Arc<dyn VectorBackend>,
}

impl std::fmt::Debug for KnowledgeBaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBaseService").finish()
    }
}

impl KnowledgeBaseService {
    /// Create a new service with the given storage and index backends
    pub fn new(
        storage: Arc<dyn Storage<KnowledgeBase>>,
        doc_store: Arc<dyn DocumentStore>,
        vector_backend: Arc<dyn VectorBackend>,
    ) -> Self {
        Self {
            storage,
            doc_store,
            vector_backend,
        }
    }

    /// Get a knowledge base by ID
    pub async fn get(&self, id: &str) -> Result<Option<KnowledgeBase>, DomainError> {
        let kb_id = parse_kb_id(id)?;
        self.storage.get(kb_id.as_str()).await
    }

    /// Get a knowledge base by ID, returning an error if not found
    pub async fn get_required(&self, id: &str) -> Result<KnowledgeBase, DomainError> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Knowledge base '{}' not found", id)))
    }

    /// List all knowledge bases
    pub async fn list(&self) -> Result<Vec<KnowledgeBase>, DomainError> {
        self.storage.list().await
    }

    /// Check if a knowledge base exists
    pub async fn exists(&self, id: &str) -> Result<bool, DomainError> {
        let kb_id = parse_kb_id(id)?;
        self.storage.exists(kb_id.as_str()).await
    }

    /// Create a new knowledge base.
    ///
    /// Splitter parameters arrive as strings and are coerced int -> float ->
    /// string before the chunking configuration is extracted and validated.
    pub async fn create(
        &self,
        request: CreateKnowledgeBaseRequest,
    ) -> Result<KnowledgeBase, DomainError> {
        let kb_id = KnowledgeBaseId::from_name(&request.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if self.storage.exists(kb_id.as_str()).await? {
            return Err(DomainError::conflict(format!(
                "Knowledge base '{}' already exists",
                kb_id
            )));
        }

        let params = coerce_params(&request.splitter_config);
        let defaults = ChunkingConfig::default();

        let chunk_size = params
            .get(PARAM_CHUNK_SIZE)
            .and_then(|p| p.as_usize())
            .unwrap_or(defaults.chunk_size);
        let chunk_overlap = params
            .get(PARAM_CHUNK_OVERLAP)
            .and_then(|p| p.as_usize())
            .unwrap_or(defaults.chunk_overlap);

        let chunking = ChunkingConfig::new(chunk_size, chunk_overlap);
        chunking.validate()?;

        let kb = KnowledgeBase::new(kb_id, request.name, chunking).with_splitter_params(params);

        let kb = self.storage.create(kb).await?;
        info!(kb_id = %kb.id(), "knowledge base created");
        Ok(kb)
    }

    /// Delete a knowledge base together with its document-store and vector
    /// namespaces. Returns false when the id was unknown.
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let kb_id = parse_kb_id(id)?;

        let deleted = self.storage.delete(kb_id.as_str()).await?;
        if deleted {
            self.doc_store.delete_namespace(&kb_id).await?;
            self.vector_backend.delete_namespace(&kb_id).await?;
            info!(%kb_id, "knowledge base deleted");
        }

        Ok(deleted)
    }
}

/// Parse and validate a knowledge base ID string
pub(crate) fn parse_kb_id(id: &str) -> Result<KnowledgeBaseId, DomainError> {
    KnowledgeBaseId::new(id).map_err(|e| DomainError::validation(e.to_string()))
}
