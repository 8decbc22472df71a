//! Vector index backend contract
//!
//! Two backends satisfy this trait: a local on-disk persisted index that is
//! loaded fully into memory on build, and a remote document-database-backed
//! index. Which one a deployment uses is decided once from configuration and
//! injected - callers never branch on the backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::chunk::Chunk;
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::DomainError;

/// An embedding vector together with the chunk it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

impl VectorRecord {
    pub fn new(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self { chunk, vector }
    }
}

/// Embedding storage, one namespace per knowledge base.
#[async_trait]
pub trait VectorBackend: Send + Sync + Debug {
    /// Idempotent upsert by chunk id, preserving insertion order for
    /// records that already exist.
    async fn add(
        &self,
        kb_id: &KnowledgeBaseId,
        records: Vec<VectorRecord>,
    ) -> Result<(), DomainError>;

    /// All records of the namespace, in insertion order.
    async fn load(&self, kb_id: &KnowledgeBaseId) -> Result<Vec<VectorRecord>, DomainError>;

    /// Drop the whole namespace. Removing an absent namespace is not an
    /// error.
    async fn delete_namespace(&self, kb_id: &KnowledgeBaseId) -> Result<(), DomainError>;

    /// Get the backend name
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    /// In-memory vector backend for testing
    #[derive(Debug, Default)]
    pub struct MockVectorBackend {
        namespaces: RwLock<HashMap<String, Vec<VectorRecord>>>,
        fail_with: RwLock<Option<String>>,
    }

    impl MockVectorBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every operation fail with a storage error.
        pub async fn set_fail_with(&self, message: impl Into<String>) {
            *self.fail_with.write().await = Some(message.into());
        }

        /// Let operations succeed again.
        pub async fn clear_failure(&self) {
            *self.fail_with.write().await = None;
        }

        async fn check_failure(&self) -> Result<(), DomainError> {
            if let Some(message) = self.fail_with.read().await.clone() {
                return Err(DomainError::storage(message));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl VectorBackend for MockVectorBackend {
        async fn add(
            &self,
            kb_id: &KnowledgeBaseId,
            records: Vec<VectorRecord>,
        ) -> Result<(), DomainError> {
            self.check_failure().await?;

            let mut namespaces = self.namespaces.write().await;
            let stored = namespaces.entry(kb_id.as_str().to_string()).or_default();

            for record in records {
                if let Some(existing) = stored.iter_mut().find(|r| r.chunk.id == record.chunk.id) {
                    *existing = record;
                } else {
                    stored.push(record);
                }
            }

            Ok(())
        }

        async fn load(&self, kb_id: &KnowledgeBaseId) -> Result<Vec<VectorRecord>, DomainError> {
            self.check_failure().await?;

            Ok(self
                .namespaces
                .read()
                .await
                .get(kb_id.as_str())
                .cloned()
                .unwrap_or_default())
        }

        async fn delete_namespace(&self, kb_id: &KnowledgeBaseId) -> Result<(), DomainError> {
            self.check_failure().await?;

            self.namespaces.write().await.remove(kb_id.as_str());
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "mock"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_add_is_idempotent_by_chunk_id() {
            let backend = MockVectorBackend::new();
            let kb = KnowledgeBaseId::new("test-kb").unwrap();
            let chunk = Chunk::from_split("a.txt", "text", 0, 1, 0, 4);
            let record = VectorRecord::new(chunk, vec![1.0, 0.0]);

            backend.add(&kb, vec![record.clone()]).await.unwrap();
            backend.add(&kb, vec![record]).await.unwrap();

            assert_eq!(backend.load(&kb).await.unwrap().len(), 1);
        }
    }
}
