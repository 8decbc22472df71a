//! In-memory entity storage for development and testing

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::DomainError;

/// In-memory storage backed by a map, with creation order preserved for
/// `list`.
pub struct InMemoryStorage<E: StorageEntity> {
    entities: RwLock<HashMap<String, E>>,
    order: RwLock<Vec<String>>,
}

impl<E: StorageEntity> InMemoryStorage<E> {
    /// Create an empty storage
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            order: RwLock::new(Vec::new()),
        }
    }
}

impl<E: StorageEntity> Default for InMemoryStorage<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: StorageEntity> std::fmt::Debug for InMemoryStorage<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("collection", &E::collection())
            .finish()
    }
}

#[async_trait]
impl<E: StorageEntity> Storage<E> for InMemoryStorage<E> {
    async fn get(&self, key: &str) -> Result<Option<E>, DomainError> {
        Ok(self.entities.read().await.get(key).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let entities = self.entities.read().await;
        let order = self.order.read().await;

        Ok(order
            .iter()
            .filter_map(|key| entities.get(key).cloned())
            .collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().to_string();
        let mut entities = self.entities.write().await;

        if entities.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Entity '{}' already exists",
                key
            )));
        }

        entities.insert(key.clone(), entity.clone());
        self.order.write().await.push(key);
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().to_string();
        let mut entities = self.entities.write().await;

        if !entities.contains_key(&key) {
            return Err(DomainError::not_found(format!("Entity '{}' not found", key)));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let removed = self.entities.write().await.remove(key).is_some();
        if removed {
            self.order.write().await.retain(|k| k != key);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingestion::ChunkingConfig;
    use crate::domain::knowledge_base::{KnowledgeBase, KnowledgeBaseId};

    fn kb(id: &str) -> KnowledgeBase {
        KnowledgeBase::new(
            KnowledgeBaseId::new(id).unwrap(),
            id.to_string(),
            ChunkingConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage = InMemoryStorage::new();
        storage.create(kb("zoo")).await.unwrap();

        let loaded = storage.get("zoo").await.unwrap();
        assert!(loaded.is_some());
        assert_eq!(loaded.unwrap().id().as_str(), "zoo");
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let storage = InMemoryStorage::new();
        storage.create(kb("zoo")).await.unwrap();

        let result = storage.create(kb("zoo")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_entity_fails() {
        let storage = InMemoryStorage::new();
        let result = storage.update(kb("zoo")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_preserves_creation_order() {
        let storage = InMemoryStorage::new();
        storage.create(kb("zebra")).await.unwrap();
        storage.create(kb("aardvark")).await.unwrap();

        let listed = storage.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id().as_str(), "zebra");
        assert_eq!(listed[1].id().as_str(), "aardvark");
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = InMemoryStorage::new();
        storage.create(kb("zoo")).await.unwrap();

        assert!(storage.delete("zoo").await.unwrap());
        assert!(!storage.delete("zoo").await.unwrap());
        assert!(storage.get("zoo").await.unwrap().is_none());
    }
}
