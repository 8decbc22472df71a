//! Generic entity storage contract
//!
//! Configuration records (currently only [`KnowledgeBase`]) are persisted
//! through this trait so that the backing store - in-memory, local redb, or
//! a remote document database - is injected at construction time instead of
//! living in a process-wide singleton.
//!
//! [`KnowledgeBase`]: crate::domain::knowledge_base::KnowledgeBase

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::DomainError;

/// An entity that can be persisted by a [`Storage`] backend.
pub trait StorageEntity:
    Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static
{
    /// The unique key of this entity
    fn key(&self) -> &str;

    /// The table/collection this entity type lives in
    fn collection() -> &'static str;
}

/// Generic storage trait for CRUD operations on one entity type
#[async_trait]
pub trait Storage<E: StorageEntity>: Send + Sync + Debug {
    /// Retrieves an entity by its key
    async fn get(&self, key: &str) -> Result<Option<E>, DomainError>;

    /// Retrieves all entities
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Creates a new entity, returns a conflict error if it already exists
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Updates an existing entity, returns an error if not found
    async fn update(&self, entity: E) -> Result<E, DomainError>;

    /// Deletes an entity by its key, returns true if deleted
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Checks if an entity exists by its key
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }
}
