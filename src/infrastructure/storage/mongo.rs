//! MongoDB-backed entity storage

use std::marker::PhantomData;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Client;

use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::DomainError;

fn storage_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::storage(format!("Config store error: {}", e))
}

/// Entity storage in a document database collection named after the entity
/// type. A client is created per operation and dropped on every exit path.
///
/// Entities are stored as their own documents and looked up by their `id`
/// field; the database-assigned `_id` is ignored on read.
#[derive(Clone)]
pub struct MongoStorage<E: StorageEntity> {
    uri: String,
    db_name: String,
    _entity: PhantomData<E>,
}

impl<E: StorageEntity> MongoStorage<E> {
    /// Configure a storage; no connection is made until an operation runs.
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
            _entity: PhantomData,
        }
    }

    async fn collection(&self) -> Result<mongodb::Collection<E>, DomainError> {
        let client = Client::with_uri_str(&self.uri)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to {}: {}", self.db_name, e)))?;

        Ok(client.database(&self.db_name).collection::<E>(E::collection()))
    }
}

impl<E: StorageEntity> std::fmt::Debug for MongoStorage<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoStorage")
            .field("collection", &E::collection())
            .finish()
    }
}

#[async_trait]
impl<E: StorageEntity> Storage<E> for MongoStorage<E> {
    async fn get(&self, key: &str) -> Result<Option<E>, DomainError> {
        let collection = self.collection().await?;
        collection
            .find_one(doc! {"id": key})
            .await
            .map_err(storage_err)
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let collection = self.collection().await?;
        let mut cursor = collection.find(doc! {}).await.map_err(storage_err)?;

        let mut entities = Vec::new();
        while let Some(entity) = cursor.try_next().await.map_err(storage_err)? {
            entities.push(entity);
        }

        Ok(entities)
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let collection = self.collection().await?;

        let existing = collection
            .find_one(doc! {"id": entity.key()})
            .await
            .map_err(storage_err)?;
        if existing.is_some() {
            return Err(DomainError::conflict(format!(
                "Entity '{}' already exists",
                entity.key()
            )));
        }

        collection.insert_one(&entity).await.map_err(storage_err)?;
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let collection = self.collection().await?;

        let result = collection
            .replace_one(doc! {"id": entity.key()}, &entity)
            .await
            .map_err(storage_err)?;

        if result.matched_count == 0 {
            return Err(DomainError::not_found(format!(
                "Entity '{}' not found",
                entity.key()
            )));
        }

        Ok(entity)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let collection = self.collection().await?;
        let result = collection
            .delete_one(doc! {"id": key})
            .await
            .map_err(storage_err)?;

        Ok(result.deleted_count > 0)
    }
}
