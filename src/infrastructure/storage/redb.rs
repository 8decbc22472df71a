//! Redb-backed entity storage

use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use serde::{Deserialize, Serialize};

use crate::domain::storage::{Storage, StorageEntity};
use crate::domain::DomainError;

const ORD_TABLE: TableDefinition<&str, u64> = TableDefinition::new("ord_counters");

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntity<E> {
    ord: u64,
    entity: E,
}

fn storage_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::storage(format!("Config store error: {}", e))
}

/// Local on-disk entity storage. One table per entity type, with a
/// creation ordinal so `list` returns entities in creation order.
pub struct RedbStorage<E: StorageEntity> {
    db: Arc<Database>,
    _entity: PhantomData<E>,
}

impl<E: StorageEntity> RedbStorage<E> {
    /// Open or create the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::storage(format!("Failed to create {:?}: {}", parent, e)))?;
        }

        let db = Database::create(path)
            .map_err(|e| DomainError::storage(format!("Failed to open {:?}: {}", path, e)))?;

        Ok(Self {
            db: Arc::new(db),
            _entity: PhantomData,
        })
    }

    fn table() -> TableDefinition<'static, &'static str, &'static [u8]> {
        TableDefinition::new(E::collection())
    }

    fn put(&self, entity: &E, require_absent: bool) -> Result<(), DomainError> {
        let txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = txn.open_table(Self::table()).map_err(storage_err)?;
            let mut counters = txn.open_table(ORD_TABLE).map_err(storage_err)?;

            let existing_ord = match table.get(entity.key()).map_err(storage_err)? {
                Some(existing) => Some(
                    serde_json::from_slice::<StoredEntity<E>>(existing.value())
                        .map_err(storage_err)?
                        .ord,
                ),
                None => None,
            };

            if require_absent && existing_ord.is_some() {
                return Err(DomainError::conflict(format!(
                    "Entity '{}' already exists",
                    entity.key()
                )));
            }

            let ord = match existing_ord {
                Some(ord) => ord,
                None => {
                    let next = counters
                        .get(E::collection())
                        .map_err(storage_err)?
                        .map(|guard| guard.value())
                        .unwrap_or(0);
                    counters
                        .insert(E::collection(), next + 1)
                        .map_err(storage_err)?;
                    next
                }
            };

            let bytes = serde_json::to_vec(&StoredEntity {
                ord,
                entity: entity.clone(),
            })
            .map_err(storage_err)?;
            table
                .insert(entity.key(), bytes.as_slice())
                .map_err(storage_err)?;
        }
        txn.commit().map_err(storage_err)?;

        Ok(())
    }
}

impl<E: StorageEntity> std::fmt::Debug for RedbStorage<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStorage")
            .field("collection", &E::collection())
            .finish()
    }
}

#[async_trait]
impl<E: StorageEntity> Storage<E> for RedbStorage<E> {
    async fn get(&self, key: &str) -> Result<Option<E>, DomainError> {
        let txn = self.db.begin_read().map_err(storage_err)?;
        let table = match txn.open_table(Self::table()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(storage_err(e)),
        };

        match table.get(key).map_err(storage_err)? {
            Some(value) => {
                let stored: StoredEntity<E> =
                    serde_json::from_slice(value.value()).map_err(storage_err)?;
                Ok(Some(stored.entity))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let txn = self.db.begin_read().map_err(storage_err)?;
        let table = match txn.open_table(Self::table()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(storage_err(e)),
        };

        let mut stored: Vec<StoredEntity<E>> = Vec::new();
        for item in table.iter().map_err(storage_err)? {
            let (_, value) = item.map_err(storage_err)?;
            stored.push(serde_json::from_slice(value.value()).map_err(storage_err)?);
        }

        stored.sort_by_key(|entry| entry.ord);
        Ok(stored.into_iter().map(|entry| entry.entity).collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        self.put(&entity, true)?;
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        if self.get(entity.key()).await?.is_none() {
            return Err(DomainError::not_found(format!(
                "Entity '{}' not found",
                entity.key()
            )));
        }

        self.put(&entity, false)?;
        Ok(entity)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let txn = self.db.begin_write().map_err(storage_err)?;
        let removed = {
            let mut table = txn.open_table(Self::table()).map_err(storage_err)?;
            table.remove(key).map_err(storage_err)?.is_some()
        };
        txn.commit().map_err(storage_err)?;

        Ok(removed)
    }
}
