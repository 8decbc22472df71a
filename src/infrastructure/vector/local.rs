//! Redb-backed local vector backend
//!
//! Embedding records live in their own database file, keyed
//! `<kb_id>/<chunk_id>` with a per-namespace insertion ordinal, mirroring
//! the local document store. `load` reads the entire namespace into memory;
//! the retriever scores against the in-memory snapshot. One process owns
//! the file at a time.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use serde::{Deserialize, Serialize};

use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::vector::{VectorBackend, VectorRecord};
use crate::domain::DomainError;

const VECTORS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("vectors");
const ORD_TABLE: TableDefinition<&str, u64> = TableDefinition::new("ord_counters");

#[derive(Debug, Serialize, Deserialize)]
struct StoredVector {
    ord: u64,
    record: VectorRecord,
}

fn namespace_range(kb_id: &KnowledgeBaseId) -> (String, String) {
    (format!("{}/", kb_id), format!("{}0", kb_id))
}

fn storage_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::storage(format!("Vector store error: {}", e))
}

/// Local on-disk vector index backend.
pub struct LocalVectorBackend {
    db: Arc<Database>,
}

impl LocalVectorBackend {
    /// Open or create the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::storage(format!("Failed to create {:?}: {}", parent, e)))?;
        }

        let db = Database::create(path)
            .map_err(|e| DomainError::storage(format!("Failed to open {:?}: {}", path, e)))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl std::fmt::Debug for LocalVectorBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalVectorBackend").finish()
    }
}

#[async_trait]
impl VectorBackend for LocalVectorBackend {
    async fn add(
        &self,
        kb_id: &KnowledgeBaseId,
        records: Vec<VectorRecord>,
    ) -> Result<(), DomainError> {
        let txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = txn.open_table(VECTORS_TABLE).map_err(storage_err)?;
            let mut counters = txn.open_table(ORD_TABLE).map_err(storage_err)?;

            let mut next_ord = counters
                .get(kb_id.as_str())
                .map_err(storage_err)?
                .map(|guard| guard.value())
                .unwrap_or(0);

            for record in records {
                let key = format!("{}/{}", kb_id, record.chunk.id);

                let ord = match table.get(key.as_str()).map_err(storage_err)? {
                    Some(existing) => serde_json::from_slice::<StoredVector>(existing.value())
                        .map_err(storage_err)?
                        .ord,
                    None => {
                        let ord = next_ord;
                        next_ord += 1;
                        ord
                    }
                };

                let bytes =
                    serde_json::to_vec(&StoredVector { ord, record }).map_err(storage_err)?;
                table
                    .insert(key.as_str(), bytes.as_slice())
                    .map_err(storage_err)?;
            }

            counters
                .insert(kb_id.as_str(), next_ord)
                .map_err(storage_err)?;
        }
        txn.commit().map_err(storage_err)?;

        Ok(())
    }

    async fn load(&self, kb_id: &KnowledgeBaseId) -> Result<Vec<VectorRecord>, DomainError> {
        let txn = self.db.begin_read().map_err(storage_err)?;
        let table = match txn.open_table(VECTORS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(storage_err(e)),
        };

        let (start, end) = namespace_range(kb_id);
        let mut stored: Vec<StoredVector> = Vec::new();

        for item in table
            .range(start.as_str()..end.as_str())
            .map_err(storage_err)?
        {
            let (_, value) = item.map_err(storage_err)?;
            stored.push(serde_json::from_slice(value.value()).map_err(storage_err)?);
        }

        stored.sort_by_key(|entry| entry.ord);
        Ok(stored.into_iter().map(|entry| entry.record).collect())
    }

    async fn delete_namespace(&self, kb_id: &KnowledgeBaseId) -> Result<(), DomainError> {
        let txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = txn.open_table(VECTORS_TABLE).map_err(storage_err)?;
            let (start, end) = namespace_range(kb_id);

            let mut keys = Vec::new();
            for item in table
                .range(start.as_str()..end.as_str())
                .map_err(storage_err)?
            {
                let (key, _) = item.map_err(storage_err)?;
                keys.push(key.value().to_string());
            }

            for key in keys {
                table.remove(key.as_str()).map_err(storage_err)?;
            }

            let mut counters = txn.open_table(ORD_TABLE).map_err(storage_err)?;
            counters.remove(kb_id.as_str()).map_err(storage_err)?;
        }
        txn.commit().map_err(storage_err)?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}
