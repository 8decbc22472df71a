//! Redb-backed local document store
//!
//! Uses [redb](https://github.com/cberner/redb), a pure-Rust embedded
//! B-tree database. Chunks are keyed `<kb_id>/<chunk_id>` and carry a
//! per-namespace insertion ordinal; upserts keep the original ordinal so
//! re-ingestion neither duplicates nor reorders. The database file is
//! exclusively owned by one process - concurrent writers must be serialized
//! by the caller.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use serde::{Deserialize, Serialize};

use crate::domain::chunk::Chunk;
use crate::domain::docstore::DocumentStore;
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::DomainError;

const CHUNKS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("chunks");
const ORD_TABLE: TableDefinition<&str, u64> = TableDefinition::new("ord_counters");

#[derive(Debug, Serialize, Deserialize)]
struct StoredChunk {
    ord: u64,
    chunk: Chunk,
}

/// Key range covering one namespace. '0' is the ASCII successor of the
/// '/' separator, and kb ids cannot contain either character.
fn namespace_range(kb_id: &KnowledgeBaseId) -> (String, String) {
    (format!("{}/", kb_id), format!("{}0", kb_id))
}

/// Local on-disk document store.
pub struct LocalDocumentStore {
    db: Arc<Database>,
}

impl LocalDocumentStore {
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

impl std::fmt::Debug for LocalDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalDocumentStore").finish()
    }
}

fn storage_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::storage(format!("Document store error: {}", e))
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn add(&self, kb_id: &KnowledgeBaseId, chunks: &[Chunk]) -> Result<(), DomainError> {
        let txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = txn.open_table(CHUNKS_TABLE).map_err(storage_err)?;
            let mut counters = txn.open_table(ORD_TABLE).map_err(storage_err)?;

            let mut next_ord = counters
                .get(kb_id.as_str())
                .map_err(storage_err)?
                .map(|guard| guard.value())
                .unwrap_or(0);

            for chunk in chunks {
                let key = format!("{}/{}", kb_id, chunk.id);

                let ord = match table.get(key.as_str()).map_err(storage_err)? {
                    Some(existing) => serde_json::from_slice::<StoredChunk>(existing.value())
                        .map_err(storage_err)?
                        .ord,
                    None => {
                        let ord = next_ord;
                        next_ord += 1;
                        ord
                    }
                };

                let stored = StoredChunk {
                    ord,
                    chunk: chunk.clone(),
                };
                let bytes = serde_json::to_vec(&stored).map_err(storage_err)?;
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

    async fn get_all(&self, kb_id: &KnowledgeBaseId) -> Result<Vec<Chunk>, DomainError> {
        let txn = self.db.begin_read().map_err(storage_err)?;
        let table = match txn.open_table(CHUNKS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(storage_err(e)),
        };

        let (start, end) = namespace_range(kb_id);
        let mut records: Vec<StoredChunk> = Vec::new();

        for item in table
            .range(start.as_str()..end.as_str())
            .map_err(storage_err)?
        {
            let (_, value) = item.map_err(storage_err)?;
            records.push(serde_json::from_slice(value.value()).map_err(storage_err)?);
        }

        records.sort_by_key(|record| record.ord);
        Ok(records.into_iter().map(|record| record.chunk).collect())
    }

    async fn file_exists(
        &self,
        kb_id: &KnowledgeBaseId,
        filename: &str,
    ) -> Result<bool, DomainError> {
        let chunks = self.get_all(kb_id).await?;
        Ok(chunks.iter().any(|chunk| chunk.source() == Some(filename)))
    }

    async fn delete_namespace(&self, kb_id: &KnowledgeBaseId) -> Result<(), DomainError> {
        let txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = txn.open_table(CHUNKS_TABLE).map_err(storage_err)?;
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
}
