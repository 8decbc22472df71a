//! Document store on a MongoDB-compatible document database
//!
//! One collection per knowledge base, named `chunks_<kb_id>`. Mirrors the
//! remote vector backend's connection policy: a client per operation,
//! released on every exit path, and insertion ordinals reserved from the
//! shared `counters` collection.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::Client;
use serde::{Deserialize, Serialize};

use crate::domain::chunk::{Chunk, META_SOURCE};
use crate::domain::docstore::DocumentStore;
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::DomainError;

#[derive(Debug, Serialize, Deserialize)]
struct ChunkDoc {
    #[serde(rename = "_id")]
    id: String,
    ord: i64,
    text: String,
    metadata: HashMap<String, String>,
}

fn storage_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::storage(format!("Document store error: {}", e))
}

/// Document store scoped by `(db_name, collection per kb)`.
#[derive(Debug, Clone)]
pub struct MongoDocumentStore {
    uri: String,
    db_name: String,
}

impl MongoDocumentStore {
    /// Configure a store; no connection is made until an operation runs.
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
        }
    }

    fn collection_name(kb_id: &KnowledgeBaseId) -> String {
        format!("chunks_{}", kb_id)
    }

    async fn connect(&self) -> Result<Client, DomainError> {
        Client::with_uri_str(&self.uri)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to {}: {}", self.db_name, e)))
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn add(&self, kb_id: &KnowledgeBaseId, chunks: &[Chunk]) -> Result<(), DomainError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let client = self.connect().await?;
        let db = client.database(&self.db_name);
        let name = Self::collection_name(kb_id);
        let collection = db.collection::<ChunkDoc>(&name);

        let counters = db.collection::<Document>("counters");
        let counter = counters
            .find_one_and_update(
                doc! {"_id": name.as_str()},
                doc! {"$inc": {"seq": chunks.len() as i64}},
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(storage_err)?;

        let end = counter
            .and_then(|d| d.get_i64("seq").ok())
            .unwrap_or(chunks.len() as i64);
        let start = end - chunks.len() as i64;

        for (offset, chunk) in chunks.iter().enumerate() {
            let metadata = mongodb::bson::to_bson(&chunk.metadata).map_err(storage_err)?;

            collection
                .update_one(
                    doc! {"_id": chunk.id.as_str()},
                    doc! {
                        "$set": {"text": chunk.text.as_str(), "metadata": metadata},
                        "$setOnInsert": {"ord": start + offset as i64},
                    },
                )
                .upsert(true)
                .await
                .map_err(storage_err)?;
        }

        Ok(())
    }

    async fn get_all(&self, kb_id: &KnowledgeBaseId) -> Result<Vec<Chunk>, DomainError> {
        let client = self.connect().await?;
        let collection = client
            .database(&self.db_name)
            .collection::<ChunkDoc>(&Self::collection_name(kb_id));

        let mut cursor = collection
            .find(doc! {})
            .sort(doc! {"ord": 1})
            .await
            .map_err(storage_err)?;

        let mut chunks = Vec::new();
        while let Some(entry) = cursor.try_next().await.map_err(storage_err)? {
            chunks.push(Chunk {
                id: entry.id,
                text: entry.text,
                metadata: entry.metadata,
            });
        }

        Ok(chunks)
    }

    async fn file_exists(
        &self,
        kb_id: &KnowledgeBaseId,
        filename: &str,
    ) -> Result<bool, DomainError> {
        let client = self.connect().await?;
        let collection = client
            .database(&self.db_name)
            .collection::<ChunkDoc>(&Self::collection_name(kb_id));

        let key = format!("metadata.{}", META_SOURCE);
        let found = collection
            .find_one(doc! {key: filename})
            .await
            .map_err(storage_err)?;

        Ok(found.is_some())
    }

    async fn delete_namespace(&self, kb_id: &KnowledgeBaseId) -> Result<(), DomainError> {
        let client = self.connect().await?;
        let db = client.database(&self.db_name);
        let name = Self::collection_name(kb_id);

        db.collection::<ChunkDoc>(&name)
            .drop()
            .await
            .map_err(storage_err)?;
        db.collection::<Document>("counters")
            .delete_one(doc! {"_id": name.as_str()})
            .await
            .map_err(storage_err)?;

        Ok(())
    }
}
