//! Remote vector backend on a MongoDB-compatible document database
//!
//! One collection per knowledge base, named `vectors_<kb_id>`, inside the
//! configured database. A client is created per operation and dropped on
//! every exit path, so no connection outlives the call that acquired it.
//! Insertion ordinals are reserved from a `counters` collection; upserts
//! keep the ordinal a chunk id already has.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::Client;
use serde::{Deserialize, Serialize};

use crate::domain::chunk::Chunk;
use crate::domain::knowledge_base::KnowledgeBaseId;
use crate::domain::vector::{VectorBackend, VectorRecord};
use crate::domain::DomainError;

#[derive(Debug, Serialize, Deserialize)]
struct VectorDoc {
    #[serde(rename = "_id")]
    id: String,
    ord: i64,
    vector: Vec<f32>,
    text: String,
    metadata: HashMap<String, String>,
}

fn storage_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::storage(format!("Vector store error: {}", e))
}

/// Vector index backend scoped by `(db_name, collection per kb)`.
#[derive(Debug, Clone)]
pub struct RemoteVectorBackend {
    uri: String,
    db_name: String,
}

impl RemoteVectorBackend {
    /// Configure a backend; no connection is made until an operation runs.
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
        }
    }

    fn collection_name(kb_id: &KnowledgeBaseId) -> String {
        format!("vectors_{}", kb_id)
    }

    async fn connect(&self) -> Result<Client, DomainError> {
        Client::with_uri_str(&self.uri)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to {}: {}", self.db_name, e)))
    }
}

#[async_trait]
impl VectorBackend for RemoteVectorBackend {
    async fn add(
        &self,
        kb_id: &KnowledgeBaseId,
        records: Vec<VectorRecord>,
    ) -> Result<(), DomainError> {
        if records.is_empty() {
            return Ok(());
        }

        let client = self.connect().await?;
        let db = client.database(&self.db_name);
        let name = Self::collection_name(kb_id);
        let collection = db.collection::<VectorDoc>(&name);

        // Reserve an ordinal block; chunks that already exist keep their
        // original ordinal and simply leave a gap.
        let counters = db.collection::<Document>("counters");
        let counter = counters
            .find_one_and_update(
                doc! {"_id": name.as_str()},
                doc! {"$inc": {"seq": records.len() as i64}},
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(storage_err)?;

        let end = counter
            .and_then(|d| d.get_i64("seq").ok())
            .unwrap_or(records.len() as i64);
        let start = end - records.len() as i64;

        for (offset, record) in records.into_iter().enumerate() {
            let vector = mongodb::bson::to_bson(&record.vector).map_err(storage_err)?;
            let metadata = mongodb::bson::to_bson(&record.chunk.metadata).map_err(storage_err)?;

            collection
                .update_one(
                    doc! {"_id": record.chunk.id.as_str()},
                    doc! {
                        "$set": {"vector": vector, "text": record.chunk.text.as_str(), "metadata": metadata},
                        "$setOnInsert": {"ord": start + offset as i64},
                    },
                )
                .upsert(true)
                .await
                .map_err(storage_err)?;
        }

        Ok(())
    }

    async fn load(&self, kb_id: &KnowledgeBaseId) -> Result<Vec<VectorRecord>, DomainError> {
        let client = self.connect().await?;
        let collection = client
            .database(&self.db_name)
            .collection::<VectorDoc>(&Self::collection_name(kb_id));

        let mut cursor = collection
            .find(doc! {})
            .sort(doc! {"ord": 1})
            .await
            .map_err(storage_err)?;

        let mut records = Vec::new();
        while let Some(entry) = cursor.try_next().await.map_err(storage_err)? {
            records.push(VectorRecord::new(
                Chunk {
                    id: entry.id,
                    text: entry.text,
                    metadata: entry.metadata,
                },
                entry.vector,
            ));
        }

        Ok(records)
    }

    async fn delete_namespace(&self, kb_id: &KnowledgeBaseId) -> Result<(), DomainError> {
        let client = self.connect().await?;
        let db = client.database(&self.db_name);
        let name = Self::collection_name(kb_id);

        db.collection::<VectorDoc>(&name)
            .drop()
            .await
            .map_err(storage_err)?;
        db.collection::<Document>("counters")
            .delete_one(doc! {"_id": name.as_str()})
            .await
            .map_err(storage_err)?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}
