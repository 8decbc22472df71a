//! Ragbase - Knowledge Base Retrieval API
//!
//! An HTTP service that owns named knowledge bases and retrieves relevant
//! document fragments for a query using two interchangeable strategies:
//! - lexical BM25 term ranking over stemmed tokens
//! - embedding-vector cosine similarity
//!
//! Storage is selected per deployment: local redb files, or a
//! MongoDB-compatible document database.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use domain::docstore::DocumentStore;
use domain::embedding::EmbeddingProvider;
use domain::knowledge_base::KnowledgeBase;
use domain::storage::Storage;
use domain::vector::VectorBackend;
use infrastructure::docstore::{LocalDocumentStore, MongoDocumentStore};
use infrastructure::embedding::{HashingEmbedder, OpenAiEmbeddingProvider};
use infrastructure::ingestion::{AutoParser, SentenceChunker};
use infrastructure::retrieval::RetrieverFactory;
use infrastructure::services::{IngestionService, KnowledgeBaseService, RetrievalService};
use infrastructure::storage::{MongoStorage, RedbStorage};
use infrastructure::vector::{LocalVectorBackend, RemoteVectorBackend};

/// Create the application state from the default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::load().unwrap_or_default()).await
}

/// Create the application state with custom configuration.
///
/// The storage backend is a pure function of the deployment environment
/// flag: `local` keeps everything in redb files under the data directory,
/// anything else uses the configured document database. The choice is made
/// once, here, and injected - no component branches on it afterwards.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let (storage, doc_store, vector_backend): (
        Arc<dyn Storage<KnowledgeBase>>,
        Arc<dyn DocumentStore>,
        Arc<dyn VectorBackend>,
    ) = if config.storage.is_local() {
        info!(data_dir = ?config.storage.data_dir, "using local storage backend");
        (
            Arc::new(RedbStorage::open(config.storage.data_dir.join("config.redb"))?),
            Arc::new(LocalDocumentStore::open(
                config.storage.data_dir.join("docstore.redb"),
            )?),
            Arc::new(LocalVectorBackend::open(
                config.storage.data_dir.join("vectors.redb"),
            )?),
        )
    } else {
        info!(db_name = %config.storage.db_name, "using remote storage backend");
        (
            Arc::new(MongoStorage::new(
                config.storage.mongo_uri.clone(),
                config.storage.db_name.clone(),
            )),
            Arc::new(MongoDocumentStore::new(
                config.storage.mongo_uri.clone(),
                config.storage.db_name.clone(),
            )),
            Arc::new(RemoteVectorBackend::new(
                config.storage.mongo_uri.clone(),
                config.storage.db_name.clone(),
            )),
        )
    };

    let embedder = create_embedding_provider(config)?;
    info!(provider = embedder.provider_name(), dimensions = embedder.dimensions(), "embedding provider ready");

    let knowledge_base_service = Arc::new(KnowledgeBaseService::new(
        storage.clone(),
        doc_store.clone(),
        vector_backend.clone(),
    ));

    let ingestion_service = Arc::new(IngestionService::new(
        storage,
        doc_store.clone(),
        vector_backend.clone(),
        embedder.clone(),
        Arc::new(AutoParser::new()),
        Arc::new(SentenceChunker::new()),
    ));

    let retrieval_service = Arc::new(RetrievalService::new(RetrieverFactory::new(
        doc_store,
        vector_backend,
        embedder,
        config.retrieval.language.clone(),
    )));

    Ok(AppState::new(
        knowledge_base_service,
        ingestion_service,
        retrieval_service,
        config.retrieval.default_top_k,
    ))
}

fn create_embedding_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match config.embedding.provider.as_str() {
        "openai" => {
            let api_key = config
                .embedding
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .ok_or_else(|| {
                    anyhow::anyhow!("OPENAI_API_KEY is required for the openai embedding provider")
                })?;

            let provider = match &config.embedding.base_url {
                Some(base_url) => OpenAiEmbeddingProvider::with_base_url(
                    api_key,
                    config.embedding.model.clone(),
                    config.embedding.dimensions,
                    base_url.clone(),
                ),
                None => OpenAiEmbeddingProvider::new(
                    api_key,
                    config.embedding.model.clone(),
                    config.embedding.dimensions,
                ),
            };

            Ok(Arc::new(provider))
        }
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.embedding.dimensions))),
        other => anyhow::bail!("Unknown embedding provider: {}", other),
    }
}
