//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::{IngestionService, KnowledgeBaseService, RetrievalService};

/// Application state containing the shared services
#[derive(Clone)]
pub struct AppState {
    pub knowledge_base_service: Arc<KnowledgeBaseService>,
    pub ingestion_service: Arc<IngestionService>,
    pub retrieval_service: Arc<RetrievalService>,
    /// top_k applied when a query does not specify one
    pub default_top_k: usize,
}

impl AppState {
    pub fn new(
        knowledge_base_service: Arc<KnowledgeBaseService>,
        ingestion_service: Arc<IngestionService>,
        retrieval_service: Arc<RetrievalService>,
        default_top_k: usize,
    ) -> Self {
        Self {
            knowledge_base_service,
            ingestion_service,
            retrieval_service,
            default_top_k,
        }
    }
}
