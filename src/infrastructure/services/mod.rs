//! Application services orchestrating the retrieval core

mod ingestion_service;
mod knowledge_base_service;
mod retrieval_service;

pub use ingestion_service::{IngestFileRequest, IngestFileResult, IngestionService};
pub use knowledge_base_service::{CreateKnowledgeBaseRequest, KnowledgeBaseService};
pub use retrieval_service::RetrievalService;
