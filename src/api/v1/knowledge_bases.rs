//! Knowledge base endpoints: CRUD, file upload, retrieval queries

use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::chunk::ScoredChunk;
use crate::domain::knowledge_base::KnowledgeBase;
use crate::domain::retrieval::RetrieverMode;
use crate::infrastructure::services::{CreateKnowledgeBaseRequest, IngestFileRequest};

/// Request to create a new knowledge base
#[derive(Debug, Clone, Deserialize)]
pub struct CreateKnowledgeBaseApiRequest {
    pub name: String,
    /// String-typed splitter parameters; coerced int -> float -> string
    #[serde(default)]
    pub splitter_config: HashMap<String, String>,
}

/// Knowledge base response
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeBaseResponse {
    pub id: String,
    pub name: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub files: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&KnowledgeBase> for KnowledgeBaseResponse {
    fn from(kb: &KnowledgeBase) -> Self {
        Self {
            id: kb.id().as_str().to_string(),
            name: kb.name().to_string(),
            chunk_size: kb.chunking().chunk_size,
            chunk_overlap: kb.chunking().chunk_overlap,
            files: kb.files().to_vec(),
            created_at: kb.created_at().to_rfc3339(),
            updated_at: kb.updated_at().to_rfc3339(),
        }
    }
}

/// List knowledge bases response
#[derive(Debug, Clone, Serialize)]
pub struct ListKnowledgeBasesResponse {
    pub knowledge_bases: Vec<KnowledgeBaseResponse>,
    pub total: usize,
}

/// Deletion response
#[derive(Debug, Clone, Serialize)]
pub struct DeleteKnowledgeBaseResponse {
    pub id: String,
    pub deleted: bool,
}

/// Upload response
#[derive(Debug, Clone, Serialize)]
pub struct UploadFileResponse {
    pub filename: String,
    pub chunks_indexed: usize,
}

/// Retrieval query request
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub top_k: Option<usize>,
    #[serde(default = "default_mode")]
    pub mode: RetrieverMode,
}

fn default_mode() -> RetrieverMode {
    RetrieverMode::Vector
}

/// One scored result
#[derive(Debug, Clone, Serialize)]
pub struct QueryResultItem {
    pub id: String,
    pub text: String,
    pub score: f32,
    pub metadata: HashMap<String, String>,
}

impl From<ScoredChunk> for QueryResultItem {
    fn from(hit: ScoredChunk) -> Self {
        Self {
            id: hit.chunk.id,
            text: hit.chunk.text,
            score: hit.score,
            metadata: hit.chunk.metadata,
        }
    }
}

/// Retrieval query response
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub results: Vec<QueryResultItem>,
    pub total: usize,
    pub mode: RetrieverMode,
}

/// GET /api/v1/knowledge-bases
pub async fn list_knowledge_bases(
    State(state): State<AppState>,
) -> Result<Json<ListKnowledgeBasesResponse>, ApiError> {
    let knowledge_bases = state.knowledge_base_service.list().await?;

    let knowledge_bases: Vec<KnowledgeBaseResponse> =
        knowledge_bases.iter().map(Into::into).collect();
    let total = knowledge_bases.len();

    Ok(Json(ListKnowledgeBasesResponse {
        knowledge_bases,
        total,
    }))
}

/// POST /api/v1/knowledge-bases
pub async fn create_knowledge_base(
    State(state): State<AppState>,
    Json(request): Json<CreateKnowledgeBaseApiRequest>,
) -> Result<Json<KnowledgeBaseResponse>, ApiError> {
    debug!(name = %request.name, "creating knowledge base");

    let kb = state
        .knowledge_base_service
        .create(CreateKnowledgeBaseRequest {
            name: request.name,
            splitter_config: request.splitter_config,
        })
        .await?;

    Ok(Json(KnowledgeBaseResponse::from(&kb)))
}

/// GET /api/v1/knowledge-bases/{id}
pub async fn get_knowledge_base(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<KnowledgeBaseResponse>, ApiError> {
    let kb = state.knowledge_base_service.get_required(&id).await?;
    Ok(Json(KnowledgeBaseResponse::from(&kb)))
}

/// DELETE /api/v1/knowledge-bases/{id}
pub async fn delete_knowledge_base(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteKnowledgeBaseResponse>, ApiError> {
    let deleted = state.knowledge_base_service.delete(&id).await?;

    if !deleted {
        return Err(ApiError::not_found(format!(
            "Knowledge base '{}' not found",
            id
        )));
    }

    Ok(Json(DeleteKnowledgeBaseResponse { id, deleted }))
}

/// POST /api/v1/knowledge-bases/{id}/upload
///
/// Multipart upload; the first part carrying a filename is ingested.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadFileResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart field: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let content = field.bytes().await.map_err(|e| {
            ApiError::bad_request(format!("Failed to read file '{}': {}", filename, e))
        })?;

        file = Some((filename, content.to_vec()));
        break;
    }

    let Some((filename, content)) = file else {
        return Err(ApiError::bad_request("No file provided"));
    };

    debug!(kb_id = %id, filename = %filename, bytes = content.len(), "ingesting upload");

    let result = state
        .ingestion_service
        .ingest_file(IngestFileRequest {
            kb_id: id,
            filename,
            content,
        })
        .await?;

    Ok(Json(UploadFileResponse {
        filename: result.filename,
        chunks_indexed: result.chunks_indexed,
    }))
}

/// POST /api/v1/knowledge-bases/{id}/query
pub async fn query_knowledge_base(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let top_k = request.top_k.unwrap_or(state.default_top_k);

    debug!(kb_id = %id, top_k, mode = %request.mode, "running retrieval query");

    let hits = state
        .retrieval_service
        .query(&id, &request.query, top_k, request.mode)
        .await?;

    let results: Vec<QueryResultItem> = hits.into_iter().map(Into::into).collect();
    let total = results.len();

    Ok(Json(QueryResponse {
        results,
        total,
        mode: request.mode,
    }))
}
