//! Ingestion service - file upload to dual-indexed chunks
//!
//! One ingest call parses the file, splits it with the knowledge base's
//! chunking configuration, writes the chunks to the document store, embeds
//! them, and writes the vectors to the vector backend. The filename is
//! recorded as a member only after both indexes succeeded, so a reader
//! never observes a member file with chunks missing from either index. A
//! partial failure leaves an inconsistency that idempotent re-ingestion
//! repairs - there is no automatic rollback.

use std::sync::Arc;

use tracing::info;

use crate::domain::chunk::Chunk;
use crate::domain::docstore::DocumentStore;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::ingestion::{ChunkingStrategy, DocumentParser, ParserInput};
use crate::domain::knowledge_base::KnowledgeBase;
use crate::domain::storage::Storage;
use crate::domain::vector::{VectorBackend, VectorRecord};
use crate::domain::DomainError;

use super::knowledge_base_service::parse_kb_id;

/// Request to ingest one file into a knowledge base
#[derive(Debug, Clone)]
pub struct IngestFileRequest {
    pub kb_id: String,
    pub filename: String,
    pub content: Vec<u8>,
}

/// Outcome of a successful ingestion
#[derive(Debug, Clone)]
pub struct IngestFileResult {
    pub kb_id: String,
    pub filename: String,
    pub chunks_indexed: usize,
}

/// Ingestion service feeding both indexes
pub struct IngestionService {
    storage: Arc<dyn Storage<KnowledgeBase>>,
    doc_store: Arc<dyn DocumentStore>,
    vector_backend: Arc<dyn VectorBackend>,
    embedder: Arc<dyn EmbeddingProvider>,
    parser: Arc<dyn DocumentParser>,
    chunker: Arc<dyn ChunkingStrategy>,
}

impl std::fmt::Debug for IngestionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionService").finish()
    }
}

impl IngestionService {
    pub fn new(
        storage: Arc<dyn Storage<KnowledgeBase>>,
        doc_store: Arc<dyn DocumentStore>,
        vector_backend: Arc<dyn VectorBackend>,
        embedder: Arc<dyn EmbeddingProvider>,
        parser: Arc<dyn DocumentParser>,
        chunker: Arc<dyn ChunkingStrategy>,
    ) -> Self {
        Self {
            storage,
            doc_store,
            vector_backend,
            embedder,
            parser,
            chunker,
        }
    }

    /// Ingest one file: parse, chunk, feed both indexes, record membership.
    pub async fn ingest_file(
        &self,
        request: IngestFileRequest,
    ) -> Result<IngestFileResult, DomainError> {
        let kb_id = parse_kb_id(&request.kb_id)?;

        let mut kb = self
            .storage
            .get(kb_id.as_str())
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Knowledge base '{}' not found", kb_id))
            })?;

        if kb.has_file(&request.filename)
            || self.doc_store.file_exists(&kb_id, &request.filename).await?
        {
            return Err(DomainError::duplicate_file(format!(
                "{} already exists in {}",
                request.filename, kb_id
            )));
        }

        let input = ParserInput::new(request.filename.clone(), request.content);
        let text = self.parser.parse(&input)?;

        let segments = self.chunker.chunk(&text, kb.chunking())?;
        if segments.is_empty() {
            return Err(DomainError::validation(format!(
                "{} contains no indexable text",
                request.filename
            )));
        }

        let chunks: Vec<Chunk> = segments
            .into_iter()
            .map(|segment| {
                Chunk::from_split(
                    &request.filename,
                    segment.content,
                    segment.index,
                    segment.total,
                    segment.char_start,
                    segment.char_end,
                )
            })
            .collect();

        self.doc_store.add(&kb_id, &chunks).await?;

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(DomainError::embedding(format!(
                "Expected {} vectors, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let records: Vec<VectorRecord> = chunks
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(chunk, vector)| VectorRecord::new(chunk, vector))
            .collect();

        self.vector_backend.add(&kb_id, records).await?;

        // Membership is recorded last: both indexes hold the chunks now
        kb.record_file(&request.filename);
        self.storage.update(kb).await?;

        info!(%kb_id, filename = %request.filename, chunks = chunks.len(), "file ingested");

        Ok(IngestFileResult {
            kb_id: request.kb_id,
            filename: request.filename,
            chunks_indexed: chunks.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::domain::docstore::mock::MockDocumentStore;
    use crate::domain::vector::mock::MockVectorBackend;
    use crate::infrastructure::embedding::HashingEmbedder;
    use crate::infrastructure::ingestion::{AutoParser, SentenceChunker};
    use crate::infrastructure::services::{CreateKnowledgeBaseRequest, KnowledgeBaseService};
    use crate::infrastructure::storage::InMemoryStorage;

    struct Fixture {
        kb_service: KnowledgeBaseService,
        ingestion: IngestionService,
        doc_store: Arc<MockDocumentStore>,
        vector_backend: Arc<MockVectorBackend>,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(InMemoryStorage::new());
        let doc_store = Arc::new(MockDocumentStore::new());
        let vector_backend = Arc::new(MockVectorBackend::new());
        let embedder = Arc::new(HashingEmbedder::new(64));

        let kb_service = KnowledgeBaseService::new(
            storage.clone(),
            doc_store.clone(),
            vector_backend.clone(),
        );
        let ingestion = IngestionService::new(
            storage,
            doc_store.clone(),
            vector_backend.clone(),
            embedder,
            Arc::new(AutoParser::new()),
            Arc::new(SentenceChunker::new()),
        );

        Fixture {
            kb_service,
            ingestion,
            doc_store,
            vector_backend,
        }
    }

    async fn create_zoo(fixture: &Fixture) {
        let mut splitter_config = HashMap::new();
        splitter_config.insert("chunk_size".to_string(), "50".to_string());
        splitter_config.insert("chunk_overlap".to_string(), "0".to_string());

        fixture
            .kb_service
            .create(CreateKnowledgeBaseRequest {
                name: "zoo".to_string(),
                splitter_config,
            })
            .await
            .unwrap();
    }

    fn animals_request() -> IngestFileRequest {
        IngestFileRequest {
            kb_id: "zoo".to_string(),
            filename: "animals.txt".to_string(),
            content: "Giraffes eat leaves from tall trees. Elephants are large gray animals. \
                      Zebras have black and white stripes."
                .as_bytes()
                .to_vec(),
        }
    }

    #[tokio::test]
    async fn test_ingest_feeds_both_indexes() {
        let fixture = fixture();
        create_zoo(&fixture).await;

        let result = fixture.ingestion.ingest_file(animals_request()).await.unwrap();

        assert_eq!(result.chunks_indexed, 3);

        let kb_id = parse_kb_id("zoo").unwrap();
        assert_eq!(fixture.doc_store.get_all(&kb_id).await.unwrap().len(), 3);
        assert_eq!(fixture.vector_backend.load(&kb_id).await.unwrap().len(), 3);

        let kb = fixture.kb_service.get_required("zoo").await.unwrap();
        assert!(kb.has_file("animals.txt"));
    }

    #[tokio::test]
    async fn test_ingest_into_unknown_kb_is_not_found() {
        let fixture = fixture();

        let result = fixture.ingestion.ingest_file(animals_request()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reingesting_same_filename_is_a_duplicate() {
        let fixture = fixture();
        create_zoo(&fixture).await;

        fixture.ingestion.ingest_file(animals_request()).await.unwrap();
        let result = fixture.ingestion.ingest_file(animals_request()).await;

        assert!(matches!(result, Err(DomainError::DuplicateFile { .. })));
    }

    #[tokio::test]
    async fn test_vector_failure_leaves_membership_unrecorded() {
        let fixture = fixture();
        create_zoo(&fixture).await;
        fixture.vector_backend.set_fail_with("docdb unreachable").await;

        let result = fixture.ingestion.ingest_file(animals_request()).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));

        // Not a member, so re-ingestion is the recovery path
        let kb = fixture.kb_service.get_required("zoo").await.unwrap();
        assert!(!kb.has_file("animals.txt"));

        fixture.vector_backend.clear_failure().await;
        let result = fixture.ingestion.ingest_file(animals_request()).await.unwrap();
        assert_eq!(result.chunks_indexed, 3);

        // The partial document-store write was absorbed by idempotent upsert
        let kb_id = parse_kb_id("zoo").unwrap();
        assert_eq!(fixture.doc_store.get_all(&kb_id).await.unwrap().len(), 3);
        assert_eq!(fixture.vector_backend.load(&kb_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let storage = Arc::new(InMemoryStorage::new());
        let doc_store = Arc::new(MockDocumentStore::new());
        let vector_backend = Arc::new(MockVectorBackend::new());
        let embedder = Arc::new(
            crate::domain::embedding::mock::MockEmbeddingProvider::new(8).with_error("offline"),
        );

        let kb_service = KnowledgeBaseService::new(
            storage.clone(),
            doc_store.clone(),
            vector_backend.clone(),
        );
        let ingestion = IngestionService::new(
            storage,
            doc_store,
            vector_backend,
            embedder,
            Arc::new(AutoParser::new()),
            Arc::new(SentenceChunker::new()),
        );

        kb_service
            .create(CreateKnowledgeBaseRequest {
                name: "zoo".to_string(),
                splitter_config: HashMap::new(),
            })
            .await
            .unwrap();

        let result = ingestion.ingest_file(animals_request()).await;
        assert!(matches!(result, Err(DomainError::Embedding { .. })));

        let kb = kb_service.get_required("zoo").await.unwrap();
        assert!(!kb.has_file("animals.txt"));
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let fixture = fixture();
        create_zoo(&fixture).await;

        let result = fixture
            .ingestion
            .ingest_file(IngestFileRequest {
                kb_id: "zoo".to_string(),
                filename: "empty.txt".to_string(),
                content: Vec::new(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
