//! Knowledge base entity and related types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::params::ParamValue;
use super::validation::{validate_knowledge_base_id, KnowledgeBaseValidationError};
use crate::domain::ingestion::ChunkingConfig;
use crate::domain::storage::StorageEntity;

/// Knowledge base identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KnowledgeBaseId(String);

impl KnowledgeBaseId {
    /// Create a new KnowledgeBaseId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, KnowledgeBaseValidationError> {
        let id = id.into();
        validate_knowledge_base_id(&id)?;
        Ok(Self(id))
    }

    /// Derive an id from a display name: lowercased, whitespace and
    /// underscores become hyphens, anything else non-alphanumeric is
    /// dropped.
    pub fn from_name(name: &str) -> Result<Self, KnowledgeBaseValidationError> {
        let mut slug = String::with_capacity(name.len());
        let mut last_was_hyphen = true;

        for c in name.trim().to_lowercase().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c);
                last_was_hyphen = false;
            } else if (c.is_whitespace() || c == '-' || c == '_') && !last_was_hyphen {
                slug.push('-');
                last_was_hyphen = true;
            }
        }

        let slug = slug.trim_end_matches('-').to_string();
        Self::new(slug)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for KnowledgeBaseId {
    type Error = KnowledgeBaseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KnowledgeBaseId> for String {
    fn from(id: KnowledgeBaseId) -> Self {
        id.0
    }
}

impl std::fmt::Display for KnowledgeBaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Knowledge base configuration record.
///
/// Created on the first creation request; ingestion appends to `files`.
/// There is no implicit deletion - removal is an explicit operation that
/// also drops the document-store and vector namespaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Unique identifier, derived from the name
    id: KnowledgeBaseId,
    /// Display name
    name: String,
    /// Splitter parameters applied to every ingested file
    chunking: ChunkingConfig,
    /// All client-supplied splitter parameters after coercion, including
    /// the ones the chunker does not consume
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    splitter_params: BTreeMap<String, ParamValue>,
    /// Member filenames, in ingestion order
    files: Vec<String>,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl KnowledgeBase {
    /// Create a new knowledge base with an empty member list
    pub fn new(id: KnowledgeBaseId, name: impl Into<String>, chunking: ChunkingConfig) -> Self {
        let now = Utc::now();

        Self {
            id,
            name: name.into(),
            chunking,
            splitter_params: BTreeMap::new(),
            files: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach the full coerced splitter parameter map
    pub fn with_splitter_params(mut self, params: BTreeMap<String, ParamValue>) -> Self {
        self.splitter_params = params;
        self
    }

    // Getters

    pub fn id(&self) -> &KnowledgeBaseId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chunking(&self) -> &ChunkingConfig {
        &self.chunking
    }

    pub fn splitter_params(&self) -> &BTreeMap<String, ParamValue> {
        &self.splitter_params
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn has_file(&self, filename: &str) -> bool {
        self.files.iter().any(|f| f == filename)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Record a successfully ingested file. Only called after both indexes
    /// have accepted the file's chunks.
    pub fn record_file(&mut self, filename: impl Into<String>) {
        self.files.push(filename.into());
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for KnowledgeBase {
    fn key(&self) -> &str {
        self.id.as_str()
    }

    fn collection() -> &'static str {
        "knowledge_bases"
    }
}
