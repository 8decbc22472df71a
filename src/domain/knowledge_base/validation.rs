//! Knowledge base validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for knowledge base IDs
pub const MAX_KB_ID_LENGTH: usize = 50;

/// Regex pattern for valid knowledge base IDs (alphanumeric + hyphens)
static KB_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]$|^[a-zA-Z0-9]$").unwrap());

/// Knowledge base validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeBaseValidationError {
    /// ID is empty
    EmptyId,
    /// ID exceeds maximum length
    IdTooLong { length: usize, max: usize },
    /// ID contains invalid characters
    InvalidIdFormat { id: String },
}

impl fmt::Display for KnowledgeBaseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Knowledge base ID cannot be empty"),
            Self::IdTooLong { length, max } => {
                write!(
                    f,
                    "Knowledge base ID too long: {} characters (max {})",
                    length, max
                )
            }
            Self::InvalidIdFormat { id } => {
                write!(
                    f,
                    "Invalid knowledge base ID format '{}': must be alphanumeric with hyphens",
                    id
                )
            }
        }
    }
}

impl std::error::Error for KnowledgeBaseValidationError {}

/// Validate a knowledge base ID
pub fn validate_knowledge_base_id(id: &str) -> Result<(), KnowledgeBaseValidationError> {
    if id.is_empty() {
        return Err(KnowledgeBaseValidationError::EmptyId);
    }

    if id.len() > MAX_KB_ID_LENGTH {
        return Err(KnowledgeBaseValidationError::IdTooLong {
            length: id.len(),
            max: MAX_KB_ID_LENGTH,
        });
    }

    if !KB_ID_PATTERN.is_match(id) {
        return Err(KnowledgeBaseValidationError::InvalidIdFormat { id: id.to_string() });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_kb_ids() {
        assert!(validate_knowledge_base_id("a").is_ok());
        assert!(validate_knowledge_base_id("zoo").is_ok());
        assert!(validate_knowledge_base_id("product-docs-v1").is_ok());
        assert!(validate_knowledge_base_id("KB123").is_ok());
    }

    #[test]
    fn test_invalid_kb_ids() {
        assert!(matches!(
            validate_knowledge_base_id(""),
            Err(KnowledgeBaseValidationError::EmptyId)
        ));

        let long_id = "a".repeat(51);
        assert!(matches!(
            validate_knowledge_base_id(&long_id),
            Err(KnowledgeBaseValidationError::IdTooLong { .. })
        ));

        assert!(matches!(
            validate_knowledge_base_id("my_kb"),
            Err(KnowledgeBaseValidationError::InvalidIdFormat { .. })
        ));

        assert!(matches!(
            validate_knowledge_base_id("-kb"),
            Err(KnowledgeBaseValidationError::InvalidIdFormat { .. })
        ));
    }
}
