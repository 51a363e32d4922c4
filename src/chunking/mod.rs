//! Chunking strategies.
//!
//! This module provides a trait-based system for chunking document text
//! into retrievable segments. Two strategies are available:
//!
//! - **Fixed**: Simple character-based chunking with configurable size and overlap.
//! - **Semantic**: Unicode-aware, sentence/paragraph-boundary-respecting chunking.
//!   This is the default strategy used by ingestion.

pub mod fixed;
pub mod semantic;
pub mod traits;

pub use fixed::FixedChunker;
pub use semantic::SemanticChunker;
pub use traits::{ChunkerConfig, Chunker};

/// Default chunk size in characters (~750 tokens at 4 chars/token).
/// Sized for granular semantic search with embeddings.
pub const DEFAULT_CHUNK_SIZE: usize = 3_000;

/// Default overlap size in characters (for context continuity).
pub const DEFAULT_OVERLAP: usize = 500;

/// Maximum allowed chunk size (50k chars, ~12.5k tokens).
pub const MAX_CHUNK_SIZE: usize = 50_000;

/// Creates the default chunker (semantic).
#[must_use]
pub const fn default_chunker() -> SemanticChunker {
    SemanticChunker::new()
}

/// Creates a chunker by name.
///
/// # Arguments
///
/// * `name` - Chunker strategy name: "fixed" or "semantic".
///
/// # Errors
///
/// Returns [`crate::error::ChunkingError::UnknownStrategy`] if the strategy name is not recognized.
pub fn create_chunker(name: &str) -> crate::error::Result<Box<dyn Chunker>> {
    match name.to_lowercase().as_str() {
        "fixed" => Ok(Box::new(FixedChunker::new())),
        "semantic" => Ok(Box::new(SemanticChunker::new())),
        _ => Err(crate::error::ChunkingError::UnknownStrategy {
            name: name.to_string(),
        }
        .into()),
    }
}

/// Lists available chunking strategy names.
#[must_use]
pub fn available_strategies() -> Vec<&'static str> {
    vec!["fixed", "semantic"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunker() {
        let chunker = default_chunker();
        assert_eq!(chunker.name(), "semantic");
    }

    #[test]
    fn test_create_chunker_fixed() {
        let chunker = create_chunker("fixed").unwrap();
        assert_eq!(chunker.name(), "fixed");
    }

    #[test]
    fn test_create_chunker_semantic() {
        let chunker = create_chunker("semantic").unwrap();
        assert_eq!(chunker.name(), "semantic");
    }

    #[test]
    fn test_create_chunker_unknown() {
        let result = create_chunker("unknown");
        assert!(result.is_err());
    }

    #[test]
    fn test_create_chunker_case_insensitive() {
        let chunker = create_chunker("FIXED").unwrap();
        assert_eq!(chunker.name(), "fixed");
    }

    #[test]
    fn test_available_strategies() {
        let strategies = available_strategies();
        assert_eq!(strategies.len(), 2);
        assert!(strategies.contains(&"fixed"));
        assert!(strategies.contains(&"semantic"));
    }
}
