//! Chunk representation.
//!
//! Chunks are the unit of retrieval: a substring of a document's text, the
//! embedding vector computed for that substring, and the metadata the chunk
//! inherited from its document at ingest time. Chunks are created during
//! ingest and deleted only by deleting their document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single chunk of a document, ready for indexing or retrieval.
///
/// # Examples
///
/// ```
/// use ragcore::core::Chunk;
/// use std::collections::HashMap;
///
/// let chunk = Chunk::new("doc1", 0, "Hello, world!".to_string(), HashMap::new());
/// assert_eq!(chunk.id, "doc1#0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Identity of the form `<document_id>#<ordinal>`.
    pub id: String,

    /// Back-reference to the owning document.
    pub document_id: String,

    /// Zero-based position of this chunk within its document.
    pub ordinal: usize,

    /// Substring of the document's text.
    pub content: String,

    /// Embedding vector. Dimension is fixed by the embedder and must match
    /// every other chunk already in the index.
    pub vector: Vec<f32>,

    /// Metadata inherited from the document at ingest time.
    pub metadata: HashMap<String, String>,

    /// Transient relevance score, set only by a retriever and never persisted.
    #[serde(skip)]
    pub score: Option<f64>,
}

impl Chunk {
    /// Creates a new chunk with no embedding vector yet assigned.
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        ordinal: usize,
        content: String,
        metadata: HashMap<String, String>,
    ) -> Self {
        let document_id = document_id.into();
        let id = format!("{document_id}#{ordinal}");
        Self {
            id,
            document_id,
            ordinal,
            content,
            vector: Vec::new(),
            metadata,
            score: None,
        }
    }

    /// Returns the byte length of the chunk's content.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Returns `true` if the chunk has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Sets the embedding vector.
    pub fn set_vector(&mut self, vector: Vec<f32>) {
        self.vector = vector;
    }

    /// Returns a metadata value by key, if present.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Estimates token count using a simple heuristic (~4 chars per token).
    #[must_use]
    pub fn estimate_tokens(&self) -> usize {
        self.content.len().div_ceil(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_document_id_hash_ordinal() {
        let chunk = Chunk::new("doc1".into(), 3, "text".into(), HashMap::new());
        assert_eq!(chunk.id, "doc1#3");
    }

    #[test]
    fn size_and_empty() {
        let chunk = Chunk::new("doc1".into(), 0, "Hello, world!".into(), HashMap::new());
        assert_eq!(chunk.size(), 13);
        assert!(!chunk.is_empty());

        let empty = Chunk::new("doc1".into(), 1, String::new(), HashMap::new());
        assert!(empty.is_empty());
    }

    #[test]
    fn metadata_is_inherited_and_queryable() {
        let mut meta = HashMap::new();
        meta.insert("source".to_string(), "manual".to_string());
        let chunk = Chunk::new("doc1".into(), 0, "text".into(), meta);
        assert_eq!(chunk.metadata_value("source"), Some("manual"));
        assert_eq!(chunk.metadata_value("missing"), None);
    }

    #[test]
    fn score_is_not_serialized() {
        let mut chunk = Chunk::new("doc1".into(), 0, "text".into(), HashMap::new());
        chunk.score = Some(0.75);
        let json = serde_json::to_string(&chunk).expect("serialize");
        assert!(!json.contains("0.75"));

        let back: Chunk = serde_json::from_str(&json).expect("deserialize");
        assert!(back.score.is_none());
    }

    #[test]
    fn estimate_tokens_scales_with_length() {
        let chunk = Chunk::new("doc1".into(), 0, "Hello, world!".into(), HashMap::new());
        assert!(chunk.estimate_tokens() >= 3);
        assert!(chunk.estimate_tokens() <= 4);
    }
}
