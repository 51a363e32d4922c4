//! Storage trait definitions.
//!
//! Splits the persistence surface into three narrow traits so a caller can
//! depend on only the capability it needs, and so a future backend could
//! implement vector search without also owning document storage. The
//! concrete `SQLite` backend implements all three on one connection.

use crate::core::{Chunk, Document};
use crate::error::Result;
use std::collections::HashMap;

/// Stores documents: the unit of ingestion.
pub trait DocumentStore: Send + Sync {
    /// Initializes storage (creates schema, runs migrations). Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation or migration fails.
    fn init(&self) -> Result<()>;

    /// Checks whether storage has been initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    fn is_initialized(&self) -> Result<bool>;

    /// Inserts a document. Returns `InvalidInput` if the id already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be inserted.
    fn put_document(&self, document: &Document) -> Result<()>;

    /// Retrieves a document by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_document(&self, id: &str) -> Result<Option<Document>>;

    /// Lists all documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_documents(&self) -> Result<Vec<Document>>;

    /// Deletes a document by id. Implementations must also remove every
    /// chunk that referenced it (see [`VectorStore::delete`] /
    /// [`KeywordStore::delete`] for the index side of this).
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn delete_document(&self, id: &str) -> Result<()>;

    /// Deletes all documents.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn reset(&self) -> Result<()>;

    /// Persists chunks produced for a document. Chunks are inserted without
    /// an embedding vector; [`VectorStore::index`] fills it in afterward.
    ///
    /// # Errors
    ///
    /// Returns an error if insertion fails.
    fn put_chunks(&self, chunks: &[Chunk]) -> Result<()>;

    /// Retrieves every chunk belonging to a document, ordered by ordinal.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_chunks(&self, document_id: &str) -> Result<Vec<Chunk>>;

    /// Retrieves a single chunk by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_chunk(&self, id: &str) -> Result<Option<Chunk>>;
}

/// Stores chunk embeddings and serves vector similarity search.
pub trait VectorStore: Send + Sync {
    /// Indexes a chunk's embedding vector.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DimensionMismatch` if `chunk.vector.len()`
    /// disagrees with the dimension already established by the index, or
    /// another storage error if the write fails.
    fn index(&self, chunk: &Chunk) -> Result<()>;

    /// Returns up to `top_k` chunks ranked by similarity to `vector`.
    ///
    /// Callers must treat the result as rank-ordered only; the backend's
    /// native score is not exposed across this interface.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Chunk>>;

    /// Like [`VectorStore::search`], restricted to chunks whose metadata
    /// matches every entry in `filters` (ANDed equality).
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    fn search_with_filters(
        &self,
        vector: &[f32],
        top_k: usize,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<Chunk>>;

    /// Removes every indexed chunk belonging to `document_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn delete(&self, document_id: &str) -> Result<()>;

    /// Drops all indexed vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset fails.
    fn reset(&self) -> Result<()>;
}

/// Stores chunk content for keyword (BM25-like) search.
pub trait KeywordStore: Send + Sync {
    /// Returns up to `top_k` chunks ranked by keyword relevance to `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    fn search(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>>;

    /// Removes every indexed chunk belonging to `document_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn delete(&self, document_id: &str) -> Result<()>;

    /// Drops all indexed keyword entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the reset fails.
    fn reset(&self) -> Result<()>;
}

/// Read-only health/statistics snapshot over the store.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StorageStats {
    /// Number of documents stored.
    pub document_count: usize,
    /// Total number of chunks across all documents.
    pub chunk_count: usize,
    /// Total size of all document content in bytes.
    pub total_content_size: usize,
    /// Schema version.
    pub schema_version: u32,
}
