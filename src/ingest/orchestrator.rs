//! Ingestion Orchestrator (C13): wires content extraction, optional
//! metadata extraction, chunking, embedding, and the dual-index write.

use crate::chunking::{Chunker, ChunkerConfig};
use crate::core::{Document, DocumentSource};
use crate::embedding::Embedder;
use crate::error::{Error, Result};
use crate::ingest::content_extractor::{ContentExtractor, IngestSource};
use crate::ingest::metadata_extractor::MetadataExtractor;
use crate::storage::{DocumentStore, VectorStore};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Request to ingest a single document.
///
/// Exactly one of `content`, `file_path`, `url` must be set; the others
/// must be `None`.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    /// Inline content, supplied directly by the caller.
    pub content: Option<String>,
    /// Path to a local file to read and ingest.
    pub file_path: Option<String>,
    /// URL to fetch and ingest (currently always unsupported).
    pub url: Option<String>,
    /// Overrides the orchestrator's configured chunk size. `0` or absent
    /// falls back to the configured default.
    pub chunk_size: Option<usize>,
    /// Overrides the orchestrator's configured overlap. `0` or absent
    /// falls back to the configured default.
    pub overlap: Option<usize>,
    /// Metadata seed, inherited verbatim by every produced chunk.
    pub metadata: HashMap<String, String>,
}

/// Result of an ingest call.
#[derive(Debug, Clone)]
pub struct IngestResponse {
    /// Id of the created document. Empty when `success` is false and no
    /// document was created (the "no content found" path).
    pub document_id: String,
    /// Number of chunks produced.
    pub chunk_count: usize,
    /// Whether ingestion completed.
    pub success: bool,
    /// Empty on success; explains the failure otherwise.
    pub message: String,
}

/// Drives one document through extraction, optional metadata extraction,
/// chunking, embedding, and indexing.
pub struct IngestionOrchestrator {
    document_store: Arc<dyn DocumentStore>,
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    chunker: Arc<dyn Chunker>,
    metadata_extractor: Option<Arc<MetadataExtractor>>,
    content_extractor: ContentExtractor,
    default_chunk_size: usize,
    default_overlap: usize,
}

impl IngestionOrchestrator {
    /// Creates an orchestrator over the given backends and chunking
    /// defaults. `metadata_extractor` is `None` when metadata extraction
    /// (C8) is disabled in configuration.
    #[must_use]
    pub fn new(
        document_store: Arc<dyn DocumentStore>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        chunker: Arc<dyn Chunker>,
        metadata_extractor: Option<Arc<MetadataExtractor>>,
        default_chunk_size: usize,
        default_overlap: usize,
    ) -> Self {
        Self {
            document_store,
            vector_store,
            embedder,
            chunker,
            metadata_extractor,
            content_extractor: ContentExtractor::new(),
            default_chunk_size,
            default_overlap,
        }
    }

    /// Ingests one document end to end.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the request names zero or multiple
    /// sources. Returns a storage or embedding error if any write or
    /// embedding call fails after the document has already been persisted
    /// — the document is **not** rolled back in that case (see module
    /// docs on orphaned documents).
    pub async fn ingest(&self, request: &IngestRequest) -> Result<IngestResponse> {
        let source = Self::resolve_source(request)?;
        let content = self.content_extractor.extract(&source)?;

        if content.is_empty() {
            return Ok(IngestResponse {
                document_id: String::new(),
                chunk_count: 0,
                success: false,
                message: "no content found".to_string(),
            });
        }

        let mut metadata = request.metadata.clone();
        let file_path = match &source {
            IngestSource::File(path) => Some(path.as_path()),
            IngestSource::Inline(_) | IngestSource::Url(_) => None,
        };

        if let Some(extractor) = &self.metadata_extractor {
            if let Some(extracted) = extractor.extract(&content, file_path).await {
                metadata.entry("summary".to_string()).or_insert(extracted.summary);
                if !extracted.keywords.is_empty() {
                    metadata
                        .entry("keywords".to_string())
                        .or_insert_with(|| extracted.keywords.join(", "));
                }
                metadata
                    .entry("document_type".to_string())
                    .or_insert(extracted.document_type);
                if let Some(date) = extracted.creation_date {
                    metadata.entry("creation_date".to_string()).or_insert(date);
                }
            }
        }

        let document_source = match &source {
            IngestSource::Inline(_) => DocumentSource::Inline,
            IngestSource::File(path) => DocumentSource::Path(path.display().to_string()),
            IngestSource::Url(url) => DocumentSource::Url(url.clone()),
        };

        let document = Document::new(document_source, content.clone(), metadata.clone());
        self.document_store.put_document(&document)?;

        let chunk_size = request.chunk_size.filter(|&s| s > 0).unwrap_or(self.default_chunk_size);
        let overlap = request.overlap.filter(|&o| o > 0).unwrap_or(self.default_overlap);
        let config = ChunkerConfig {
            chunk_size,
            overlap,
            ..ChunkerConfig::new()
        };

        let mut chunks = self.chunker.chunk(&document.id, &content, Some(&config), &metadata)?;
        self.document_store.put_chunks(&chunks)?;

        for chunk in &mut chunks {
            let vector = self.embedder.embed(&chunk.content).await?;
            chunk.set_vector(vector);
            self.vector_store.index(chunk)?;
        }

        Ok(IngestResponse {
            document_id: document.id,
            chunk_count: chunks.len(),
            success: true,
            message: String::new(),
        })
    }

    fn resolve_source(request: &IngestRequest) -> Result<IngestSource> {
        let present = [
            request.content.is_some(),
            request.file_path.is_some(),
            request.url.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();

        if present != 1 {
            return Err(Error::invalid_input(
                "exactly one of content, file_path, url must be set",
            ));
        }

        if let Some(content) = &request.content {
            return Ok(IngestSource::Inline(content.clone()));
        }
        if let Some(path) = &request.file_path {
            return Ok(IngestSource::File(PathBuf::from(path)));
        }
        if let Some(url) = &request.url {
            return Ok(IngestSource::Url(url.clone()));
        }
        unreachable!("present count checked above")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::FixedChunker;
    use crate::embedding::{DEFAULT_DIMENSIONS, FallbackEmbedder};
    use crate::storage::SqliteStore;

    fn orchestrator() -> (IngestionOrchestrator, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store.init().unwrap();
        let embedder = Arc::new(FallbackEmbedder::new(DEFAULT_DIMENSIONS));
        let chunker = Arc::new(FixedChunker::with_size(50));
        let orchestrator = IngestionOrchestrator::new(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Arc::clone(&store) as Arc<dyn VectorStore>,
            embedder,
            chunker,
            None,
            50,
            10,
        );
        (orchestrator, store)
    }

    #[tokio::test]
    async fn rejects_zero_sources() {
        let (orchestrator, _store) = orchestrator();
        let request = IngestRequest::default();
        let err = orchestrator.ingest(&request).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn rejects_multiple_sources() {
        let (orchestrator, _store) = orchestrator();
        let request = IngestRequest {
            content: Some("a".to_string()),
            file_path: Some("/tmp/a.txt".to_string()),
            ..Default::default()
        };
        let err = orchestrator.ingest(&request).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn empty_content_reports_no_content_found_without_allocating_id() {
        let (orchestrator, _store) = orchestrator();
        let request = IngestRequest {
            content: Some(String::new()),
            ..Default::default()
        };
        let response = orchestrator.ingest(&request).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message, "no content found");
        assert!(response.document_id.is_empty());
    }

    #[tokio::test]
    async fn ingests_inline_content_into_chunks_with_dense_ordinals() {
        let (orchestrator, store) = orchestrator();
        let request = IngestRequest {
            content: Some("Hello world. ".repeat(20)),
            ..Default::default()
        };
        let response = orchestrator.ingest(&request).await.unwrap();
        assert!(response.success);
        assert!(response.chunk_count > 0);

        let chunks = store.get_chunks(&response.document_id).unwrap();
        assert_eq!(chunks.len(), response.chunk_count);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.ordinal, i);
            assert_eq!(chunk.id, format!("{}#{i}", response.document_id));
            assert_eq!(chunk.vector.len(), DEFAULT_DIMENSIONS);
        }
    }

    #[tokio::test]
    async fn request_metadata_is_inherited_by_the_document() {
        let (orchestrator, store) = orchestrator();
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), "unit-test".to_string());
        let request = IngestRequest {
            content: Some("some content here".to_string()),
            metadata,
            ..Default::default()
        };
        let response = orchestrator.ingest(&request).await.unwrap();
        let document = store.get_document(&response.document_id).unwrap().unwrap();
        assert_eq!(document.metadata.get("source"), Some(&"unit-test".to_string()));
    }
}
