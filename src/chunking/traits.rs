//! Chunker trait definition.
//!
//! Defines the interface for all chunking strategies, enabling pluggable
//! text segmentation approaches.

use crate::core::Chunk;
use crate::error::Result;
use std::collections::HashMap;

/// Splits a document's text into ordered, retrievable chunks.
///
/// Implementations must be `Send + Sync` and must produce consistent,
/// deterministic output for the same input. Chunk ordinals in the returned
/// vector must be dense starting at 0.
///
/// # Examples
///
/// ```
/// use ragcore::chunking::{Chunker, FixedChunker};
/// use std::collections::HashMap;
///
/// let chunker = FixedChunker::with_size(100);
/// let text = "Hello, world! ".repeat(20);
/// let chunks = chunker.chunk("doc1", &text, None, &HashMap::new()).unwrap();
/// assert!(!chunks.is_empty());
/// ```
pub trait Chunker: Send + Sync {
    /// Chunks the input text into segments belonging to `document_id`.
    ///
    /// `metadata` is the document's metadata, inherited verbatim by every
    /// produced chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if chunking fails (e.g., invalid configuration).
    fn chunk(
        &self,
        document_id: &str,
        text: &str,
        config: Option<&ChunkerConfig>,
        metadata: &HashMap<String, String>,
    ) -> Result<Vec<Chunk>>;

    /// Returns the name of the chunking strategy.
    fn name(&self) -> &'static str;

    /// Returns whether this chunker supports parallel processing.
    ///
    /// Default is `false`. Chunkers that benefit from parallelization
    /// should override this to return `true`.
    fn supports_parallel(&self) -> bool {
        false
    }

    /// Returns a description of the chunking strategy.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Validates configuration before chunking.
    ///
    /// # Errors
    ///
    /// Returns an error if chunk size is zero or overlap is not strictly
    /// less than chunk size.
    fn validate(&self, config: Option<&ChunkerConfig>) -> Result<()> {
        if let Some(config) = config {
            if config.chunk_size == 0 {
                return Err(crate::error::ChunkingError::InvalidConfig {
                    reason: "chunk_size must be > 0".to_string(),
                }
                .into());
            }
            if config.overlap >= config.chunk_size {
                return Err(crate::error::ChunkingError::OverlapTooLarge {
                    overlap: config.overlap,
                    size: config.chunk_size,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Configuration provided to chunkers for context-aware processing.
///
/// Allows callers to customize chunking behavior without modifying the
/// chunker itself.
#[derive(Debug, Clone, Default)]
pub struct ChunkerConfig {
    /// Source file path (for content-type detection).
    pub source: Option<String>,

    /// File MIME type or extension (e.g., "md", "json", "py").
    pub content_type: Option<String>,

    /// Target chunk size in characters.
    pub chunk_size: usize,

    /// Overlap between consecutive chunks, in characters.
    pub overlap: usize,

    /// Whether to preserve line boundaries.
    pub preserve_lines: bool,

    /// Whether to preserve sentence boundaries.
    pub preserve_sentences: bool,

    /// Maximum chunks to produce (0 = unlimited).
    pub max_chunks: usize,
}

impl ChunkerConfig {
    /// Creates a new configuration with the default chunk size and overlap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: super::DEFAULT_CHUNK_SIZE,
            overlap: super::DEFAULT_OVERLAP,
            preserve_lines: true,
            preserve_sentences: false,
            ..Default::default()
        }
    }

    /// Creates a configuration with a custom chunk size and no overlap.
    #[must_use]
    pub fn with_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            overlap: 0,
            ..Self::new()
        }
    }

    /// Creates a configuration with a custom size and overlap.
    #[must_use]
    pub fn with_size_and_overlap(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
            ..Self::new()
        }
    }

    /// Sets the source path.
    #[must_use]
    pub fn source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Sets whether to preserve line boundaries.
    #[must_use]
    pub const fn preserve_lines(mut self, preserve: bool) -> Self {
        self.preserve_lines = preserve;
        self
    }

    /// Sets whether to preserve sentence boundaries.
    #[must_use]
    pub const fn preserve_sentences(mut self, preserve: bool) -> Self {
        self.preserve_sentences = preserve;
        self
    }

    /// Sets the maximum number of chunks to produce.
    #[must_use]
    pub const fn max_chunks(mut self, max: usize) -> Self {
        self.max_chunks = max;
        self
    }
}
