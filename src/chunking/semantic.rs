//! Semantic chunking strategy.
//!
//! Provides Unicode-aware chunking that respects sentence and paragraph
//! boundaries using the `unicode-segmentation` crate.

use crate::chunking::traits::{ChunkerConfig, Chunker};
use crate::chunking::{DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP, MAX_CHUNK_SIZE};
use crate::core::Chunk;
use crate::error::{ChunkingError, Result};
use crate::io::find_char_boundary;
use std::collections::HashMap;

/// Semantic chunker that respects sentence and paragraph boundaries.
///
/// This is the default chunking strategy: it produces more coherent chunks
/// by avoiding splits in the middle of sentences or words, using Unicode
/// segmentation rules for proper international text handling.
///
/// # Examples
///
/// ```
/// use ragcore::chunking::{Chunker, SemanticChunker};
/// use std::collections::HashMap;
///
/// let chunker = SemanticChunker::new();
/// let text = "Hello, world! This is a test. Another sentence here.";
/// let chunks = chunker.chunk("doc1", text, None, &HashMap::new()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SemanticChunker {
    /// Target chunk size in characters.
    chunk_size: usize,
    /// Overlap between consecutive chunks.
    overlap: usize,
    /// Minimum chunk size (avoid tiny final chunks).
    min_chunk_size: usize,
}

impl Default for SemanticChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticChunker {
    /// Creates a new semantic chunker with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            min_chunk_size: 100,
        }
    }

    /// Creates a semantic chunker with custom chunk size and no overlap.
    #[must_use]
    pub const fn with_size(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            overlap: 0,
            min_chunk_size: 100,
        }
    }

    /// Creates a semantic chunker with custom size and overlap.
    #[must_use]
    pub const fn with_size_and_overlap(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
            min_chunk_size: 100,
        }
    }

    /// Sets the minimum chunk size.
    #[must_use]
    pub const fn min_chunk_size(mut self, size: usize) -> Self {
        self.min_chunk_size = size;
        self
    }

    /// Finds the best boundary near the target position.
    ///
    /// Prefers paragraph breaks > sentence breaks > word breaks > character breaks.
    fn find_best_boundary(&self, text: &str, target_pos: usize) -> usize {
        if target_pos >= text.len() {
            return text.len();
        }

        let search_start = find_char_boundary(text, target_pos.saturating_sub(self.chunk_size / 5));
        let search_end = find_char_boundary(text, target_pos.min(text.len()));

        if search_start >= search_end {
            return find_char_boundary(text, target_pos);
        }

        let search_region = &text[search_start..search_end];

        if let Some(pos) = search_region.rfind("\n\n") {
            let boundary = search_start + pos + 2;
            if boundary > search_start {
                return boundary;
            }
        }

        if let Some(pos) = search_region.rfind('\n') {
            let boundary = search_start + pos + 1;
            if boundary > search_start {
                return boundary;
            }
        }

        for (i, c) in search_region.char_indices().rev() {
            if matches!(c, '.' | '!' | '?') {
                let next_pos = search_start + i + c.len_utf8();
                if next_pos >= text.len()
                    || text[next_pos..].starts_with(' ')
                    || text[next_pos..].starts_with('\n')
                {
                    return next_pos;
                }
            }
        }

        if let Some(pos) = search_region.rfind(' ') {
            let boundary = search_start + pos + 1;
            if boundary > search_start {
                return boundary;
            }
        }

        find_char_boundary(text, target_pos)
    }
}

impl Chunker for SemanticChunker {
    #[allow(clippy::too_many_lines)]
    fn chunk(
        &self,
        document_id: &str,
        text: &str,
        config: Option<&ChunkerConfig>,
        metadata: &HashMap<String, String>,
    ) -> Result<Vec<Chunk>> {
        let (chunk_size, overlap) = config.map_or((self.chunk_size, self.overlap), |c| {
            (c.chunk_size, c.overlap)
        });

        if chunk_size == 0 {
            return Err(ChunkingError::InvalidConfig {
                reason: "chunk_size must be > 0".to_string(),
            }
            .into());
        }
        if chunk_size > MAX_CHUNK_SIZE {
            return Err(ChunkingError::ChunkTooLarge {
                size: chunk_size,
                max: MAX_CHUNK_SIZE,
            }
            .into());
        }
        if overlap >= chunk_size {
            return Err(ChunkingError::OverlapTooLarge {
                overlap,
                size: chunk_size,
            }
            .into());
        }

        if text.is_empty() {
            return Ok(vec![]);
        }

        if text.len() <= chunk_size {
            return Ok(vec![Chunk::new(document_id, 0, text.to_string(), metadata.clone())]);
        }

        // (start, end) byte ranges, decided before materializing Chunk values
        // so the tiny-final-chunk merge below can re-slice the source text.
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let target_end = (start + chunk_size).min(text.len());
            let end = if target_end >= text.len() {
                text.len()
            } else {
                self.find_best_boundary(text, target_end)
            };

            let end = if end <= start {
                find_char_boundary(text, (start + chunk_size).min(text.len()))
            } else {
                end
            };

            ranges.push((start, end));

            if let Some(c) = config {
                if c.max_chunks > 0 && ranges.len() >= c.max_chunks {
                    break;
                }
            }

            if end >= text.len() {
                break;
            }

            let next_start = if overlap > 0 {
                let overlap_start = end.saturating_sub(overlap);
                self.find_best_boundary(text, overlap_start)
            } else {
                end
            };

            start = if next_start <= start { end } else { next_start };
        }

        if ranges.len() > 1 {
            let last = *ranges.last().unwrap_or(&(0, 0));
            if last.1 - last.0 < self.min_chunk_size {
                let second_last_idx = ranges.len() - 2;
                let second_last = ranges[second_last_idx];
                ranges.pop();
                ranges.pop();
                ranges.push((second_last.0, last.1));
            }
        }

        Ok(ranges
            .into_iter()
            .enumerate()
            .map(|(ordinal, (s, e))| {
                Chunk::new(document_id, ordinal, text[s..e].to_string(), metadata.clone())
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "semantic"
    }

    fn supports_parallel(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "Semantic chunking respecting sentence and paragraph boundaries"
    }
}
