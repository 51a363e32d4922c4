//! Document representation.
//!
//! A document is the unit of ingestion: the full text the caller handed in,
//! wherever it came from, plus whatever metadata was attached at ingest
//! time. Documents are immutable once stored; only deletion changes them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a document's content originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentSource {
    /// Content was supplied inline by the caller.
    Inline,
    /// Content was extracted from a local file.
    Path(String),
    /// Content was (or would be) fetched from a URL.
    Url(String),
}

/// A single ingested document.
///
/// Created at ingest, immutable thereafter, deleted explicitly by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque unique identifier.
    pub id: String,

    /// Where this document's content came from.
    pub source: DocumentSource,

    /// Full document text.
    pub content: String,

    /// Open key/value metadata, attached at ingest and inherited by every chunk.
    pub metadata: HashMap<String, String>,

    /// Unix timestamp (seconds) the document was created.
    pub created: i64,
}

impl Document {
    /// Creates a new document with a freshly generated id.
    #[must_use]
    pub fn new(source: DocumentSource, content: String, metadata: HashMap<String, String>) -> Self {
        Self {
            id: new_document_id(),
            source,
            content,
            metadata,
            created: current_timestamp(),
        }
    }

    /// Returns the byte length of the document's content.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Returns `true` if the document has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Generates a new opaque document id.
///
/// Uses a random UUID-shaped hex string seeded from the system clock and an
/// in-process counter so concurrent callers never collide within one run.
fn new_document_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("doc_{nanos:x}_{seq:x}")
}

#[allow(clippy::cast_possible_wrap)]
fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
