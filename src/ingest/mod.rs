//! Ingestion pipeline: content extraction, metadata extraction, chunking,
//! embedding, and dual-index writes.

pub mod content_extractor;
pub mod metadata_extractor;
pub mod orchestrator;

pub use content_extractor::{ContentExtractor, IngestSource};
pub use metadata_extractor::{ExtractedMetadata, MetadataExtractor};
pub use orchestrator::{IngestRequest, IngestResponse, IngestionOrchestrator};
