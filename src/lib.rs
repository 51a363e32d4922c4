//! # ragcore
//!
//! A retrieval-augmented generation engine: ingest documents into a dual
//! semantic/keyword index, retrieve with reciprocal-rank-fused hybrid
//! search, and generate answers with an optional tool-calling loop.
//!
//! ## Features
//!
//! - **Chunking**: fixed and semantic strategies over ingested text
//! - **`SQLite` Storage**: documents, chunks, vectors, and a keyword index
//!   behind three narrow storage traits, one `SQLite` implementation
//! - **Hybrid retrieval**: vector and keyword search fused with
//!   reciprocal rank fusion
//! - **Tool calling**: an agentic loop that lets a generator invoke
//!   registered tools between generation turns
//!
//! Parsing a configuration file, exposing an HTTP API, or a CLI are the
//! job of whatever embeds this crate; none of that lives here.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod agent;
pub mod chunking;
pub mod config;
pub mod core;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod io;
pub mod query;
pub mod search;
pub mod storage;
pub mod tools;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, Result};

// Re-export the engine façade
pub use engine::{EngineStatus, RagEngine};

// Re-export configuration types
pub use config::{BuiltinToolsConfig, ChunkingConfig, IngestConfig, RagConfig, RetrievalConfig, SecurityLevel, ToolsConfig};

// Re-export core domain types
pub use core::{Chunk, Document, DocumentSource};

// Re-export storage types
pub use storage::{DEFAULT_DB_PATH, DocumentStore, KeywordStore, SqliteStore, StorageStats, VectorStore};

// Re-export chunking types
pub use chunking::{Chunker, ChunkerConfig, FixedChunker, SemanticChunker, default_chunker};

// Re-export embedding types
#[cfg(feature = "fastembed-embeddings")]
pub use embedding::FastEmbedEmbedder;
pub use embedding::{DEFAULT_DIMENSIONS, Embedder, FallbackEmbedder, cosine_similarity, create_embedder};

// Re-export search types
pub use search::{DEFAULT_TOP_K, HybridRetriever, RrfConfig, reciprocal_rank_fusion, weighted_rrf};

// Re-export generation types
pub use generation::{GenerateOptions, GenerationResult, Generator, StubGenerator};

// Re-export ingestion types
pub use ingest::{ExtractedMetadata, IngestRequest, IngestResponse, IngestionOrchestrator, MetadataExtractor};

// Re-export query types
pub use query::{QueryOrchestrator, QueryRequest, QueryResponse};

// Re-export tool-calling types
pub use tools::{ExecutedToolCall, Tool, ToolCall, ToolDefinition, ToolExecutor, ToolRegistry};

// Re-export the agentic tool-calling coordinator
pub use agent::{CoordinatorOutcome, ToolCallingCoordinator};
