//! Storage layer.
//!
//! Provides persistent storage for documents, chunks, vectors, and the
//! keyword index using `SQLite`.

pub mod schema;
pub mod sqlite;
pub mod traits;

pub use schema::{CURRENT_SCHEMA_VERSION, SCHEMA_SQL};
pub use sqlite::SqliteStore;
pub use traits::{DocumentStore, KeywordStore, StorageStats, VectorStore};

/// Default database file name.
pub const DEFAULT_DB_NAME: &str = "rag-state.db";

/// Default database path relative to project root.
pub const DEFAULT_DB_PATH: &str = ".ragcore/rag-state.db";
