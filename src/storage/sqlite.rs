//! `SQLite` storage implementation.
//!
//! Backs [`DocumentStore`], [`VectorStore`], and [`KeywordStore`] with one
//! connection: chunk content, embedding, and FTS5 keyword index all live in
//! the same table, so one struct implements all three traits. Vector search
//! is a brute-force cosine scan over stored embeddings rather than an ANN
//! index; the trait contract only requires rank order, and the teacher's
//! own hybrid search used the same brute-force approach.

// SQLite stores all integers as i64. These casts are intentional and safe
// because we only store non-negative values that fit in usize.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::core::{Chunk, Document, DocumentSource};
use crate::embedding::cosine_similarity;
use crate::error::{Result, StorageError};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, GET_VERSION_SQL, SCHEMA_SQL, SET_VERSION_SQL,
};
use crate::storage::traits::{DocumentStore, KeywordStore, StorageStats, VectorStore};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// `SQLite`-based store for documents, chunks, vectors, and keyword index.
///
/// # Examples
///
/// ```no_run
/// use ragcore::storage::SqliteStore;
/// use ragcore::storage::DocumentStore;
///
/// let store = SqliteStore::open("rag-state.db").unwrap();
/// store.init().unwrap();
/// ```
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens or creates a `SQLite` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Database(e.to_string()))?;
            }
        }

        let conn = Connection::open(&path).map_err(StorageError::from)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::from)?;
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
        })
    }

    /// Creates an in-memory `SQLite` database. Useful for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Returns the database path (`None` for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection mutex poisoned".to_string()))
    }

    fn get_schema_version(conn: &Connection) -> Result<Option<u32>> {
        let version: Option<String> = conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?;
        Ok(version.and_then(|v| v.parse().ok()))
    }

    fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
        conn.execute(SET_VERSION_SQL, params![version.to_string()])
            .map_err(StorageError::from)?;
        Ok(())
    }

    #[allow(clippy::cast_possible_wrap)]
    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<Document> {
        let source_kind: String = row.get(1)?;
        let source_ref: Option<String> = row.get(2)?;
        let source = match source_kind.as_str() {
            "path" => DocumentSource::Path(source_ref.unwrap_or_default()),
            "url" => DocumentSource::Url(source_ref.unwrap_or_default()),
            _ => DocumentSource::Inline,
        };
        let metadata_json: String = row.get(4)?;
        let metadata: HashMap<String, String> =
            serde_json::from_str(&metadata_json).unwrap_or_default();

        Ok(Document {
            id: row.get(0)?,
            source,
            content: row.get(3)?,
            metadata,
            created: row.get(5)?,
        })
    }

    fn row_to_chunk(row: &rusqlite::Row) -> rusqlite::Result<Chunk> {
        let metadata_json: String = row.get(5)?;
        let metadata: HashMap<String, String> =
            serde_json::from_str(&metadata_json).unwrap_or_default();
        let embedding: Option<Vec<u8>> = row.get(4)?;
        let vector = embedding.map_or_else(Vec::new, |bytes| {
            bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect()
        });

        Ok(Chunk {
            id: row.get(0)?,
            document_id: row.get(1)?,
            ordinal: row.get::<_, i64>(2)? as usize,
            content: row.get(3)?,
            vector,
            metadata,
            score: None,
        })
    }
}

impl DocumentStore for SqliteStore {
    fn init(&self) -> Result<()> {
        let conn = self.lock()?;
        let is_init: i64 = conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;

        if is_init == 0 {
            conn.execute_batch(SCHEMA_SQL).map_err(StorageError::from)?;
            Self::set_schema_version(&conn, CURRENT_SCHEMA_VERSION)?;
        } else if let Some(current) = Self::get_schema_version(&conn)? {
            if current < CURRENT_SCHEMA_VERSION {
                for migration in crate::storage::schema::get_migrations_from(current) {
                    conn.execute_batch(migration.sql)
                        .map_err(|e| StorageError::Migration(e.to_string()))?;
                }
                Self::set_schema_version(&conn, CURRENT_SCHEMA_VERSION)?;
            }
        }

        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count > 0)
    }

    fn put_document(&self, document: &Document) -> Result<()> {
        let conn = self.lock()?;
        let (source_kind, source_ref) = match &document.source {
            DocumentSource::Inline => ("inline", None),
            DocumentSource::Path(p) => ("path", Some(p.as_str())),
            DocumentSource::Url(u) => ("url", Some(u.as_str())),
        };
        let metadata_json = serde_json::to_string(&document.metadata).map_err(StorageError::from)?;

        conn.execute(
            r"
            INSERT INTO documents (id, source_kind, source_ref, content, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
        ",
            params![
                document.id,
                source_kind,
                source_ref,
                document.content,
                metadata_json,
                document.created,
            ],
        )
        .map_err(StorageError::from)?;

        Ok(())
    }

    fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                "SELECT id, source_kind, source_ref, content, metadata, created_at FROM documents WHERE id = ?",
                params![id],
                Self::row_to_document,
            )
            .optional()
            .map_err(StorageError::from)?;
        Ok(result)
    }

    fn list_documents(&self) -> Result<Vec<Document>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, source_kind, source_ref, content, metadata, created_at FROM documents ORDER BY created_at",
            )
            .map_err(StorageError::from)?;
        let documents = stmt
            .query_map([], Self::row_to_document)
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;
        Ok(documents)
    }

    fn delete_document(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM documents WHERE id = ?", params![id])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("DELETE FROM chunks; DELETE FROM documents;")
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn put_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(StorageError::from)?;
        let now = Self::now();

        {
            let mut stmt = tx
                .prepare(
                    r"
                INSERT INTO chunks (id, document_id, ordinal, content, embedding, dimensions, metadata, created_at)
                VALUES (?, ?, ?, ?, NULL, NULL, ?, ?)
            ",
                )
                .map_err(StorageError::from)?;

            for chunk in chunks {
                let metadata_json =
                    serde_json::to_string(&chunk.metadata).map_err(StorageError::from)?;
                stmt.execute(params![
                    chunk.id,
                    chunk.document_id,
                    chunk.ordinal as i64,
                    chunk.content,
                    metadata_json,
                    now,
                ])
                .map_err(StorageError::from)?;
            }
        }

        tx.commit().map_err(StorageError::from)?;
        Ok(())
    }

    fn get_chunks(&self, document_id: &str) -> Result<Vec<Chunk>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                r"
            SELECT id, document_id, ordinal, content, embedding, metadata
            FROM chunks WHERE document_id = ? ORDER BY ordinal
        ",
            )
            .map_err(StorageError::from)?;
        let chunks = stmt
            .query_map(params![document_id], Self::row_to_chunk)
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;
        Ok(chunks)
    }

    fn get_chunk(&self, id: &str) -> Result<Option<Chunk>> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                "SELECT id, document_id, ordinal, content, embedding, metadata FROM chunks WHERE id = ?",
                params![id],
                Self::row_to_chunk,
            )
            .optional()
            .map_err(StorageError::from)?;
        Ok(result)
    }
}

impl VectorStore for SqliteStore {
    fn index(&self, chunk: &Chunk) -> Result<()> {
        let conn = self.lock()?;

        let existing_dim: Option<i64> = conn
            .query_row(
                "SELECT dimensions FROM chunks WHERE dimensions IS NOT NULL LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(StorageError::from)?;

        if let Some(expected) = existing_dim {
            if chunk.vector.len() as i64 != expected {
                return Err(StorageError::DimensionMismatch {
                    actual: chunk.vector.len(),
                    expected: expected as usize,
                }
                .into());
            }
        }

        let bytes: Vec<u8> = chunk.vector.iter().flat_map(|f| f.to_le_bytes()).collect();
        conn.execute(
            "UPDATE chunks SET embedding = ?, dimensions = ? WHERE id = ?",
            params![bytes, chunk.vector.len() as i64, chunk.id],
        )
        .map_err(StorageError::from)?;

        Ok(())
    }

    fn search(&self, vector: &[f32], top_k: usize) -> Result<Vec<Chunk>> {
        self.search_with_filters(vector, top_k, &HashMap::new())
    }

    fn search_with_filters(
        &self,
        vector: &[f32],
        top_k: usize,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<Chunk>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                r"
            SELECT id, document_id, ordinal, content, embedding, metadata
            FROM chunks WHERE embedding IS NOT NULL
        ",
            )
            .map_err(StorageError::from)?;

        let mut scored: Vec<(f32, Chunk)> = stmt
            .query_map([], Self::row_to_chunk)
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?
            .into_iter()
            .filter(|chunk| matches_filters(chunk, filters))
            .map(|chunk| (cosine_similarity(vector, &chunk.vector), chunk))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(top_k);

        Ok(scored.into_iter().map(|(_, chunk)| chunk).collect())
    }

    fn delete(&self, document_id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM chunks WHERE document_id = ?",
            params![document_id],
        )
        .map_err(StorageError::from)?;
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("UPDATE chunks SET embedding = NULL, dimensions = NULL;")
            .map_err(StorageError::from)?;
        Ok(())
    }
}

impl KeywordStore for SqliteStore {
    fn search(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        let conn = self.lock()?;

        let fts_query = query
            .split_whitespace()
            .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(" OR ");

        if fts_query.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = conn
            .prepare(
                r"
            SELECT c.id, c.document_id, c.ordinal, c.content, c.embedding, c.metadata
            FROM chunks_fts
            JOIN chunks c ON c.rowid = chunks_fts.rowid
            WHERE chunks_fts MATCH ?
            ORDER BY bm25(chunks_fts)
            LIMIT ?
        ",
            )
            .map_err(StorageError::from)?;

        let chunks = stmt
            .query_map(params![fts_query, top_k as i64], Self::row_to_chunk)
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        Ok(chunks)
    }

    fn delete(&self, document_id: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM chunks WHERE document_id = ?",
            params![document_id],
        )
        .map_err(StorageError::from)?;
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r"
            INSERT INTO chunks_fts(chunks_fts) VALUES('rebuild');
        ",
        )
        .map_err(StorageError::from)?;
        Ok(())
    }
}

impl SqliteStore {
    /// Gathers store-wide statistics for a health/status report.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the underlying counts fail.
    pub fn stats(&self) -> Result<StorageStats> {
        let conn = self.lock()?;

        let document_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(StorageError::from)?;
        let chunk_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(StorageError::from)?;
        let total_size: i64 = conn
            .query_row("SELECT COALESCE(SUM(LENGTH(content)), 0) FROM documents", [], |row| {
                row.get(0)
            })
            .map_err(StorageError::from)?;
        let schema_version = Self::get_schema_version(&conn)?.unwrap_or(0);

        Ok(StorageStats {
            document_count: document_count as usize,
            chunk_count: chunk_count as usize,
            total_content_size: total_size as usize,
            schema_version,
        })
    }
}

fn matches_filters(chunk: &Chunk, filters: &HashMap<String, String>) -> bool {
    filters
        .iter()
        .all(|(k, v)| chunk.metadata.get(k) == Some(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.init().unwrap();
        store
    }

    fn sample_document(id: &str, content: &str) -> Document {
        Document {
            id: id.to_string(),
            source: DocumentSource::Inline,
            content: content.to_string(),
            metadata: HashMap::new(),
            created: 0,
        }
    }

    #[test]
    fn init_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        store.init().unwrap();
        store.init().unwrap();
        assert!(store.is_initialized().unwrap());
    }

    #[test]
    fn document_crud() {
        let store = setup();
        let doc = sample_document("doc1", "hello world");
        store.put_document(&doc).unwrap();

        let loaded = store.get_document("doc1").unwrap().unwrap();
        assert_eq!(loaded.content, "hello world");

        let all = store.list_documents().unwrap();
        assert_eq!(all.len(), 1);

        store.delete_document("doc1").unwrap();
        assert!(store.get_document("doc1").unwrap().is_none());
    }

    #[test]
    fn deleting_document_cascades_chunks() {
        let store = setup();
        let doc = sample_document("doc1", "hello world");
        store.put_document(&doc).unwrap();

        let chunk = Chunk::new("doc1".into(), 0, "hello".into(), HashMap::new());
        store.put_chunks(&[chunk]).unwrap();
        assert_eq!(store.get_chunks("doc1").unwrap().len(), 1);

        store.delete_document("doc1").unwrap();
        assert!(store.get_chunks("doc1").unwrap().is_empty());
    }

    #[test]
    fn vector_search_ranks_by_similarity() {
        let store = setup();
        let doc = sample_document("doc1", "hello world");
        store.put_document(&doc).unwrap();

        let mut near = Chunk::new("doc1".into(), 0, "near".into(), HashMap::new());
        near.vector = vec![1.0, 0.0, 0.0];
        let mut far = Chunk::new("doc1".into(), 1, "far".into(), HashMap::new());
        far.vector = vec![0.0, 1.0, 0.0];

        store.put_chunks(&[near.clone(), far.clone()]).unwrap();
        VectorStore::index(&store, &near).unwrap();
        VectorStore::index(&store, &far).unwrap();

        let results = VectorStore::search(&store, &[1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "doc1#0");
    }

    #[test]
    fn vector_index_rejects_dimension_mismatch() {
        let store = setup();
        let doc = sample_document("doc1", "hello");
        store.put_document(&doc).unwrap();

        let mut a = Chunk::new("doc1".into(), 0, "a".into(), HashMap::new());
        a.vector = vec![1.0, 0.0];
        let mut b = Chunk::new("doc1".into(), 1, "b".into(), HashMap::new());
        b.vector = vec![1.0, 0.0, 0.0];

        store.put_chunks(&[a.clone(), b.clone()]).unwrap();
        VectorStore::index(&store, &a).unwrap();
        let err = VectorStore::index(&store, &b).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::IndexError);
    }

    #[test]
    fn keyword_search_finds_matching_chunks() {
        let store = setup();
        let doc = sample_document("doc1", "the quick brown fox");
        store.put_document(&doc).unwrap();

        let chunk = Chunk::new("doc1".into(), 0, "the quick brown fox".into(), HashMap::new());
        store.put_chunks(&[chunk]).unwrap();

        let results = KeywordStore::search(&store, "quick fox", 5).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn search_with_filters_excludes_non_matching_metadata() {
        let store = setup();
        let doc = sample_document("doc1", "content");
        store.put_document(&doc).unwrap();

        let mut meta_a = HashMap::new();
        meta_a.insert("lang".to_string(), "en".to_string());
        let mut a = Chunk::new("doc1".into(), 0, "a".into(), meta_a);
        a.vector = vec![1.0, 0.0];

        let mut meta_b = HashMap::new();
        meta_b.insert("lang".to_string(), "fr".to_string());
        let mut b = Chunk::new("doc1".into(), 1, "b".into(), meta_b);
        b.vector = vec![1.0, 0.0];

        store.put_chunks(&[a.clone(), b.clone()]).unwrap();
        VectorStore::index(&store, &a).unwrap();
        VectorStore::index(&store, &b).unwrap();

        let mut filters = HashMap::new();
        filters.insert("lang".to_string(), "en".to_string());
        let results = VectorStore::search_with_filters(&store, &[1.0, 0.0], 10, &filters).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "doc1#0");
    }

    #[test]
    fn reset_clears_documents_and_chunks() {
        let store = setup();
        store.put_document(&sample_document("doc1", "x")).unwrap();
        DocumentStore::reset(&store).unwrap();
        assert!(store.list_documents().unwrap().is_empty());
    }

    #[test]
    fn stats_reflect_stored_content() {
        let store = setup();
        store.put_document(&sample_document("doc1", "hello world")).unwrap();
        let chunk = Chunk::new("doc1".into(), 0, "hello world".into(), HashMap::new());
        store.put_chunks(&[chunk]).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.document_count, 1);
        assert_eq!(stats.chunk_count, 1);
        assert_eq!(stats.total_content_size, 11);
    }
}
