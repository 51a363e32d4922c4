//! Database schema definitions.
//!
//! Contains the SQL schema and migration logic for the `SQLite`-backed
//! document/chunk store.

/// Current schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// SQL schema for initial database setup.
pub const SCHEMA_SQL: &str = r"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_info (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Documents: the unit of ingestion.
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    source_kind TEXT NOT NULL,   -- 'inline' | 'path' | 'url'
    source_ref TEXT,             -- path or url, NULL for inline
    content TEXT NOT NULL,
    metadata TEXT NOT NULL,      -- JSON object
    created_at INTEGER NOT NULL
);

-- Chunks: unit of retrieval. One row per chunk, embedding stored alongside
-- its content so vector search and keyword search share one table.
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,             -- '<document_id>#<ordinal>'
    document_id TEXT NOT NULL,
    ordinal INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB,                  -- f32 array, little-endian, or NULL until embedded
    dimensions INTEGER,
    metadata TEXT NOT NULL,          -- JSON object, inherited from the document
    created_at INTEGER NOT NULL,
    FOREIGN KEY (document_id) REFERENCES documents(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);
CREATE INDEX IF NOT EXISTS idx_chunks_order ON chunks(document_id, ordinal);

-- FTS5 virtual table for BM25 keyword search, kept in sync via triggers.
CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
    content,
    content='chunks',
    content_rowid='rowid',
    tokenize='porter unicode61'
);

CREATE TRIGGER IF NOT EXISTS chunks_ai AFTER INSERT ON chunks BEGIN
    INSERT INTO chunks_fts(rowid, content) VALUES (new.rowid, new.content);
END;

CREATE TRIGGER IF NOT EXISTS chunks_ad AFTER DELETE ON chunks BEGIN
    INSERT INTO chunks_fts(chunks_fts, rowid, content) VALUES('delete', old.rowid, old.content);
END;

CREATE TRIGGER IF NOT EXISTS chunks_au AFTER UPDATE ON chunks BEGIN
    INSERT INTO chunks_fts(chunks_fts, rowid, content) VALUES('delete', old.rowid, old.content);
    INSERT INTO chunks_fts(rowid, content) VALUES (new.rowid, new.content);
END;
";

/// SQL to check if schema is initialized.
pub const CHECK_SCHEMA_SQL: &str = r"
SELECT COUNT(*) FROM sqlite_master
WHERE type='table' AND name='schema_info';
";

/// SQL to get schema version.
pub const GET_VERSION_SQL: &str = r"
SELECT value FROM schema_info WHERE key = 'version';
";

/// SQL to set schema version.
pub const SET_VERSION_SQL: &str = r"
INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?);
";

/// A migration step from one schema version to the next.
pub struct Migration {
    /// Version this migration upgrades from.
    pub from_version: u32,
    /// Version this migration upgrades to.
    pub to_version: u32,
    /// SQL statements to execute.
    pub sql: &'static str,
}

/// Available migrations, applied in order. Empty for a version-1-only schema;
/// the slot exists so a future field addition follows the same path the
/// embeddings/FTS5 migration once took in the teacher's schema.
pub const MIGRATIONS: &[Migration] = &[];

/// Returns the migrations needed to bring a database from `current_version`
/// up to [`CURRENT_SCHEMA_VERSION`].
#[must_use]
pub fn get_migrations_from(current_version: u32) -> Vec<&'static Migration> {
    MIGRATIONS
        .iter()
        .filter(|m| m.from_version >= current_version && m.to_version <= CURRENT_SCHEMA_VERSION)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_version_is_positive() {
        const _: () = assert!(CURRENT_SCHEMA_VERSION >= 1);
    }

    #[test]
    fn schema_sql_defines_documents_and_chunks() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS documents"));
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS chunks"));
        assert!(SCHEMA_SQL.contains("fts5"));
    }

    #[test]
    fn migrations_are_ordered() {
        for migration in MIGRATIONS {
            assert!(migration.to_version > migration.from_version);
        }
    }

    #[test]
    fn get_migrations_from_fresh_install_is_empty_or_bounded() {
        let migrations = get_migrations_from(0);
        assert!(migrations.len() <= MIGRATIONS.len());
    }
}
