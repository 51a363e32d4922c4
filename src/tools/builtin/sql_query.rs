//! `sql_query` built-in tool: read-only `SELECT` queries against an
//! allow-listed set of SQLite databases.

use crate::tools::{Tool, require_str};
use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Runs read-only `SELECT` statements against one of a fixed set of
/// allowed database paths.
///
/// Statements other than `SELECT` are rejected at validation time rather
/// than relying on the database's own permissions.
pub struct SqlQueryTool {
    allowed_databases: Vec<String>,
}

impl SqlQueryTool {
    /// Creates the tool restricted to the given database paths.
    #[must_use]
    pub fn new(allowed_databases: Vec<String>) -> Self {
        Self { allowed_databases }
    }

    fn check_database(&self, database: &str) -> Result<(), String> {
        if self.allowed_databases.iter().any(|d| d == database) {
            Ok(())
        } else {
            Err(format!("database '{database}' is not in the allowed list"))
        }
    }

    fn check_select_only(query: &str) -> Result<(), String> {
        let trimmed = query.trim_start().to_lowercase();
        if trimmed.starts_with("select") {
            Ok(())
        } else {
            Err("only SELECT statements are permitted".to_string())
        }
    }
}

#[async_trait]
impl Tool for SqlQueryTool {
    fn name(&self) -> &str {
        "sql_query"
    }

    fn description(&self) -> &str {
        "Runs a read-only SELECT query against an allow-listed SQLite database."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "database": {
                    "type": "string",
                    "description": "Database path; must be allow-listed."
                },
                "query": {
                    "type": "string",
                    "description": "A SELECT statement."
                }
            },
            "required": ["database", "query"],
            "additionalProperties": false
        })
    }

    fn validate(&self, arguments: &HashMap<String, Value>) -> Result<(), String> {
        let database = require_str(arguments, "database")?;
        self.check_database(database)?;
        let query = require_str(arguments, "query")?;
        Self::check_select_only(query)
    }

    async fn execute(&self, arguments: HashMap<String, Value>) -> Result<Value, String> {
        let database = require_str(&arguments, "database")?;
        self.check_database(database)?;
        let query = require_str(&arguments, "query")?.to_string();
        Self::check_select_only(&query)?;
        let database = database.to_string();

        tokio::task::spawn_blocking(move || run_select(&database, &query))
            .await
            .map_err(|e| format!("query task failed: {e}"))?
    }
}

fn run_select(database: &str, query: &str) -> Result<Value, String> {
    let conn = Connection::open_with_flags(database, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| format!("failed to open '{database}': {e}"))?;

    let mut statement = conn.prepare(query).map_err(|e| format!("failed to prepare query: {e}"))?;
    let column_names: Vec<String> = statement.column_names().iter().map(|s| (*s).to_string()).collect();

    let rows = statement
        .query_map([], |row| {
            let mut object = serde_json::Map::new();
            for (i, name) in column_names.iter().enumerate() {
                let value: Value = match row.get_ref(i)? {
                    rusqlite::types::ValueRef::Null => Value::Null,
                    rusqlite::types::ValueRef::Integer(n) => json!(n),
                    rusqlite::types::ValueRef::Real(f) => json!(f),
                    rusqlite::types::ValueRef::Text(t) => json!(String::from_utf8_lossy(t)),
                    rusqlite::types::ValueRef::Blob(_) => Value::String("<blob>".to_string()),
                };
                object.insert(name.clone(), value);
            }
            Ok(Value::Object(object))
        })
        .map_err(|e| format!("failed to execute query: {e}"))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row.map_err(|e| format!("failed to read row: {e}"))?);
    }

    Ok(json!({ "rows": results }))
}
