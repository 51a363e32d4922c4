//! `file_operations` built-in tool: reads a file or lists a directory,
//! constrained to a prefix allow-list.

use crate::tools::{Tool, require_str};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reads files and lists directories under a fixed set of allowed path
/// prefixes.
///
/// A request outside every allowed prefix is rejected during `validate` as
/// `InvalidInput`-shaped (a human message, since tool failures are
/// in-band), never as a filesystem error — the model must not be able to
/// distinguish "outside the sandbox" from "doesn't exist".
pub struct FileOperationsTool {
    allowed_paths: Vec<PathBuf>,
}

impl FileOperationsTool {
    /// Creates the tool restricted to the given allowed path prefixes.
    #[must_use]
    pub fn new(allowed_paths: Vec<PathBuf>) -> Self {
        Self { allowed_paths }
    }

    fn check_allowed(&self, path: &Path) -> Result<(), String> {
        if self.allowed_paths.iter().any(|prefix| path.starts_with(prefix)) {
            Ok(())
        } else {
            Err(format!("path '{}' is outside the allowed sandbox", path.display()))
        }
    }
}

#[async_trait]
impl Tool for FileOperationsTool {
    fn name(&self) -> &str {
        "file_operations"
    }

    fn description(&self) -> &str {
        "Reads a file or lists a directory, restricted to an allowed path prefix."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["read", "list"],
                    "description": "Whether to read a file's content or list a directory."
                },
                "path": {
                    "type": "string",
                    "description": "Path to read or list."
                }
            },
            "required": ["action", "path"],
            "additionalProperties": false
        })
    }

    fn validate(&self, arguments: &HashMap<String, Value>) -> Result<(), String> {
        let action = require_str(arguments, "action")?;
        if action != "read" && action != "list" {
            return Err(format!("unknown file_operations action '{action}'"));
        }
        let path = require_str(arguments, "path")?;
        self.check_allowed(Path::new(path))
    }

    async fn execute(&self, arguments: HashMap<String, Value>) -> Result<Value, String> {
        let action = require_str(&arguments, "action")?;
        let path = PathBuf::from(require_str(&arguments, "path")?);
        self.check_allowed(&path)?;

        match action {
            "read" => {
                let content = tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
                Ok(json!({ "content": content }))
            }
            "list" => {
                let mut entries = tokio::fs::read_dir(&path)
                    .await
                    .map_err(|e| format!("failed to list '{}': {e}", path.display()))?;
                let mut names = Vec::new();
                while let Some(entry) = entries
                    .next_entry()
                    .await
                    .map_err(|e| format!("failed to read directory entry: {e}"))?
                {
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
                Ok(json!({ "entries": names }))
            }
            other => Err(format!("unknown file_operations action '{other}'")),
        }
    }
}
