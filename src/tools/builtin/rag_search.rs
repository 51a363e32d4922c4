//! `rag_search` built-in tool: lets the model re-enter hybrid retrieval
//! mid-conversation to pull more context.

use crate::search::HybridRetriever;
use crate::search::DEFAULT_TOP_K;
use crate::tools::{Tool, optional_u64, require_str};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

/// Re-enters the hybrid retriever with a query chosen by the model.
pub struct RagSearchTool {
    retriever: Arc<HybridRetriever>,
}

impl RagSearchTool {
    /// Creates the tool over a shared hybrid retriever.
    #[must_use]
    pub const fn new(retriever: Arc<HybridRetriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for RagSearchTool {
    fn name(&self) -> &str {
        "rag_search"
    }

    fn description(&self) -> &str {
        "Search the ingested document index for passages relevant to a query."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query text."
                },
                "top_k": {
                    "type": "integer",
                    "description": "Maximum number of chunks to return. Defaults to 10.",
                    "minimum": 1
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    fn validate(&self, arguments: &HashMap<String, Value>) -> Result<(), String> {
        require_str(arguments, "query")?;
        Ok(())
    }

    async fn execute(&self, arguments: HashMap<String, Value>) -> Result<Value, String> {
        let query = require_str(&arguments, "query")?;
        let top_k = optional_u64(&arguments, "top_k").map_or(DEFAULT_TOP_K, |v| v as usize);

        let chunks = self
            .retriever
            .search(query, top_k, &HashMap::new())
            .await
            .map_err(|e| e.to_string())?;

        let results: Vec<Value> = chunks
            .into_iter()
            .take(top_k)
            .map(|c| {
                json!({
                    "chunk_id": c.id,
                    "document_id": c.document_id,
                    "content": c.content,
                    "score": c.score,
                })
            })
            .collect();

        Ok(json!({ "results": results }))
    }
}
