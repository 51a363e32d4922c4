//! `web_search` built-in tool: a thin HTTP call to a search API.
//!
//! Like `http_request`, the search backend itself is out of scope beyond
//! its contract with the executor, so this is a minimal reference body
//! against a single configured endpoint rather than a general search
//! integration.

use crate::tools::{Tool, optional_u64, require_str};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;

const DEFAULT_MAX_RESULTS: u64 = 5;

/// Issues a query against a single configured web search endpoint.
pub struct WebSearchTool {
    client: reqwest::Client,
    endpoint: String,
}

impl WebSearchTool {
    /// Creates the tool against `endpoint`, a search API accepting a
    /// `?q=<query>&max_results=<n>` GET request and returning JSON.
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Searches the web for a query and returns a list of results."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query text."
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return. Defaults to 5.",
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
        let max_results = optional_u64(&arguments, "max_results").unwrap_or(DEFAULT_MAX_RESULTS);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("max_results", &max_results.to_string())])
            .send()
            .await
            .map_err(|e| format!("search request failed: {e}"))?;

        let body: Value = response.json().await.map_err(|e| format!("failed to parse search response: {e}"))?;
        Ok(body)
    }
}
