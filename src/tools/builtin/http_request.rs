//! `http_request` built-in tool: a bounded HTTP call constrained to an
//! allowed-host list.

use crate::tools::{Tool, optional_str, require_str};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use reqwest::Url;

/// Performs HTTP requests restricted to a fixed set of allowed hostnames.
///
/// Out of scope per the crate's boundaries beyond its contract with the
/// executor: this is a minimal, clearly-labeled reference body, not a
/// general-purpose HTTP client.
pub struct HttpRequestTool {
    client: reqwest::Client,
    allowed_hosts: Vec<String>,
}

impl HttpRequestTool {
    /// Creates the tool restricted to the given allowed hostnames.
    #[must_use]
    pub fn new(allowed_hosts: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            allowed_hosts,
        }
    }

    fn check_host(&self, url: &Url) -> Result<(), String> {
        let host = url.host_str().ok_or_else(|| "URL has no host".to_string())?;
        if self.allowed_hosts.iter().any(|h| h == host) {
            Ok(())
        } else {
            Err(format!("host '{host}' is not in the allowed host list"))
        }
    }
}

#[async_trait]
impl Tool for HttpRequestTool {
    fn name(&self) -> &str {
        "http_request"
    }

    fn description(&self) -> &str {
        "Performs an HTTP request against an allow-listed host."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "method": {
                    "type": "string",
                    "enum": ["GET", "POST"],
                    "description": "HTTP method. Defaults to GET."
                },
                "url": {
                    "type": "string",
                    "description": "Target URL; host must be allow-listed."
                },
                "body": {
                    "type": "string",
                    "description": "Request body for POST requests."
                }
            },
            "required": ["url"],
            "additionalProperties": false
        })
    }

    fn validate(&self, arguments: &HashMap<String, Value>) -> Result<(), String> {
        let url_str = require_str(arguments, "url")?;
        let url = Url::parse(url_str).map_err(|e| format!("invalid URL '{url_str}': {e}"))?;
        self.check_host(&url)
    }

    async fn execute(&self, arguments: HashMap<String, Value>) -> Result<Value, String> {
        let url_str = require_str(&arguments, "url")?;
        let url = Url::parse(url_str).map_err(|e| format!("invalid URL '{url_str}': {e}"))?;
        self.check_host(&url)?;

        let method = optional_str(&arguments, "method").unwrap_or("GET");
        let body = optional_str(&arguments, "body").map(str::to_string);

        let mut request = match method {
            "GET" => self.client.get(url),
            "POST" => self.client.post(url),
            other => return Err(format!("unsupported HTTP method '{other}'")),
        };
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| format!("request failed: {e}"))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| format!("failed to read body: {e}"))?;

        Ok(json!({ "status": status, "body": text }))
    }
}
