//! `datetime` built-in tool: current time, formatting, and duration diffs.
//!
//! No external I/O; all three actions are pure calendar math over
//! `chrono`.

use crate::tools::{Tool, optional_str, require_str};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;

/// Returns the current time, formats a timestamp, or diffs two timestamps.
#[derive(Debug, Default)]
pub struct DatetimeTool;

#[derive(Debug, Deserialize)]
struct Args {
    action: String,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    other: Option<String>,
    #[serde(default)]
    format: Option<String>,
}

fn parse_args(arguments: &HashMap<String, Value>) -> Result<Args, String> {
    let action = require_str(arguments, "action")?.to_string();
    Ok(Args {
        action,
        timestamp: optional_str(arguments, "timestamp").map(str::to_string),
        other: optional_str(arguments, "other").map(str::to_string),
        format: optional_str(arguments, "format").map(str::to_string),
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp '{value}': {e}"))
}

#[async_trait]
impl Tool for DatetimeTool {
    fn name(&self) -> &str {
        "datetime"
    }

    fn description(&self) -> &str {
        "Current time, timestamp formatting, or the duration between two timestamps."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["now", "format", "diff"],
                    "description": "Which operation to perform."
                },
                "timestamp": {
                    "type": "string",
                    "description": "RFC 3339 timestamp, required for 'format' and 'diff'."
                },
                "other": {
                    "type": "string",
                    "description": "Second RFC 3339 timestamp, required for 'diff'."
                },
                "format": {
                    "type": "string",
                    "description": "strftime-style format string for 'format' (default RFC 3339)."
                }
            },
            "required": ["action"],
            "additionalProperties": false
        })
    }

    fn validate(&self, arguments: &HashMap<String, Value>) -> Result<(), String> {
        let args = parse_args(arguments)?;
        match args.action.as_str() {
            "now" => Ok(()),
            "format" => {
                if args.timestamp.is_none() {
                    return Err("'format' requires a 'timestamp' argument".to_string());
                }
                Ok(())
            }
            "diff" => {
                if args.timestamp.is_none() || args.other.is_none() {
                    return Err("'diff' requires 'timestamp' and 'other' arguments".to_string());
                }
                Ok(())
            }
            other => Err(format!("unknown datetime action '{other}'")),
        }
    }

    async fn execute(&self, arguments: HashMap<String, Value>) -> Result<Value, String> {
        let args = parse_args(&arguments)?;
        match args.action.as_str() {
            "now" => Ok(json!({ "now": Utc::now().to_rfc3339() })),
            "format" => {
                let timestamp = args.timestamp.as_deref().unwrap_or_default();
                let dt = parse_timestamp(timestamp)?;
                let formatted = args
                    .format
                    .as_deref()
                    .map_or_else(|| dt.to_rfc3339(), |fmt| dt.format(fmt).to_string());
                Ok(json!({ "formatted": formatted }))
            }
            "diff" => {
                let a = parse_timestamp(args.timestamp.as_deref().unwrap_or_default())?;
                let b = parse_timestamp(args.other.as_deref().unwrap_or_default())?;
                let seconds = (b - a).num_seconds();
                Ok(json!({ "diff_seconds": seconds }))
            }
            other => Err(format!("unknown datetime action '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
            .collect()
    }

    #[tokio::test]
    async fn now_returns_a_timestamp() {
        let tool = DatetimeTool;
        let result = tool.execute(args(&[("action", "now")])).await.unwrap();
        assert!(result["now"].is_string());
    }

    #[tokio::test]
    async fn format_rejects_missing_timestamp() {
        let tool = DatetimeTool;
        assert!(tool.validate(&args(&[("action", "format")])).is_err());
    }

    #[tokio::test]
    async fn diff_computes_seconds_between_two_timestamps() {
        let tool = DatetimeTool;
        let result = tool
            .execute(args(&[
                ("action", "diff"),
                ("timestamp", "2024-01-01T00:00:00Z"),
                ("other", "2024-01-01T00:01:00Z"),
            ]))
            .await
            .unwrap();
        assert_eq!(result["diff_seconds"], 60);
    }

    #[tokio::test]
    async fn unknown_action_is_rejected_at_validation() {
        let tool = DatetimeTool;
        assert!(tool.validate(&args(&[("action", "explode")])).is_err());
    }

    #[tokio::test]
    async fn invalid_timestamp_is_a_domain_error() {
        let tool = DatetimeTool;
        let result = tool
            .execute(args(&[("action", "format"), ("timestamp", "not-a-date")]))
            .await;
        assert!(result.is_err());
    }
}
