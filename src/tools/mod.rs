//! Tool registry, executor, and built-in tool bodies.
//!
//! A [`Tool`] is a named capability with a JSON-schema parameter contract
//! the model may invoke mid-generation. The [`registry`] module tracks
//! which tools exist and are enabled; the [`executor`] module validates and
//! invokes them with bounded concurrency and a per-call timeout.

#[cfg(feature = "builtin-tools")]
pub mod builtin;
pub mod executor;
pub mod registry;

pub use executor::ToolExecutor;
pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Default number of tool executions allowed in flight concurrently.
pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

/// Default per-call execution deadline.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// A tool's advertised shape: what the model is told about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, unique within its registry.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON-schema-shaped object: `{type, properties, required}`.
    pub parameters: Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier assigned by the generation backend.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Argument map, validated against the tool's `parameters` schema
    /// before execution.
    pub arguments: HashMap<String, Value>,
}

/// The outcome of executing one [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedToolCall {
    /// The call this is the result of.
    pub call: ToolCall,
    /// Result payload on success.
    pub result: Option<Value>,
    /// Human-readable failure description on failure.
    pub error: Option<String>,
    /// Whether the tool body ran to completion and reported success.
    pub success: bool,
    /// Wall-clock time the call took, including any queuing for a
    /// concurrency permit.
    pub elapsed: Duration,
}

/// A registered capability the model may invoke.
///
/// `validate` runs before `execute`; a validation failure is reported as
/// `success=false` without the body ever running. Domain failures inside
/// `execute` are returned as `Err(String)` and are likewise conveyed
/// in-band as `success=false` — this trait never uses [`crate::Error`] for
/// per-call failures, only the executor's own infrastructure errors do.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, unique within its registry.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON-schema-shaped parameters object.
    fn parameters(&self) -> Value;

    /// Checks `arguments` against this tool's preconditions before it runs.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the violation.
    fn validate(&self, arguments: &HashMap<String, Value>) -> Result<(), String>;

    /// Runs the tool body.
    ///
    /// # Errors
    ///
    /// Returns a human-readable domain error; this is conveyed to the
    /// caller as `success=false`, never as a hard failure of the executor.
    async fn execute(&self, arguments: HashMap<String, Value>) -> Result<Value, String>;

    /// Returns this tool's advertised definition.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Reads a required string argument, or a validation error message.
pub(crate) fn require_str<'a>(args: &'a HashMap<String, Value>, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing or non-string argument '{key}'"))
}

/// Reads an optional string argument.
pub(crate) fn optional_str<'a>(args: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// Reads an optional u64 argument.
pub(crate) fn optional_u64(args: &HashMap<String, Value>, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}
