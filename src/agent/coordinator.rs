//! Tool-calling coordinator.
//!
//! Drives the generate → execute-tools → feedback round trip for one user
//! query: repeatedly calls [`Generator::generate_with_tools`], executes any
//! requested tool calls through the [`ToolExecutor`], and folds their
//! results back into the prompt until the model stops requesting tools, the
//! model signals it is finished, or the tool-call budget is exhausted.

use crate::error::Result;
use crate::generation::{GenerateOptions, Generator, GenerationResult};
use crate::generation::thinking;
use crate::tools::{ExecutedToolCall, ToolCall, ToolDefinition, ToolExecutor};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// What one coordinated query produced.
#[derive(Debug, Clone)]
pub struct CoordinatorOutcome {
    /// The user-visible answer: all non-tool content segments the model
    /// returned, in turn order, filtered for think tags.
    pub answer: String,
    /// Every tool call the coordinator actually ran, across all rounds.
    pub executed_calls: Vec<ExecutedToolCall>,
}

/// Drives the LLM↔tools dialogue for one user query.
pub struct ToolCallingCoordinator {
    generator: Arc<dyn Generator>,
    executor: Arc<ToolExecutor>,
}

impl ToolCallingCoordinator {
    /// Creates a coordinator over a generator and the executor it should
    /// dispatch tool calls to.
    #[must_use]
    pub const fn new(generator: Arc<dyn Generator>, executor: Arc<ToolExecutor>) -> Self {
        Self { generator, executor }
    }

    /// Runs the coordinator to completion for a single query, non-streaming.
    ///
    /// `max_tool_calls` bounds the total number of tool calls executed
    /// across every round; once reached, the coordinator does not execute
    /// further calls but still returns whatever answer text has
    /// accumulated.
    ///
    /// # Errors
    ///
    /// Propagates any error the generator raises. Tool failures never
    /// surface here; they are recorded in [`CoordinatorOutcome::executed_calls`].
    pub async fn run(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
        options: &GenerateOptions,
        max_tool_calls: usize,
        show_thinking: bool,
    ) -> Result<CoordinatorOutcome> {
        let mut conversation = prompt.to_string();
        let mut answer_segments = Vec::new();
        let mut executed_calls = Vec::new();
        let mut executed_total = 0usize;
        let mut round = 0usize;

        loop {
            let result: GenerationResult = self
                .generator
                .generate_with_tools(&conversation, tools, options)
                .await?;

            if !result.content.is_empty() {
                answer_segments.push(result.content.clone());
            }

            if result.tool_calls.is_empty() || result.finished || executed_total >= max_tool_calls {
                debug!(round, executed_total, "tool-calling coordinator terminating");
                break;
            }

            let remaining = max_tool_calls - executed_total;
            let calls: Vec<ToolCall> = result.tool_calls.into_iter().take(remaining).collect();
            executed_total += calls.len();

            debug!(round, calls = calls.len(), "executing tool calls");
            let round_results = self.executor.execute_many(calls).await;
            conversation.push_str(&render_tool_results(&round_results));
            executed_calls.extend(round_results);

            round += 1;
        }

        let raw = answer_segments.join("");
        let answer = thinking::clean_with(&raw, show_thinking);

        Ok(CoordinatorOutcome { answer, executed_calls })
    }

    /// Streaming twin of [`ToolCallingCoordinator::run`].
    ///
    /// `on_chunk` receives model text as it streams, filtered for think
    /// tags. When `show_thinking` is true, a synthetic line is emitted
    /// after each tool completes: `\n[Tool: <name> - Success|Failed]\n`.
    ///
    /// # Errors
    ///
    /// Propagates any error the generator raises mid-stream.
    pub async fn stream_run(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
        options: &GenerateOptions,
        max_tool_calls: usize,
        show_thinking: bool,
        on_chunk: &mut (dyn FnMut(String) + Send),
    ) -> Result<CoordinatorOutcome> {
        let mut conversation = prompt.to_string();
        let mut answer_segments = Vec::new();
        let mut executed_calls = Vec::new();
        let mut executed_total = 0usize;

        let mut filtered_sink = thinking::wrap(show_thinking, |visible: String| on_chunk(visible));

        loop {
            let result = self
                .generator
                .stream_with_tools(&conversation, tools, options, &mut filtered_sink)
                .await?;

            if !result.content.is_empty() {
                answer_segments.push(result.content.clone());
            }

            if result.tool_calls.is_empty() || result.finished || executed_total >= max_tool_calls {
                break;
            }

            let remaining = max_tool_calls - executed_total;
            let calls: Vec<ToolCall> = result.tool_calls.into_iter().take(remaining).collect();
            executed_total += calls.len();

            let round_results = self.executor.execute_many(calls).await;
            if show_thinking {
                for r in &round_results {
                    let label = if r.success { "Success" } else { "Failed" };
                    on_chunk(format!("\n[Tool: {} - {label}]\n", r.call.name));
                }
            }
            conversation.push_str(&render_tool_results(&round_results));
            executed_calls.extend(round_results);
        }

        let raw = answer_segments.join("");
        let answer = thinking::clean_with(&raw, show_thinking);

        Ok(CoordinatorOutcome { answer, executed_calls })
    }
}

/// Renders executed tool results as a synthetic prompt section the next
/// generation round can read.
fn render_tool_results(results: &[ExecutedToolCall]) -> String {
    let mut out = String::from("\n\n[Tool Results]\n");
    for r in results {
        if r.success {
            let data = r.result.clone().unwrap_or(Value::Null);
            out.push_str(&format!("- {} ({}): {data}\n", r.call.name, r.call.id));
        } else {
            let error = r.error.clone().unwrap_or_default();
            out.push_str(&format!("- {} ({}): ERROR: {error}\n", r.call.name, r.call.id));
        }
    }
    out
}
