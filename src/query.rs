//! Query Orchestrator (C14): wires hybrid retrieval, prompt composition,
//! generation, think-tag filtering, and the tool-calling coordinator
//! (C12) into a single entry point for one user query.

use crate::agent::{CoordinatorOutcome, ToolCallingCoordinator};
use crate::core::Chunk;
use crate::error::{Error, Result};
use crate::generation::{GenerateOptions, Generator, thinking};
use crate::search::HybridRetriever;
use crate::tools::{ExecutedToolCall, ToolDefinition, ToolExecutor, ToolRegistry};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Canned answer returned when hybrid retrieval finds nothing and tools are
/// not in play; the generator is never invoked on this path.
const NO_RESULTS_ANSWER: &str = "很抱歉，没有找到与该问题相关的信息。";

/// A single query against the index.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    /// The user's question.
    pub query: String,
    /// Metadata filters narrowing vector search (keyword search is
    /// unfiltered).
    pub filters: HashMap<String, String>,
    /// Tool names permitted for this query. `None` means every enabled
    /// tool is permitted.
    pub allowed_tools: Option<Vec<String>>,
    /// Upper bound on tool executions across the whole tool-calling loop.
    pub max_tool_calls: usize,
    /// Whether `<think>` content should be included in the answer.
    pub show_thinking: bool,
}

/// Result of a query call.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// The answer text shown to the user.
    pub answer: String,
    /// Chunks retrieval surfaced, in fused rank order.
    pub sources: Vec<Chunk>,
    /// Wall-clock time from entry to return.
    pub elapsed: Duration,
    /// Tool calls executed while answering, empty on the no-tools path.
    pub executed_calls: Vec<ExecutedToolCall>,
}

/// Drives one query through retrieval, generation, and (optionally) the
/// tool-calling loop.
pub struct QueryOrchestrator {
    retriever: Arc<HybridRetriever>,
    generator: Arc<dyn Generator>,
    tool_registry: Arc<ToolRegistry>,
    coordinator: ToolCallingCoordinator,
    tools_enabled: bool,
    top_k: usize,
}

impl QueryOrchestrator {
    /// Creates an orchestrator over the given retriever, generator, and
    /// tool backends. `tools_enabled` is the global toggle; a request's
    /// `allowed_tools` further narrows which enabled tools participate.
    #[must_use]
    pub fn new(
        retriever: Arc<HybridRetriever>,
        generator: Arc<dyn Generator>,
        tool_registry: Arc<ToolRegistry>,
        tool_executor: Arc<ToolExecutor>,
        tools_enabled: bool,
        top_k: usize,
    ) -> Self {
        let coordinator = ToolCallingCoordinator::new(Arc::clone(&generator), tool_executor);
        Self {
            retriever,
            generator,
            tool_registry,
            coordinator,
            tools_enabled,
            top_k,
        }
    }

    /// Answers `request`, non-streaming.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty query. Otherwise propagates
    /// retrieval or generation errors; tool failures never surface here,
    /// they are recorded in [`QueryResponse::executed_calls`].
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let start = Instant::now();
        Self::validate(request)?;

        let chunks = self
            .retriever
            .search(&request.query, self.top_k, &request.filters)
            .await?;

        let tools = self.active_tools(request.allowed_tools.as_deref());

        if tools.is_empty() {
            if chunks.is_empty() {
                return Ok(Self::no_results_response(start));
            }

            let prompt = Self::compose_prompt(&chunks, &request.query);
            let raw = self.generator.generate(&prompt, &GenerateOptions::default()).await?;
            let answer = thinking::clean_with(&raw, request.show_thinking);

            return Ok(QueryResponse {
                answer,
                sources: chunks,
                elapsed: start.elapsed(),
                executed_calls: Vec::new(),
            });
        }

        let prompt = Self::compose_prompt(&chunks, &request.query);
        let CoordinatorOutcome { answer, executed_calls } = self
            .coordinator
            .run(
                &prompt,
                &tools,
                &GenerateOptions::default(),
                request.max_tool_calls,
                request.show_thinking,
            )
            .await?;

        Ok(QueryResponse {
            answer,
            sources: chunks,
            elapsed: start.elapsed(),
            executed_calls,
        })
    }

    /// Streaming twin of [`QueryOrchestrator::query`].
    ///
    /// `on_chunk` receives answer text as it becomes available, already
    /// filtered for think tags per `request.show_thinking`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`QueryOrchestrator::query`].
    pub async fn stream_query(
        &self,
        request: &QueryRequest,
        on_chunk: &mut (dyn FnMut(String) + Send),
    ) -> Result<QueryResponse> {
        let start = Instant::now();
        Self::validate(request)?;

        let chunks = self
            .retriever
            .search(&request.query, self.top_k, &request.filters)
            .await?;

        let tools = self.active_tools(request.allowed_tools.as_deref());

        if tools.is_empty() {
            if chunks.is_empty() {
                let response = Self::no_results_response(start);
                on_chunk(response.answer.clone());
                return Ok(response);
            }

            let prompt = Self::compose_prompt(&chunks, &request.query);
            let mut collected = String::new();
            {
                let mut sink = thinking::wrap(request.show_thinking, |visible: String| {
                    collected.push_str(&visible);
                    on_chunk(visible);
                });
                self.generator
                    .stream(&prompt, &GenerateOptions::default(), &mut sink)
                    .await?;
            }

            return Ok(QueryResponse {
                answer: collected,
                sources: chunks,
                elapsed: start.elapsed(),
                executed_calls: Vec::new(),
            });
        }

        let prompt = Self::compose_prompt(&chunks, &request.query);
        let CoordinatorOutcome { answer, executed_calls } = self
            .coordinator
            .stream_run(
                &prompt,
                &tools,
                &GenerateOptions::default(),
                request.max_tool_calls,
                request.show_thinking,
                on_chunk,
            )
            .await?;

        Ok(QueryResponse {
            answer,
            sources: chunks,
            elapsed: start.elapsed(),
            executed_calls,
        })
    }

    fn validate(request: &QueryRequest) -> Result<()> {
        if request.query.trim().is_empty() {
            return Err(Error::invalid_input("empty query"));
        }
        Ok(())
    }

    fn active_tools(&self, allowed: Option<&[String]>) -> Vec<ToolDefinition> {
        if self.tools_enabled {
            self.tool_registry.definitions(allowed)
        } else {
            Vec::new()
        }
    }

    fn no_results_response(start: Instant) -> QueryResponse {
        QueryResponse {
            answer: NO_RESULTS_ANSWER.to_string(),
            sources: Vec::new(),
            elapsed: start.elapsed(),
            executed_calls: Vec::new(),
        }
    }

    /// Builds the bilingual context+question prompt handed to the
    /// generator: an English "Context/Question" frame with a Chinese
    /// instruction line, matching the source system's presentation.
    fn compose_prompt(chunks: &[Chunk], query: &str) -> String {
        let context = chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Context:\n{context}\n\nQuestion: {query}\n\n\
             请根据上方提供的上下文回答问题；如果上下文没有足够的信息，请明确说明。"
        )
    }
}
