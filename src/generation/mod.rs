//! Generation backends and the thinking-tag filter.
//!
//! [`Generator`] is the collaborator contract the query orchestrator and the
//! tool-calling coordinator drive; this crate does not ship a real LLM
//! backend (that is an external collaborator per the crate's scope), only
//! the trait and a [`StubGenerator`] useful for tests and as a default when
//! no backend is configured.

pub mod thinking;

pub use thinking::ThinkFilter;

use crate::error::Result;
use crate::tools::{ToolCall, ToolDefinition};
use async_trait::async_trait;
use std::pin::Pin;

use futures_util::Stream;

/// Per-call generation parameters.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens the backend may emit.
    pub max_tokens: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// Outcome of a tool-aware generation call.
///
/// Named explicitly as the return type of [`Generator::generate_with_tools`];
/// the tool-calling coordinator inspects `tool_calls` and `finished` to
/// decide whether to keep driving rounds.
#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    /// The model's text content for this turn (may be empty when the model
    /// emits only tool calls).
    pub content: String,
    /// Tool calls the model requested this turn, in emission order.
    pub tool_calls: Vec<ToolCall>,
    /// `true` when the model signals it has no more tool calls to make and
    /// this is its final answer.
    pub finished: bool,
}

/// A stream of text chunks from a streaming generation call.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Collaborator contract for language-model generation backends.
///
/// Implementations must be thread-safe since the engine holds one generator
/// behind an `Arc` shared across concurrent query work.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates a single-turn completion for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GenerationFailed`] if the backend fails or
    /// returns an empty response.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String>;

    /// Generates a completion, invoking `on_chunk` with each piece of text
    /// as it arrives.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GenerationFailed`] if the stream fails before
    /// completion.
    async fn stream(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        on_chunk: &mut (dyn FnMut(String) + Send),
    ) -> Result<()>;

    /// Generates a completion in a context where the model may emit tool
    /// calls instead of (or alongside) final text.
    ///
    /// The default implementation delegates to [`Generator::generate`] and
    /// reports the result as finished with no tool calls, which is correct
    /// for any backend that does not support tool calling.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GenerationFailed`] if the backend fails.
    async fn generate_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
        options: &GenerateOptions,
    ) -> Result<GenerationResult> {
        let _ = tools;
        let content = self.generate(prompt, options).await?;
        Ok(GenerationResult {
            content,
            tool_calls: Vec::new(),
            finished: true,
        })
    }

    /// Streaming twin of [`Generator::generate_with_tools`].
    ///
    /// `on_chunk` receives text content as it streams; the final result
    /// (including any tool calls) is returned once the turn completes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GenerationFailed`] if the backend fails.
    async fn stream_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolDefinition],
        options: &GenerateOptions,
        on_chunk: &mut (dyn FnMut(String) + Send),
    ) -> Result<GenerationResult> {
        let content = self.generate(prompt, options).await?;
        on_chunk(content.clone());
        let _ = tools;
        Ok(GenerationResult {
            content,
            tool_calls: Vec::new(),
            finished: true,
        })
    }
}

/// A deterministic generator useful for tests and as a placeholder default.
///
/// Echoes a fixed response (or the prompt itself) with no network calls.
/// Not suitable for production use; a real backend is an external
/// collaborator this crate only depends on through [`Generator`].
#[derive(Debug, Clone)]
pub struct StubGenerator {
    response: String,
}

impl StubGenerator {
    /// Creates a stub that always returns `response`.
    #[must_use]
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }

    /// Creates a stub that echoes the prompt it was given, prefixed.
    #[must_use]
    pub fn echo() -> Self {
        Self::new(String::new())
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, prompt: &str, _options: &GenerateOptions) -> Result<String> {
        if self.response.is_empty() {
            Ok(format!("echo: {prompt}"))
        } else {
            Ok(self.response.clone())
        }
    }

    async fn stream(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        on_chunk: &mut (dyn FnMut(String) + Send),
    ) -> Result<()> {
        let text = self.generate(prompt, options).await?;
        on_chunk(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_generator_echoes_prompt() {
        let gen = StubGenerator::echo();
        let out = gen.generate("hello", &GenerateOptions::default()).await.unwrap();
        assert_eq!(out, "echo: hello");
    }

    #[tokio::test]
    async fn stub_generator_fixed_response() {
        let gen = StubGenerator::new("fixed answer");
        let out = gen.generate("anything", &GenerateOptions::default()).await.unwrap();
        assert_eq!(out, "fixed answer");
    }

    #[tokio::test]
    async fn default_generate_with_tools_reports_finished_no_calls() {
        let gen = StubGenerator::new("answer");
        let result = gen
            .generate_with_tools("prompt", &[], &GenerateOptions::default())
            .await
            .unwrap();
        assert!(result.finished);
        assert!(result.tool_calls.is_empty());
        assert_eq!(result.content, "answer");
    }

    #[tokio::test]
    async fn stream_invokes_callback_with_full_text() {
        let gen = StubGenerator::new("streamed");
        let mut collected = String::new();
        let mut on_chunk = |chunk: String| collected.push_str(&chunk);
        gen.stream("prompt", &GenerateOptions::default(), &mut on_chunk)
            .await
            .unwrap();
        assert_eq!(collected, "streamed");
    }

    #[test]
    fn generate_options_default_matches_documented_values() {
        let opts = GenerateOptions::default();
        assert!((opts.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 500);
    }
}
