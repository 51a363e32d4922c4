//! `RagEngine`: the library façade a CLI or server embeds.
//!
//! Wires every component (C1–C14) together behind the operations named in
//! the crate's external interface: ingest, query (with or without tools,
//! streaming or not), and admin operations over the document store.

use crate::agent::ToolCallingCoordinator;
use crate::config::RagConfig;
use crate::core::Document;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::generation::Generator;
use crate::ingest::{IngestRequest, IngestResponse, IngestionOrchestrator, MetadataExtractor};
use crate::query::{QueryOrchestrator, QueryRequest, QueryResponse};
use crate::search::HybridRetriever;
use crate::storage::{DocumentStore, KeywordStore, SqliteStore, StorageStats, VectorStore};
use crate::tools::builtin::{
    DatetimeTool, FileOperationsTool, HttpRequestTool, RagSearchTool, SqlQueryTool, WebSearchTool,
};
use crate::tools::{ToolExecutor, ToolRegistry};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Health of the engine's two external-model collaborators, plus a
/// storage snapshot.
#[derive(Debug, Clone)]
pub struct EngineStatus {
    /// `true` if a trivial embed call succeeded.
    pub embedder_healthy: bool,
    /// `true` if a trivial generation call succeeded.
    pub generator_healthy: bool,
    /// Document/chunk counts and schema version.
    pub storage: StorageStats,
}

/// The engine's single entry point: one store, one embedder, one
/// generator, and the orchestrators built over them.
pub struct RagEngine {
    store: Arc<SqliteStore>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    tool_registry: Arc<ToolRegistry>,
    ingest: IngestionOrchestrator,
    query: QueryOrchestrator,
}

impl RagEngine {
    /// Builds an engine backed by a `SQLite` database at `path`, wiring
    /// every built-in tool the config enables.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or initialized.
    pub fn open(
        path: impl AsRef<Path>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        config: RagConfig,
    ) -> Result<Self> {
        let store = Arc::new(SqliteStore::open(path)?);
        store.init()?;
        Ok(Self::build(store, embedder, generator, config))
    }

    /// Builds an engine over an in-memory store. Useful for tests and
    /// ephemeral sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be initialized.
    pub fn in_memory(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        config: RagConfig,
    ) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        store.init()?;
        Ok(Self::build(store, embedder, generator, config))
    }

    fn build(
        store: Arc<SqliteStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        config: RagConfig,
    ) -> Self {
        let retriever = Arc::new(HybridRetriever::new(
            Arc::clone(&store) as Arc<dyn VectorStore>,
            Arc::clone(&store) as Arc<dyn KeywordStore>,
            Arc::clone(&embedder),
        ));

        let tool_registry = Arc::new(Self::build_tool_registry(&config, &retriever));
        let tool_executor = Arc::new(ToolExecutor::with_limits(
            Arc::clone(&tool_registry),
            config.tools.max_concurrent_calls,
            config.tools.call_timeout,
        ));

        let metadata_extractor = config
            .ingest
            .metadata_extraction
            .enable
            .then(|| Arc::new(MetadataExtractor::new(Arc::clone(&generator))));

        let ingest = IngestionOrchestrator::new(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Arc::clone(&store) as Arc<dyn VectorStore>,
            Arc::clone(&embedder),
            Arc::new(crate::chunking::default_chunker()),
            metadata_extractor,
            config.chunking.chunk_size,
            config.chunking.overlap,
        );

        let query = QueryOrchestrator::new(
            Arc::clone(&retriever),
            Arc::clone(&generator),
            Arc::clone(&tool_registry),
            tool_executor,
            config.tools.enabled,
            config.retrieval.top_k,
        );

        Self {
            store,
            embedder,
            generator,
            tool_registry,
            ingest,
            query,
        }
    }

    fn build_tool_registry(config: &RagConfig, retriever: &Arc<HybridRetriever>) -> ToolRegistry {
        let builtin = &config.tools.builtin;
        let mut registry = ToolRegistry::new();

        registry.register(Arc::new(DatetimeTool), builtin.datetime_enabled);
        registry.register(Arc::new(RagSearchTool::new(Arc::clone(retriever))), builtin.rag_search_enabled);
        registry.register(
            Arc::new(FileOperationsTool::new(builtin.file_operations_allowed_paths.clone())),
            builtin.file_operations_enabled,
        );
        registry.register(
            Arc::new(HttpRequestTool::new(builtin.http_request_allowed_hosts.clone())),
            builtin.http_request_enabled,
        );
        registry.register(
            Arc::new(SqlQueryTool::new(builtin.sql_query_allowed_databases.clone())),
            builtin.sql_query_enabled,
        );
        registry.register(
            Arc::new(WebSearchTool::new(builtin.web_search_endpoint.clone())),
            builtin.web_search_enabled,
        );

        registry
    }

    /// Ingests a local file.
    ///
    /// # Errors
    ///
    /// See [`IngestionOrchestrator::ingest`].
    pub async fn ingest_file(&self, path: impl Into<String>) -> Result<IngestResponse> {
        self.ingest
            .ingest(&IngestRequest {
                file_path: Some(path.into()),
                ..Default::default()
            })
            .await
    }

    /// Ingests inline text, tagging it with `source_tag` under the
    /// `source` metadata key.
    ///
    /// # Errors
    ///
    /// See [`IngestionOrchestrator::ingest`].
    pub async fn ingest_text(&self, text: impl Into<String>, source_tag: impl Into<String>) -> Result<IngestResponse> {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), source_tag.into());
        self.ingest
            .ingest(&IngestRequest {
                content: Some(text.into()),
                metadata,
                ..Default::default()
            })
            .await
    }

    /// Single-shot query, no tools, no metadata filters.
    ///
    /// # Errors
    ///
    /// See [`QueryOrchestrator::query`].
    pub async fn query(&self, query: impl Into<String>) -> Result<QueryResponse> {
        self.query
            .query(&QueryRequest {
                query: query.into(),
                ..Default::default()
            })
            .await
    }

    /// Single-shot query restricted to chunks matching `filters`.
    ///
    /// # Errors
    ///
    /// See [`QueryOrchestrator::query`].
    pub async fn query_with_filters(
        &self,
        query: impl Into<String>,
        filters: HashMap<String, String>,
    ) -> Result<QueryResponse> {
        self.query
            .query(&QueryRequest {
                query: query.into(),
                filters,
                ..Default::default()
            })
            .await
    }

    /// Query with the tool-calling loop engaged.
    ///
    /// # Errors
    ///
    /// See [`QueryOrchestrator::query`].
    pub async fn query_with_tools(
        &self,
        query: impl Into<String>,
        allowed: Vec<String>,
        max_tool_calls: usize,
    ) -> Result<QueryResponse> {
        self.query
            .query(&QueryRequest {
                query: query.into(),
                allowed_tools: Some(allowed),
                max_tool_calls,
                ..Default::default()
            })
            .await
    }

    /// Streaming twin of [`RagEngine::query`].
    ///
    /// # Errors
    ///
    /// See [`QueryOrchestrator::stream_query`].
    pub async fn stream_query(
        &self,
        query: impl Into<String>,
        on_chunk: &mut (dyn FnMut(String) + Send),
    ) -> Result<QueryResponse> {
        self.query
            .stream_query(
                &QueryRequest {
                    query: query.into(),
                    ..Default::default()
                },
                on_chunk,
            )
            .await
    }

    /// Streaming twin of [`RagEngine::query_with_filters`].
    ///
    /// # Errors
    ///
    /// See [`QueryOrchestrator::stream_query`].
    pub async fn stream_query_with_filters(
        &self,
        query: impl Into<String>,
        filters: HashMap<String, String>,
        on_chunk: &mut (dyn FnMut(String) + Send),
    ) -> Result<QueryResponse> {
        self.query
            .stream_query(
                &QueryRequest {
                    query: query.into(),
                    filters,
                    ..Default::default()
                },
                on_chunk,
            )
            .await
    }

    /// Lists every stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        self.store.list_documents()
    }

    /// Deletes a document and, by cascade, every chunk it owns from both
    /// indices.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    pub fn delete_document(&self, id: &str) -> Result<()> {
        DocumentStore::delete_document(self.store.as_ref(), id)
    }

    /// Empties the document store, vector index, and keyword index.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three resets fails.
    pub fn reset(&self) -> Result<()> {
        DocumentStore::reset(self.store.as_ref())?;
        VectorStore::reset(self.store.as_ref())?;
        KeywordStore::reset(self.store.as_ref())?;
        Ok(())
    }

    /// Probes the embedder and generator with trivial calls and reports
    /// storage statistics alongside the result.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage stats query itself fails;
    /// backend health is reported in the returned struct, not as an `Err`.
    pub async fn check_status(&self) -> Result<EngineStatus> {
        let embedder_healthy = self.embedder.embed("status check").await.is_ok();
        let generator_healthy = self
            .generator
            .generate("status check", &crate::generation::GenerateOptions::default())
            .await
            .is_ok();
        let storage = self.store.stats()?;

        Ok(EngineStatus {
            embedder_healthy,
            generator_healthy,
            storage,
        })
    }

    /// Releases the engine's resources.
    ///
    /// `SqliteStore` closes its connection on drop; this method exists so
    /// callers have an explicit release point to call per the documented
    /// interface, without this crate inventing a bespoke close protocol.
    pub fn close(self) {
        drop(self);
    }

    /// Returns the tool-calling coordinator's registry, for admin tooling
    /// that wants to inspect or adjust which tools are enabled at runtime.
    #[must_use]
    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{DEFAULT_DIMENSIONS, FallbackEmbedder};
    use crate::generation::StubGenerator;

    fn engine() -> RagEngine {
        RagEngine::in_memory(
            Arc::new(FallbackEmbedder::new(DEFAULT_DIMENSIONS)),
            Arc::new(StubGenerator::new("a helpful answer")),
            RagConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ingest_then_query_returns_a_source_and_an_answer() {
        let engine = engine();
        let response = engine
            .ingest_text("Hello world. Second sentence.", "unit-test")
            .await
            .unwrap();
        assert!(response.success);

        let result = engine.query("Hello").await.unwrap();
        assert!(!result.sources.is_empty());
        assert!(!result.answer.is_empty());
    }

    #[tokio::test]
    async fn list_and_delete_document_round_trip() {
        let engine = engine();
        let response = engine.ingest_text("content here", "unit-test").await.unwrap();
        assert_eq!(engine.list_documents().unwrap().len(), 1);

        engine.delete_document(&response.document_id).unwrap();
        assert!(engine.list_documents().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_empties_the_store() {
        let engine = engine();
        engine.ingest_text("content here", "unit-test").await.unwrap();
        engine.reset().unwrap();
        assert!(engine.list_documents().unwrap().is_empty());
    }

    #[tokio::test]
    async fn check_status_reports_healthy_backends() {
        let engine = engine();
        let status = engine.check_status().await.unwrap();
        assert!(status.embedder_healthy);
        assert!(status.generator_healthy);
    }
}
