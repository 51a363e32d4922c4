//! Typed, programmatically-constructed configuration.
//!
//! Every knob enumerated here has a documented default and is set via
//! builder-style setters; parsing a config *file* is the orchestrating
//! CLI/server's job, not this crate's.

use std::path::PathBuf;
use std::time::Duration;

/// Chunking defaults applied when a request omits `chunk_size`/`overlap`.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Default chunk size in characters.
    pub chunk_size: usize,
    /// Default overlap in characters.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::chunking::DEFAULT_CHUNK_SIZE,
            overlap: crate::chunking::DEFAULT_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    /// Overrides the default chunk size.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Overrides the default overlap.
    #[must_use]
    pub const fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }
}

/// Retrieval defaults.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Default `top_k` when a query omits it.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: crate::search::DEFAULT_TOP_K,
        }
    }
}

impl RetrievalConfig {
    /// Overrides the default `top_k`.
    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Toggles for the metadata extractor (C8).
#[derive(Debug, Clone)]
pub struct MetadataExtractionConfig {
    /// Whether ingestion runs C8 at all.
    pub enable: bool,
    /// Name of the model the generator backend should use for extraction.
    /// Interpretation is backend-specific; this crate only threads it
    /// through.
    pub llm_model: String,
}

impl Default for MetadataExtractionConfig {
    fn default() -> Self {
        Self {
            enable: true,
            llm_model: "default".to_string(),
        }
    }
}

impl MetadataExtractionConfig {
    /// Disables metadata extraction.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enable: false,
            llm_model: String::new(),
        }
    }

    /// Sets the model name used for extraction calls.
    #[must_use]
    pub fn with_llm_model(mut self, llm_model: impl Into<String>) -> Self {
        self.llm_model = llm_model.into();
        self
    }
}

/// Ingestion-side configuration.
#[derive(Debug, Clone, Default)]
pub struct IngestConfig {
    /// Metadata extraction (C8) toggles.
    pub metadata_extraction: MetadataExtractionConfig,
}

/// How permissive the built-in tools' access-control knobs default to.
///
/// This is informational policy, not an enforcement mechanism on its own:
/// it only shapes the defaults `RagEngine` applies to the individual
/// `allowed_*` allow-lists below when the caller doesn't set them
/// explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityLevel {
    /// Filesystem, network, and SQL tools are disabled unless explicitly
    /// enabled with an explicit allow-list.
    Strict,
    /// Tools are enabled with empty allow-lists (deny-all until
    /// configured); the conservative default.
    #[default]
    Standard,
    /// Tools are enabled with no default allow-list restriction beyond
    /// what each tool's `validate` already enforces.
    Permissive,
}

/// Per-tool enablement and tool-specific knobs for the six built-in tools.
#[derive(Debug, Clone, Default)]
pub struct BuiltinToolsConfig {
    /// `datetime` tool toggle.
    pub datetime_enabled: bool,
    /// `file_operations` tool toggle and its path allow-list.
    pub file_operations_enabled: bool,
    /// Paths the `file_operations` tool may read within.
    pub file_operations_allowed_paths: Vec<PathBuf>,
    /// `http_request` tool toggle and its host allow-list.
    pub http_request_enabled: bool,
    /// Hosts the `http_request` tool may contact.
    pub http_request_allowed_hosts: Vec<String>,
    /// `rag_search` tool toggle.
    pub rag_search_enabled: bool,
    /// `sql_query` tool toggle and its database allow-list.
    pub sql_query_enabled: bool,
    /// Database identifiers the `sql_query` tool may query.
    pub sql_query_allowed_databases: Vec<String>,
    /// `web_search` tool toggle and its search endpoint.
    pub web_search_enabled: bool,
    /// Endpoint URL the `web_search` tool queries.
    pub web_search_endpoint: String,
}

impl BuiltinToolsConfig {
    /// Builds the per-tool config for a [`SecurityLevel`], leaving
    /// allow-lists and the search endpoint empty for the caller to fill in.
    #[must_use]
    pub fn for_security_level(level: SecurityLevel) -> Self {
        let enabled = level != SecurityLevel::Strict;
        Self {
            datetime_enabled: enabled,
            file_operations_enabled: enabled,
            rag_search_enabled: enabled,
            sql_query_enabled: enabled,
            http_request_enabled: enabled,
            web_search_enabled: enabled,
            ..Self::default()
        }
    }
}

/// Tool-calling executor policy.
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Whether the tool-calling loop (C12) is engaged at all.
    pub enabled: bool,
    /// Maximum tool executions in flight at once.
    pub max_concurrent_calls: usize,
    /// Per-call execution deadline.
    pub call_timeout: Duration,
    /// Default access-control posture for built-in tools.
    pub security_level: SecurityLevel,
    /// Tool names enabled by default when not overridden per-tool below.
    pub enabled_tools: Vec<String>,
    /// Per-tool enablement and knobs.
    pub builtin: BuiltinToolsConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        let security_level = SecurityLevel::default();
        Self {
            enabled: true,
            max_concurrent_calls: crate::tools::DEFAULT_MAX_CONCURRENCY,
            call_timeout: crate::tools::DEFAULT_CALL_TIMEOUT,
            security_level,
            enabled_tools: Vec::new(),
            builtin: BuiltinToolsConfig::for_security_level(security_level),
        }
    }
}

impl ToolsConfig {
    /// Disables the tool-calling loop entirely.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            max_concurrent_calls: crate::tools::DEFAULT_MAX_CONCURRENCY,
            call_timeout: crate::tools::DEFAULT_CALL_TIMEOUT,
            security_level: SecurityLevel::Strict,
            enabled_tools: Vec::new(),
            builtin: BuiltinToolsConfig {
                datetime_enabled: false,
                file_operations_enabled: false,
                file_operations_allowed_paths: Vec::new(),
                http_request_enabled: false,
                http_request_allowed_hosts: Vec::new(),
                rag_search_enabled: false,
                sql_query_enabled: false,
                sql_query_allowed_databases: Vec::new(),
                web_search_enabled: false,
                web_search_endpoint: String::new(),
            },
        }
    }
}

/// Top-level configuration for [`crate::RagEngine`].
#[derive(Debug, Clone, Default)]
pub struct RagConfig {
    /// Chunking defaults.
    pub chunking: ChunkingConfig,
    /// Retrieval defaults.
    pub retrieval: RetrievalConfig,
    /// Ingestion-side configuration.
    pub ingest: IngestConfig,
    /// Tool-calling configuration.
    pub tools: ToolsConfig,
}
