//! Error types for the engine.
//!
//! A small top-level [`Error`] wraps per-domain error enums (storage,
//! chunking, I/O, tool, agent) the way each sub-component raises them,
//! plus a handful of cross-cutting variants for conditions that don't
//! belong to any one domain (empty query, backend health). Every variant
//! maps to one of the named error kinds callers can match on via
//! [`Error::kind`] without caring which sub-domain raised it.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-checkable error category, independent of which component raised it.
///
/// Messages are for humans; `kind` is for callers that branch on failure mode
/// (e.g. retry on `Timeout`, surface `InvalidInput` directly to a user).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-supplied violation: empty query, no/multiple ingest sources,
    /// missing tool argument, invalid chunker configuration.
    InvalidInput,
    /// A referenced document, chunk, or tool name does not exist.
    NotFound,
    /// The request names a feature this build or configuration does not provide
    /// (unhandled file extension, URL ingestion, unknown tool action).
    Unsupported,
    /// The embedding backend returned an error or an empty response.
    EmbeddingFailed,
    /// The generation backend returned an error or an empty response.
    GenerationFailed,
    /// A health check against the embedder or generator backend failed.
    ServiceUnavailable,
    /// A deadline was exceeded (tool execution, backend call).
    Timeout,
    /// A store read/write failed.
    IndexError,
}

/// Top-level error type for the engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied input violates a documented precondition.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Human-readable description of the violation.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable description of what was missing.
        message: String,
    },

    /// The request names something this build does not support.
    #[error("unsupported: {message}")]
    Unsupported {
        /// Human-readable description of the unsupported request.
        message: String,
    },

    /// The embedding backend failed.
    #[error("embedding failed: {message}")]
    EmbeddingFailed {
        /// Backend error detail.
        message: String,
    },

    /// The generation backend failed.
    #[error("generation failed: {message}")]
    GenerationFailed {
        /// Backend error detail.
        message: String,
    },

    /// A backend health check failed.
    #[error("service unavailable: {message}")]
    ServiceUnavailable {
        /// Which backend, and why.
        message: String,
    },

    /// A deadline was exceeded.
    #[error("timeout: {message}")]
    Timeout {
        /// Human-readable description of what timed out.
        message: String,
    },

    /// Storage (document/chunk/vector/keyword index) error.
    #[error("index error: {0}")]
    Storage(#[from] StorageError),

    /// Chunking configuration or processing error.
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// File I/O error encountered during content extraction.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Tool registry/executor infrastructure error.
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    /// Generation coordinator infrastructure error.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),
}

impl Error {
    /// Returns the machine-checkable category for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::EmbeddingFailed { .. } => ErrorKind::EmbeddingFailed,
            Self::GenerationFailed { .. } => ErrorKind::GenerationFailed,
            Self::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Storage(_) => ErrorKind::IndexError,
            Self::Chunking(_) => ErrorKind::InvalidInput,
            Self::Io(e) => e.kind(),
            Self::Tool(e) => e.kind(),
            Self::Agent(_) => ErrorKind::GenerationFailed,
        }
    }

    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Unsupported`].
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Timeout`].
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }
}

/// Storage-specific errors (documents, chunks, vectors, keyword index).
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Storage not initialized.
    #[error("store not initialized")]
    NotInitialized,

    /// Document not found by id.
    #[error("document not found: {id}")]
    DocumentNotFound {
        /// Document id that was not found.
        id: String,
    },

    /// Chunk not found by id.
    #[error("chunk not found: {id}")]
    ChunkNotFound {
        /// Chunk id that was not found.
        id: String,
    },

    /// Vector dimension mismatch against the index's fixed dimension.
    #[error("vector dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch {
        /// Dimension of the vector that was rejected.
        actual: usize,
        /// Dimension every other vector in the index shares.
        expected: usize,
    },

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Chunking-specific errors.
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// Invalid chunk configuration.
    #[error("invalid chunk configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration is invalid.
        reason: String,
    },

    /// Chunk size exceeds maximum allowed.
    #[error("chunk size {size} exceeds maximum {max}")]
    ChunkTooLarge {
        /// Requested chunk size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Overlap exceeds chunk size.
    #[error("overlap {overlap} must be less than chunk size {size}")]
    OverlapTooLarge {
        /// Overlap size.
        overlap: usize,
        /// Chunk size.
        size: usize,
    },

    /// Unknown chunking strategy name.
    #[error("unknown chunking strategy: {name}")]
    UnknownStrategy {
        /// Name of the unknown strategy.
        name: String,
    },

    /// Regex compilation error (sentence-boundary detection).
    #[error("regex error: {0}")]
    Regex(String),
}

/// I/O errors from content extraction.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Memory mapping error.
    #[error("memory mapping failed: {path}: {reason}")]
    MmapFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// File extension has no registered decoder.
    #[error("unsupported file extension: {extension}")]
    UnsupportedExtension {
        /// The rejected extension.
        extension: String,
    },

    /// A decoder (e.g. PDF) failed to extract any text.
    #[error("decode failed: {path}: {reason}")]
    DecodeFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },
}

impl IoError {
    const fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. } => ErrorKind::NotFound,
            Self::UnsupportedExtension { .. } => ErrorKind::Unsupported,
            Self::ReadFailed { .. } | Self::MmapFailed { .. } | Self::DecodeFailed { .. } => {
                ErrorKind::Unsupported
            }
        }
    }
}

/// Tool registry/executor infrastructure errors.
///
/// Per-call tool failures (validation, domain error in the body) are
/// conveyed in-band as `ExecutedToolCall { success: false, .. }` and never
/// constructed as this type; this enum is reserved for the failures the
/// executor's *outer* function returns (§4.7).
#[derive(Error, Debug)]
pub enum ToolError {
    /// The requested tool name is not registered or not enabled.
    #[error("unknown tool: {name}")]
    UnknownTool {
        /// The requested tool name.
        name: String,
    },

    /// The tool call's deadline elapsed.
    #[error("tool '{name}' timed out after {elapsed_ms}ms")]
    TimedOut {
        /// Tool name.
        name: String,
        /// Elapsed time before the deadline fired.
        elapsed_ms: u64,
    },

    /// The registry or executor has been closed.
    #[error("tool registry closed")]
    RegistryClosed,
}

impl ToolError {
    const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTool { .. } => ErrorKind::NotFound,
            Self::TimedOut { .. } => ErrorKind::Timeout,
            Self::RegistryClosed => ErrorKind::ServiceUnavailable,
        }
    }
}

/// Tool-calling coordinator infrastructure errors.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The coordinator exceeded its round budget without a final answer.
    #[error("exceeded {max_rounds} tool-calling rounds without a final answer")]
    RoundBudgetExceeded {
        /// The configured round budget.
        max_rounds: usize,
    },

    /// The generator returned a malformed or empty response.
    #[error("generator returned an invalid response: {reason}")]
    InvalidResponse {
        /// Description of what was wrong with the response.
        reason: String,
    },

    /// Streaming generation failed mid-stream.
    #[error("stream error: {message}")]
    Stream {
        /// Description of the failure.
        message: String,
    },
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        Self::ReadFailed {
            path: String::new(),
            reason: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::from(err))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<regex::Error> for ChunkingError {
    fn from(err: regex::Error) -> Self {
        Self::Regex(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_kind() {
        let err = Error::invalid_input("empty query");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("empty query"));
    }

    #[test]
    fn storage_error_maps_to_index_error_kind() {
        let err: Error = StorageError::NotInitialized.into();
        assert_eq!(err.kind(), ErrorKind::IndexError);
    }

    #[test]
    fn chunking_error_maps_to_invalid_input_kind() {
        let err: Error = ChunkingError::InvalidConfig {
            reason: "chunk_size must be > 0".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn io_not_found_maps_to_not_found_kind() {
        let err: Error = IoError::FileNotFound {
            path: "/tmp/missing".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unsupported_extension_maps_to_unsupported_kind() {
        let err: Error = IoError::UnsupportedExtension {
            extension: "docx".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn tool_timeout_maps_to_timeout_kind() {
        let err: Error = ToolError::TimedOut {
            name: "http_request".into(),
            elapsed_ms: 30_000,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn unknown_tool_maps_to_not_found_kind() {
        let err: Error = ToolError::UnknownTool {
            name: "nope".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn agent_round_budget_maps_to_generation_failed_kind() {
        let err: Error = AgentError::RoundBudgetExceeded { max_rounds: 5 }.into();
        assert_eq!(err.kind(), ErrorKind::GenerationFailed);
    }

    #[test]
    fn rusqlite_error_converts_through_storage() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, Error::Storage(StorageError::Database(_))));
    }

    #[test]
    fn messages_do_not_leak_raw_debug_formatting() {
        let err = Error::invalid_input("exactly one of content, file_path, url must be set");
        assert!(!err.to_string().contains("Error {"));
    }
}
