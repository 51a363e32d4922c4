//! Built-in tool bodies.
//!
//! Reference implementations for the six tools the facade registers when
//! tool calling is enabled. `http_request` and `web_search` make outbound
//! network calls and `datetime`'s diff/format actions use calendar math, so
//! this whole module sits behind the `builtin-tools` feature (on by
//! default) rather than splitting the gate tool-by-tool.

mod datetime;
mod file_operations;
mod http_request;
mod rag_search;
mod sql_query;
mod web_search;

pub use datetime::DatetimeTool;
pub use file_operations::FileOperationsTool;
pub use http_request::HttpRequestTool;
pub use rag_search::RagSearchTool;
pub use sql_query::SqlQueryTool;
pub use web_search::WebSearchTool;
