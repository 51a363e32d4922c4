//! Tool-calling coordination between a [`crate::generation::Generator`] and
//! the [`crate::tools`] execution layer.

pub mod coordinator;

pub use coordinator::{CoordinatorOutcome, ToolCallingCoordinator};
