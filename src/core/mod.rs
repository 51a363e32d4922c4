//! Core domain models.
//!
//! This module contains the fundamental data structures used throughout the
//! engine: documents and chunks. These are pure domain models with no I/O
//! dependencies.

pub mod chunk;
pub mod document;

pub use chunk::Chunk;
pub use document::{Document, DocumentSource};
