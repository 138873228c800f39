// Rust 1.93+ triggers false positives on thiserror/miette derive macro fields
#![allow(unused_assignments)]

//! Glow device configuration completion
//!
//! Schema-driven completion for a YAML-like device configuration DSL:
//! component blocks, platform sequences, trigger/action automations,
//! registries, and pin references. The schema is loaded from JSON once and
//! the engine resolves cursor positions against it.
//!
//! # Example
//!
//! ```no_run
//! use glow::{CompletionEngine, CoreSchema};
//!
//! # fn main() -> glow::GlowResult<()> {
//! let data = std::fs::read_to_string("schema.json")
//!     .map_err(|e| glow::GlowError::io_error("schema.json", &e))?;
//! let schema = CoreSchema::from_json(&data)?;
//! let engine = CompletionEngine::new(&schema);
//! let suggestions = engine.complete("wifi:\n  ", 1, 2);
//! # Ok(())
//! # }
//! ```

pub mod complete;
pub mod errors;
#[cfg(feature = "lsp")]
pub mod lsp;
pub mod schema;
pub mod syntax;

pub use complete::{
    extract_path, Candidate, CandidateKind, CompletionEngine, PathSegment, Suggestion,
};
pub use errors::{GlowError, GlowResult};
pub use schema::{Component, CoreSchema, ObjectSchema, Property, Requirement, SchemaNode};
pub use syntax::{DocumentTree, NodeId, NodeKind, Span};
