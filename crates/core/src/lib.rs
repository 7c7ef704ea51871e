//! # ContextLoom Core
//!
//! Domain types, traits, and error definitions for rendering an agent's
//! state into a single prompt document.
//! This crate has **no framework dependencies**: it defines the element
//! model, the log stream, the context tree, and the schema shapes that the
//! render crate formats.
//!
//! ## Collaborator seams
//!
//! Two pieces of behaviour are supplied by the caller through traits:
//! - [`SchemaConverter`] turns a raw data shape into canonical form
//! - [`WorkingMemoryRenderer`] turns the working-memory buffer into nodes

pub mod context;
pub mod element;
pub mod error;
pub mod interface;
pub mod log;
pub mod memory;
pub mod schema;

// Re-export key types at crate root for ergonomics
pub use context::{ComputeFn, ContextDescriptor, ContextState, ContextView, Fragment, Text};
pub use element::{Content, Element, Node, join_nodes};
pub use error::{BoxError, Error, Result, SchemaError};
pub use interface::{ActionDecl, OutputInterface};
pub use log::{ActionCall, ActionResult, IoRef, LOG_KINDS, LogEntry, Thought};
pub use memory::{LogRecord, WorkingMemory, WorkingMemoryRenderer, WorkingMemoryRequest};
pub use schema::{
    CanonicalSchema, FieldKind, FieldShape, JSON_SCHEMA_DRAFT, JsonSchemaConverter, RawShape,
    SchemaConverter, SchemaShape, render_schema,
};
