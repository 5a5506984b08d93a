//! Schema introspection engine.
//!
//! Walks a JSON Schema document (as produced by `schemars`, or hand-written
//! draft-07 / 2020-12) depth first and reports every node to a
//! [`FormatVisitor`] through one `expect_*_format` call per shape.
//!
//! Self-referential types: a `$ref` that is already being expanded further up
//! the walk is still reported (so the field gets its type) but its children
//! are not visited again. Inline nesting is bounded by [`WalkOptions::max_depth`].
pub mod classify;
pub mod error;
pub mod protocol;
pub mod provider;
mod walk;

pub use classify::{Classified, Shape};
pub use error::WalkError;
pub use protocol::{
    ArrayFormatVisitor, FormatVisitor, ItemsHandler, MapFormatVisitor, Noop,
    ObjectFormatVisitor, PropertyWriter, ScalarFormatVisitor, TypeDescriptor,
};
pub use provider::{SchemaProvider, WalkOptions};
