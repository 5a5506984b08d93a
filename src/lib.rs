//! Field documentation from JSON Schemas.
//!
//! Walk a schema (hand-written, or derived from a Rust type with `schemars`)
//! and collect, for every field, its dot/bracket path and the JSON type a
//! documentation table should show for it.
//!
//! ```
//! use field_docs::{document_schema, FieldType};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "id": { "type": "integer" },
//!         "tags": { "type": "array", "items": { "type": "string" } }
//!     }
//! });
//! let fields = document_schema(&schema).unwrap();
//! assert_eq!(fields.field_type("id"), Some(FieldType::Number));
//! assert_eq!(fields.field_type("tags"), Some(FieldType::Array));
//! ```
pub mod context;
pub mod documentation;
pub mod engine;
pub mod field_info;
pub mod field_type;

use schemars::JsonSchema;
use serde_json::Value;

pub use context::{FieldEntry, VisitorContext};
pub use documentation::FieldDocumentationVisitor;
pub use engine::{SchemaProvider, WalkError, WalkOptions};
pub use field_info::FieldInfo;
pub use field_type::FieldType;

/// Document every field of a schema document.
pub fn document_schema(schema: &Value) -> Result<VisitorContext, WalkError> {
    document_with(&SchemaProvider::from_root(schema.clone()), |provider, visitor| {
        provider.accept_format_visitor(visitor)
    })
}

/// Document the node a local reference points at (`#/components/schemas/Order`),
/// resolving `$ref`s against the whole document.
pub fn document_reference(schema: &Value, reference: &str) -> Result<VisitorContext, WalkError> {
    document_with(&SchemaProvider::from_root(schema.clone()), |provider, visitor| {
        provider.accept_reference(reference, visitor)
    })
}

/// Document a Rust type through its `schemars` schema.
pub fn document_type<T: JsonSchema>() -> Result<VisitorContext, WalkError> {
    let schema = schemars::SchemaGenerator::default().into_root_schema_for::<T>();
    document_schema(schema.as_value())
}

/// Run one walk with a fresh root visitor and hand back its context.
pub fn document_with<F>(provider: &SchemaProvider, walk: F) -> Result<VisitorContext, WalkError>
where
    F: FnOnce(&SchemaProvider, &mut FieldDocumentationVisitor<'static>) -> Result<(), WalkError>,
{
    let mut visitor = FieldDocumentationVisitor::create();
    walk(provider, &mut visitor)?;
    Ok(visitor.into_context())
}
