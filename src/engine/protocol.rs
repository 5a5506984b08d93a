//! The double-dispatch visitor protocol.
//!
//! The walker classifies a schema node and calls exactly one `expect_*_format`
//! on the current [`FormatVisitor`]. Whatever comes back is the continuation:
//! object visitors get a [`PropertyWriter`] per property, array visitors an
//! [`ItemsHandler`] per element schema, and both hand a fresh `FormatVisitor`
//! back to the writer/handler to recurse.
use std::borrow::Cow;
use serde_json::Value;

use super::walk::Walk;
use super::{SchemaProvider, WalkError};

/// What the walker knows about the node being visited.
#[derive(Debug, Clone)]
pub struct TypeDescriptor<'s> {
    name: Option<Cow<'s, str>>,
    schema: &'s Value,
}

impl<'s> TypeDescriptor<'s> {
    pub(crate) fn new(name: Option<Cow<'s, str>>, schema: &'s Value) -> Self {
        Self { name, schema }
    }
    /// Definition name (from `$ref`) or `title`, when there is one.
    pub fn name(&self) -> Option<&str> { self.name.as_deref() }
    pub fn schema(&self) -> &'s Value { self.schema }
}

pub trait FormatVisitor {
    fn provider(&self) -> Option<&SchemaProvider>;
    fn set_provider(&mut self, provider: SchemaProvider);

    fn expect_object_format(&mut self, ty: &TypeDescriptor<'_>) -> Result<Box<dyn ObjectFormatVisitor + '_>, WalkError>;
    fn expect_array_format(&mut self, ty: &TypeDescriptor<'_>) -> Result<Box<dyn ArrayFormatVisitor + '_>, WalkError>;
    fn expect_string_format(&mut self, ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError>;
    fn expect_number_format(&mut self, ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError>;
    fn expect_integer_format(&mut self, ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError>;
    fn expect_boolean_format(&mut self, ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError>;
    fn expect_null_format(&mut self, ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError>;
    fn expect_any_format(&mut self, ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError>;
    fn expect_map_format(&mut self, ty: &TypeDescriptor<'_>) -> Result<Box<dyn MapFormatVisitor + '_>, WalkError>;
}

pub trait ObjectFormatVisitor {
    fn property(&mut self, writer: &PropertyWriter<'_>) -> Result<(), WalkError>;
}

pub trait ArrayFormatVisitor {
    /// Called once per element schema (once per position for tuples).
    fn items_format(&mut self, items: &ItemsHandler<'_>) -> Result<(), WalkError>;
}

/// Leaf shapes. Details are offered, nothing is required.
pub trait ScalarFormatVisitor {
    fn format(&mut self, _format: &str) {}
    fn enum_values(&mut self, _values: &[Value]) {}
}

pub trait MapFormatVisitor {
    fn key_format(&mut self, _keys: &ItemsHandler<'_>) -> Result<(), WalkError> { Ok(()) }
    fn value_format(&mut self, _values: &ItemsHandler<'_>) -> Result<(), WalkError> { Ok(()) }
}

/// Leaf visitor that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Noop;

impl ScalarFormatVisitor for Noop {}
impl MapFormatVisitor for Noop {}

// ————————————————————————————————————————————————————————————————————————————
// CALLBACK HANDLES
// ————————————————————————————————————————————————————————————————————————————

/// One object property, able to walk its own schema into a visitor.
pub struct PropertyWriter<'w> {
    walk: &'w Walk,
    name: &'w str,
    schema: &'w Value,
    required: bool,
}

impl<'w> PropertyWriter<'w> {
    pub(crate) fn new(walk: &'w Walk, name: &'w str, schema: &'w Value, required: bool) -> Self {
        Self { walk, name, schema, required }
    }
    pub fn name(&self) -> &'w str { self.name }
    pub fn is_required(&self) -> bool { self.required }
    /// The property's schema lets the value be `null` (`Option<T>`, `type: [T, "null"]`).
    pub fn is_nullable(&self) -> bool {
        self.walk.provider().admits_null(self.schema)
    }
    pub fn schema(&self) -> &'w Value { self.schema }
    /// The property's own `description`, not the one of the type it refers to.
    pub fn description(&self) -> Option<&'w str> {
        self.schema.get("description").and_then(Value::as_str)
    }
    pub fn accept_format_visitor(&self, visitor: &mut dyn FormatVisitor) -> Result<(), WalkError> {
        self.walk.visit(self.schema, visitor)
    }
}

/// An element (or map key/value) schema.
pub struct ItemsHandler<'w> {
    walk: &'w Walk,
    schema: &'w Value,
    position: Option<usize>,
}

impl<'w> ItemsHandler<'w> {
    pub(crate) fn new(walk: &'w Walk, schema: &'w Value, position: Option<usize>) -> Self {
        Self { walk, schema, position }
    }
    /// Tuple position, `None` for homogeneous lists.
    pub fn position(&self) -> Option<usize> { self.position }
    pub fn schema(&self) -> &'w Value { self.schema }
    pub fn accept_format_visitor(&self, visitor: &mut dyn FormatVisitor) -> Result<(), WalkError> {
        self.walk.visit(self.schema, visitor)
    }
}
