//! Depth-first walk driving one [`FormatVisitor`] per schema node.
use std::cell::{Cell, RefCell};
use serde_json::Value;

use super::classify::{Classified, Shape};
use super::error::WalkError;
use super::protocol::{FormatVisitor, ItemsHandler, PropertyWriter, ScalarFormatVisitor, TypeDescriptor};
use super::SchemaProvider;

/// State of one walk: the `$ref`s currently being expanded and the nesting depth.
pub struct Walk {
    provider: SchemaProvider,
    expanding: RefCell<Vec<String>>,
    depth: Cell<usize>,
}

impl Walk {
    pub(crate) fn new(provider: SchemaProvider) -> Self {
        Self {
            provider,
            expanding: RefCell::new(Vec::new()),
            depth: Cell::new(0),
        }
    }

    pub(crate) fn provider(&self) -> &SchemaProvider {
        &self.provider
    }

    pub(crate) fn visit_reference(&self, reference: &str, visitor: &mut dyn FormatVisitor) -> Result<(), WalkError> {
        let schema = self.provider.resolve(reference)?;
        self.visit_node(schema, Some(reference), visitor)
    }

    pub(crate) fn visit(&self, schema: &Value, visitor: &mut dyn FormatVisitor) -> Result<(), WalkError> {
        self.visit_node(schema, None, visitor)
    }

    fn visit_node(
        &self,
        schema: &Value,
        origin: Option<&str>,
        visitor: &mut dyn FormatVisitor,
    ) -> Result<(), WalkError> {
        let depth = self.depth.get();
        let max_depth = self.provider.options().max_depth;
        if depth >= max_depth {
            return Err(WalkError::DepthExceeded(max_depth));
        }
        self.depth.set(depth + 1);
        let result = self.dispatch(schema, origin, visitor);
        self.depth.set(depth);
        result
    }

    fn dispatch(
        &self,
        schema: &Value,
        origin: Option<&str>,
        visitor: &mut dyn FormatVisitor,
    ) -> Result<(), WalkError> {
        if visitor.provider().is_none() {
            visitor.set_provider(self.provider.clone());
        }
        let mut node = self.provider.classify(schema)?;
        if node.reference.is_none() {
            node.reference = origin;
        }
        tracing::trace!(shape = ?node.shape, reference = node.reference, "visiting schema node");

        let descriptor = TypeDescriptor::new(node.type_name(), node.schema);
        match node.shape {
            Shape::Object => {
                let mut object = visitor.expect_object_format(&descriptor)?;
                self.expanding_reference(&node, || {
                    for property in self.provider.object_properties(node.schema)? {
                        let writer = PropertyWriter::new(self, property.name, property.schema, property.required);
                        object.property(&writer)?;
                    }
                    Ok(())
                })
            }
            Shape::Array => {
                let mut array = visitor.expect_array_format(&descriptor)?;
                self.expanding_reference(&node, || {
                    for (position, items) in self.provider.array_items(node.schema) {
                        array.items_format(&ItemsHandler::new(self, items, position))?;
                    }
                    Ok(())
                })
            }
            Shape::Map => {
                let mut map = visitor.expect_map_format(&descriptor)?;
                self.expanding_reference(&node, || {
                    let (keys, values) = self.provider.map_entries(node.schema);
                    if let Some(keys) = keys {
                        map.key_format(&ItemsHandler::new(self, keys, None))?;
                    }
                    if let Some(values) = values {
                        map.value_format(&ItemsHandler::new(self, values, None))?;
                    }
                    Ok(())
                })
            }
            Shape::String => describe_scalar(visitor.expect_string_format(&descriptor)?, node.schema),
            Shape::Number => describe_scalar(visitor.expect_number_format(&descriptor)?, node.schema),
            Shape::Integer => describe_scalar(visitor.expect_integer_format(&descriptor)?, node.schema),
            Shape::Boolean => describe_scalar(visitor.expect_boolean_format(&descriptor)?, node.schema),
            Shape::Null => describe_scalar(visitor.expect_null_format(&descriptor)?, node.schema),
            Shape::Any => describe_scalar(visitor.expect_any_format(&descriptor)?, node.schema),
        }
    }

    /// Run `expand` unless the node's `$ref` is already being expanded further up.
    fn expanding_reference<F>(&self, node: &Classified<'_>, expand: F) -> Result<(), WalkError>
    where
        F: FnOnce() -> Result<(), WalkError>,
    {
        let Some(reference) = node.reference else {
            return expand();
        };
        if self.expanding.borrow().iter().any(|r| r == reference) {
            tracing::debug!(reference, "recursive reference, not expanding again");
            return Ok(());
        }
        self.expanding.borrow_mut().push(reference.to_string());
        let result = expand();
        self.expanding.borrow_mut().pop();
        result
    }
}

fn describe_scalar(mut leaf: Box<dyn ScalarFormatVisitor + '_>, schema: &Value) -> Result<(), WalkError> {
    if let Some(format) = schema.get("format").and_then(Value::as_str) {
        leaf.format(format);
    }
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        leaf.enum_values(values);
    }
    Ok(())
}
