//! Schema node → one JSON shape.
//!
//! `$ref`s are followed, nullable wrappers (`type: [T, "null"]`,
//! `anyOf: [T, {type: null}]`) collapse to `T`, and anything the walker cannot
//! name as a single shape becomes `Any`.
use std::borrow::Cow;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::error::{malformed, WalkError};
use super::SchemaProvider;

/// Hops through `$ref` / single-branch unions before a chain counts as a loop.
const MAX_HOPS: usize = 32;

/// Pointer prefixes whose last segment names a type.
const DEFINITION_PREFIXES: [&str; 3] = ["#/$defs/", "#/definitions/", "#/components/schemas/"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Any,
    Map,
}

impl Shape {
    fn is_scalar(self) -> bool {
        !matches!(self, Self::Object | Self::Array | Self::Map)
    }
}

/// Result of classifying one node.
#[derive(Debug, Clone, Copy)]
pub struct Classified<'s> {
    pub shape: Shape,
    /// The node to expand: the `$ref` target or chosen union branch.
    pub schema: &'s Value,
    /// Last `$ref` followed to reach `schema`.
    pub reference: Option<&'s str>,
}

impl<'s> Classified<'s> {
    /// Definition name from the reference, else the schema `title`.
    pub fn type_name(&self) -> Option<Cow<'s, str>> {
        self.reference
            .and_then(definition_name)
            .or_else(|| self.schema.get("title").and_then(Value::as_str).map(Cow::Borrowed))
    }
}

/// One object property gathered for expansion.
#[derive(Debug, Clone, Copy)]
pub struct Property<'s> {
    pub name: &'s str,
    pub schema: &'s Value,
    pub required: bool,
}

impl SchemaProvider {
    pub fn classify<'s>(&'s self, schema: &'s Value) -> Result<Classified<'s>, WalkError> {
        self.classify_at(schema, None, 0)
    }

    fn classify_at<'s>(
        &'s self,
        schema: &'s Value,
        reference: Option<&'s str>,
        hops: usize,
    ) -> Result<Classified<'s>, WalkError> {
        if hops > MAX_HOPS {
            return Err(WalkError::ReferenceLoop(reference.unwrap_or("#").to_string()));
        }
        let found = |shape: Shape| -> Result<Classified<'s>, WalkError> {
            Ok(Classified { shape, schema, reference })
        };

        let object = match schema {
            Value::Bool(true) => return found(Shape::Any),
            Value::Bool(false) => return Err(malformed("`false` schema admits no value")),
            Value::Object(object) => object,
            other => return Err(malformed(format!("expected a schema, found `{other}`"))),
        };

        if let Some(target) = object.get("$ref") {
            let target = target.as_str()
                .ok_or_else(|| malformed("`$ref` must be a string"))?;
            let resolved = self.resolve(target)?;
            return self.classify_at(resolved, Some(target), hops + 1);
        }

        match object.get("type") {
            Some(Value::String(name)) => return found(shape_of_type(name, object)?),
            Some(Value::Array(names)) => {
                let mut names = names.iter()
                    .map(|n| n.as_str().ok_or_else(|| malformed("`type` list must hold strings")))
                    .collect::<Result<Vec<_>, _>>()?;
                names.retain(|n| *n != "null");
                return match names.as_slice() {
                    [] => found(Shape::Null),
                    [only] => found(shape_of_type(only, object)?),
                    many if many.iter().all(|n| matches!(*n, "integer" | "number")) => found(Shape::Number),
                    _ => found(Shape::Any),
                };
            }
            Some(other) => return Err(malformed(format!("`type` must be a string or list, found `{other}`"))),
            None => {}
        }

        for key in ["anyOf", "oneOf"] {
            if let Some(branches) = object.get(key) {
                let branches = branches.as_array()
                    .ok_or_else(|| malformed(format!("`{key}` must be a list")))?;
                return self.classify_union(schema, branches, reference, hops);
            }
        }

        if let Some(members) = object.get("allOf") {
            let members = members.as_array()
                .ok_or_else(|| malformed("`allOf` must be a list"))?;
            if let [only] = members.as_slice() {
                let member = self.classify_at(only, reference, hops + 1)?;
                // sibling keywords extend the member, so the node itself is expanded
                if member.shape != Shape::Object || !has_own_fields(object) {
                    return Ok(member);
                }
                return found(Shape::Object);
            }
            let shapes = members.iter()
                .map(|m| self.classify_at(m, None, hops + 1).map(|c| c.shape))
                .collect::<Result<Vec<_>, _>>()?;
            return match shapes.split_first() {
                Some((first, rest)) if rest.iter().all(|s| s == first)
                    && (*first == Shape::Object || first.is_scalar()) => found(*first),
                _ => found(Shape::Any),
            };
        }

        if let Some(value) = object.get("const") {
            return found(shape_of_values(std::slice::from_ref(value)));
        }
        if let Some(values) = object.get("enum") {
            let values = values.as_array()
                .ok_or_else(|| malformed("`enum` must be a list"))?;
            return found(shape_of_values(values));
        }

        if object.contains_key("properties") {
            return found(Shape::Object);
        }
        if object.contains_key("items") || object.contains_key("prefixItems") {
            return found(Shape::Array);
        }
        if has_value_schema(object) {
            return found(Shape::Map);
        }
        found(Shape::Any)
    }

    fn classify_union<'s>(
        &'s self,
        schema: &'s Value,
        branches: &'s [Value],
        reference: Option<&'s str>,
        hops: usize,
    ) -> Result<Classified<'s>, WalkError> {
        let mut kept = Vec::with_capacity(branches.len());
        for branch in branches {
            let classified = self.classify_at(branch, None, hops + 1)?;
            if classified.shape != Shape::Null {
                kept.push(classified);
            }
        }
        let union = |shape: Shape| -> Result<Classified<'s>, WalkError> {
            Ok(Classified { shape, schema, reference })
        };
        match kept.as_slice() {
            [] => union(Shape::Null),
            [only] => Ok(*only),
            [first, rest @ ..] => {
                let mut merged = first.shape;
                for branch in rest {
                    merged = match (merged, branch.shape) {
                        (a, b) if a == b && a.is_scalar() => a,
                        (Shape::Integer | Shape::Number, Shape::Integer | Shape::Number) => Shape::Number,
                        _ => return union(Shape::Any),
                    };
                }
                union(merged)
            }
        }
    }

    /// Whether the schema explicitly lets the value be `null`: a `null` type,
    /// a `null` union branch, or `null` among `const` / `enum` values.
    pub fn admits_null(&self, schema: &Value) -> bool {
        self.admits_null_at(schema, 0)
    }

    fn admits_null_at(&self, schema: &Value, hops: usize) -> bool {
        let Some(object) = schema.as_object() else { return false };
        if hops > MAX_HOPS {
            return false;
        }
        if let Some(target) = object.get("$ref").and_then(Value::as_str) {
            return self.resolve(target).is_ok_and(|resolved| self.admits_null_at(resolved, hops + 1));
        }
        match object.get("type") {
            Some(Value::String(name)) if name == "null" => return true,
            Some(Value::Array(names)) if names.iter().any(|n| n == "null") => return true,
            Some(_) => return false,
            None => {}
        }
        if object.get("const").is_some_and(Value::is_null) {
            return true;
        }
        if let Some(Value::Array(values)) = object.get("enum") {
            return values.iter().any(Value::is_null);
        }
        ["anyOf", "oneOf"].iter()
            .filter_map(|key| object.get(*key).and_then(Value::as_array))
            .flatten()
            .any(|branch| self.admits_null_at(branch, hops + 1))
    }

    // ————————————————————————————————————————————————————————————————————————
    // EXPANSION HELPERS
    // ————————————————————————————————————————————————————————————————————————

    /// Properties of an object node in document order, `allOf` members merged.
    ///
    /// `required` applies to the whole instance: a name listed by the node or
    /// by any merged member marks the property required wherever it was declared.
    /// Properties whose schema is `false` can never be present and are skipped.
    pub fn object_properties<'s>(&'s self, schema: &'s Value) -> Result<Vec<Property<'s>>, WalkError> {
        let mut out = IndexMap::new();
        let mut required = Vec::new();
        self.collect_properties(schema, &mut out, &mut required, 0)?;
        Ok(out.into_values()
            .map(|p| Property { required: required.contains(&p.name), ..p })
            .collect())
    }

    fn collect_properties<'s>(
        &'s self,
        schema: &'s Value,
        out: &mut IndexMap<&'s str, Property<'s>>,
        required: &mut Vec<&'s str>,
        hops: usize,
    ) -> Result<(), WalkError> {
        if hops > MAX_HOPS {
            return Err(WalkError::ReferenceLoop("allOf".to_string()));
        }
        let Some(object) = schema.as_object() else { return Ok(()) };

        if let Some(Value::Array(names)) = object.get("required") {
            required.extend(names.iter().filter_map(Value::as_str));
        }

        if let Some(props) = object.get("properties") {
            let props = props.as_object()
                .ok_or_else(|| malformed("`properties` must be an object"))?;
            for (name, prop) in props {
                if matches!(prop, Value::Bool(false)) {
                    tracing::trace!(property = %name, "skipping forbidden property");
                    continue;
                }
                out.entry(name.as_str())
                    .or_insert(Property { name, schema: prop, required: false });
            }
        }

        if let Some(Value::Array(members)) = object.get("allOf") {
            for member in members {
                let classified = self.classify_at(member, None, hops + 1)?;
                if matches!(classified.shape, Shape::Object | Shape::Any) {
                    self.collect_properties(classified.schema, out, required, hops + 1)?;
                }
            }
        }
        Ok(())
    }

    /// Element schemas of an array node; tuple positions carry their index.
    pub fn array_items<'s>(&'s self, schema: &'s Value) -> Vec<(Option<usize>, &'s Value)> {
        let mut out = Vec::new();
        let Some(object) = schema.as_object() else { return out };

        let positional = match object.get("prefixItems") {
            Some(Value::Array(xs)) => Some((xs, object.get("items"))),
            _ => match object.get("items") {
                Some(Value::Array(xs)) => Some((xs, object.get("additionalItems"))),
                _ => None,
            },
        };
        match positional {
            Some((positions, rest)) => {
                out.extend(positions.iter().enumerate().map(|(i, s)| (Some(i), s)));
                if let Some(rest) = rest.filter(|v| v.is_object()) {
                    out.push((None, rest));
                }
            }
            None => {
                if let Some(items) = object.get("items").filter(|v| v.is_object()) {
                    out.push((None, items));
                }
            }
        }
        out
    }

    /// `(keys, values)` schemas of a map node.
    pub fn map_entries<'s>(&'s self, schema: &'s Value) -> (Option<&'s Value>, Option<&'s Value>) {
        let Some(object) = schema.as_object() else { return (None, None) };
        let keys = object.get("propertyNames").filter(|v| v.is_object());
        let values = object.get("additionalProperties")
            .filter(|v| v.is_object())
            .or_else(|| {
                object.get("patternProperties")
                    .and_then(Value::as_object)
                    .and_then(|pp| pp.values().next())
            });
        (keys, values)
    }
}

/// Unescaped definition name when `reference` points into a definitions container.
fn definition_name(reference: &str) -> Option<Cow<'_, str>> {
    let token = DEFINITION_PREFIXES.iter()
        .find_map(|prefix| reference.strip_prefix(prefix))
        .filter(|token| !token.is_empty() && !token.contains('/'))?;
    if token.contains('~') {
        Some(Cow::Owned(token.replace("~1", "/").replace("~0", "~")))
    } else {
        Some(Cow::Borrowed(token))
    }
}

/// Keywords beside a lone `allOf` member that add fields of their own.
fn has_own_fields(object: &Map<String, Value>) -> bool {
    object.contains_key("properties") || object.contains_key("required")
}

fn shape_of_type(name: &str, object: &Map<String, Value>) -> Result<Shape, WalkError> {
    Ok(match name {
        "object" => {
            if !object.contains_key("properties") && has_value_schema(object) {
                Shape::Map
            } else {
                Shape::Object
            }
        }
        "array" => Shape::Array,
        "string" => Shape::String,
        "integer" => Shape::Integer,
        "number" => Shape::Number,
        "boolean" => Shape::Boolean,
        "null" => Shape::Null,
        other => return Err(malformed(format!("unknown type `{other}`"))),
    })
}

/// Open-ended values: a schema (or `true`) under `additionalProperties`, or `patternProperties`.
fn has_value_schema(object: &Map<String, Value>) -> bool {
    matches!(object.get("additionalProperties"), Some(Value::Object(_) | Value::Bool(true)))
        || object.get("patternProperties").and_then(Value::as_object).is_some_and(|pp| !pp.is_empty())
}

fn shape_of_values(values: &[Value]) -> Shape {
    fn shape(v: &Value) -> Shape {
        match v {
            Value::Null => Shape::Null,
            Value::Bool(_) => Shape::Boolean,
            Value::Number(n) if n.is_f64() => Shape::Number,
            Value::Number(_) => Shape::Integer,
            Value::String(_) => Shape::String,
            Value::Array(_) => Shape::Array,
            Value::Object(_) => Shape::Object,
        }
    }
    let mut shapes = values.iter().map(shape).filter(|s| *s != Shape::Null);
    let Some(first) = shapes.next() else {
        return if values.is_empty() { Shape::Any } else { Shape::Null };
    };
    let mut merged = first;
    for s in shapes {
        merged = match (merged, s) {
            (a, b) if a == b => a,
            (Shape::Integer | Shape::Number, Shape::Integer | Shape::Number) => Shape::Number,
            _ => return Shape::Any,
        };
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shape(schema: Value) -> Shape {
        let provider = SchemaProvider::from_root(json!({
            "$defs": {
                "Address": { "type": "object", "properties": { "street": { "type": "string" } } },
                "Loop": { "$ref": "#/$defs/Loop" }
            }
        }));
        provider.classify(&schema).unwrap().shape
    }

    #[test]
    fn plain_types() {
        assert_eq!(shape(json!({ "type": "string" })), Shape::String);
        assert_eq!(shape(json!({ "type": "integer", "format": "int32" })), Shape::Integer);
        assert_eq!(shape(json!({ "type": "number" })), Shape::Number);
        assert_eq!(shape(json!({ "type": "boolean" })), Shape::Boolean);
        assert_eq!(shape(json!({ "type": "null" })), Shape::Null);
        assert_eq!(shape(json!({ "type": "array", "items": { "type": "string" } })), Shape::Array);
        assert_eq!(shape(json!({ "type": "object", "properties": {} })), Shape::Object);
        assert_eq!(shape(json!({ "type": "object" })), Shape::Object);
    }

    #[test]
    fn untyped_schemas_are_any() {
        assert_eq!(shape(json!(true)), Shape::Any);
        assert_eq!(shape(json!({})), Shape::Any);
        assert_eq!(shape(json!({ "description": "whatever" })), Shape::Any);
    }

    #[test]
    fn maps_are_told_apart_from_objects() {
        assert_eq!(shape(json!({ "type": "object", "additionalProperties": { "type": "integer" } })), Shape::Map);
        assert_eq!(shape(json!({ "type": "object", "additionalProperties": true })), Shape::Map);
        assert_eq!(shape(json!({ "type": "object", "patternProperties": { "^x-": {} } })), Shape::Map);
        assert_eq!(
            shape(json!({ "type": "object", "properties": { "a": {} }, "additionalProperties": false })),
            Shape::Object
        );
    }

    #[test]
    fn nullable_wrappers_collapse() {
        assert_eq!(shape(json!({ "type": ["string", "null"] })), Shape::String);
        assert_eq!(shape(json!({ "type": ["null"] })), Shape::Null);
        assert_eq!(shape(json!({ "type": ["integer", "number", "null"] })), Shape::Number);
        assert_eq!(shape(json!({ "type": ["string", "integer"] })), Shape::Any);
        assert_eq!(
            shape(json!({ "anyOf": [{ "$ref": "#/$defs/Address" }, { "type": "null" }] })),
            Shape::Object
        );
    }

    #[test]
    fn union_branch_keeps_its_reference() {
        let provider = SchemaProvider::from_root(json!({
            "$defs": { "Address": { "type": "object", "properties": {} } }
        }));
        let schema = json!({ "anyOf": [{ "$ref": "#/$defs/Address" }, { "type": "null" }] });
        let c = provider.classify(&schema).unwrap();
        assert_eq!(c.reference, Some("#/$defs/Address"));
        assert_eq!(c.type_name().as_deref(), Some("Address"));
    }

    #[test]
    fn numeric_unions_fold_to_number() {
        assert_eq!(shape(json!({ "anyOf": [{ "type": "integer" }, { "type": "number" }] })), Shape::Number);
        assert_eq!(
            shape(json!({ "oneOf": [{ "type": "integer" }, { "type": "number" }, { "type": "null" }] })),
            Shape::Number
        );
        assert_eq!(shape(json!({ "anyOf": [{ "type": "integer" }, { "type": "string" }] })), Shape::Any);
    }

    #[test]
    fn type_names_come_from_definitions_only() {
        let provider = SchemaProvider::from_root(json!({
            "$defs": { "a/b": { "type": "object", "properties": {} } },
            "properties": { "foo": { "type": "object", "properties": {} } },
            "components": { "schemas": { "Pet": { "title": "Animal", "type": "object" } } }
        }));
        let name = |reference: &str| {
            let schema = json!({ "$ref": reference });
            provider.classify(&schema).unwrap().type_name().map(Cow::into_owned)
        };
        assert_eq!(name("#/$defs/a~1b").as_deref(), Some("a/b"));
        assert_eq!(name("#/properties/foo"), None);
        assert_eq!(name("#/components/schemas/Pet").as_deref(), Some("Pet"));
    }

    #[test]
    fn explicit_nulls_are_detected() {
        let provider = SchemaProvider::from_root(json!({
            "$defs": { "Maybe": { "type": ["string", "null"] } }
        }));
        assert!(provider.admits_null(&json!({ "type": ["string", "null"] })));
        assert!(provider.admits_null(&json!({ "anyOf": [{ "type": "integer" }, { "type": "null" }] })));
        assert!(provider.admits_null(&json!({ "enum": ["a", null] })));
        assert!(provider.admits_null(&json!({ "$ref": "#/$defs/Maybe" })));
        assert!(!provider.admits_null(&json!({ "type": "string" })));
        assert!(!provider.admits_null(&json!({})));
        assert!(!provider.admits_null(&json!(true)));
    }

    #[test]
    fn mixed_unions_vary() {
        assert_eq!(shape(json!({ "oneOf": [{ "type": "string" }, { "type": "integer" }] })), Shape::Any);
        assert_eq!(
            shape(json!({ "oneOf": [{ "type": "string", "const": "a" }, { "type": "string", "const": "b" }] })),
            Shape::String
        );
        assert_eq!(
            shape(json!({ "oneOf": [{ "$ref": "#/$defs/Address" }, { "type": "object", "properties": {} }] })),
            Shape::Any
        );
    }

    #[test]
    fn all_of_objects_merge() {
        assert_eq!(shape(json!({ "allOf": [{ "$ref": "#/$defs/Address" }] })), Shape::Object);
        assert_eq!(
            shape(json!({ "allOf": [{ "$ref": "#/$defs/Address" }, { "properties": { "zip": {} } }] })),
            Shape::Object
        );
        assert_eq!(shape(json!({ "allOf": [{ "type": "string" }, { "type": "object" }] })), Shape::Any);
    }

    #[test]
    fn enums_and_consts_without_type() {
        assert_eq!(shape(json!({ "enum": ["a", "b"] })), Shape::String);
        assert_eq!(shape(json!({ "enum": [1, 2.5] })), Shape::Number);
        assert_eq!(shape(json!({ "enum": ["a", 1] })), Shape::Any);
        assert_eq!(shape(json!({ "const": true })), Shape::Boolean);
        assert_eq!(shape(json!({ "enum": ["a", null] })), Shape::String);
    }

    #[test]
    fn self_referencing_definition_is_a_loop() {
        let provider = SchemaProvider::from_root(json!({ "$defs": { "Loop": { "$ref": "#/$defs/Loop" } } }));
        let schema = json!({ "$ref": "#/$defs/Loop" });
        assert!(matches!(provider.classify(&schema), Err(WalkError::ReferenceLoop(_))));
    }

    #[test]
    fn false_schema_is_malformed() {
        let provider = SchemaProvider::from_root(json!({}));
        let schema = json!(false);
        assert!(matches!(provider.classify(&schema), Err(WalkError::Malformed(_))));
    }

    #[test]
    fn merged_properties_keep_order_and_requiredness() {
        let provider = SchemaProvider::from_root(json!({
            "$defs": {
                "Base": { "type": "object", "required": ["id"], "properties": { "id": { "type": "integer" } } }
            }
        }));
        let schema = json!({
            "allOf": [
                { "$ref": "#/$defs/Base" },
                { "type": "object", "properties": { "name": { "type": "string" } } }
            ]
        });
        let props = provider.object_properties(&schema).unwrap();
        let summary: Vec<_> = props.iter().map(|p| (p.name, p.required)).collect();
        assert_eq!(summary, vec![("id", true), ("name", false)]);
    }

    #[test]
    fn required_applies_across_merged_members() {
        let provider = SchemaProvider::from_root(json!({
            "$defs": {
                "Base": { "type": "object", "properties": { "id": { "type": "integer" }, "tag": { "type": "string" } } }
            }
        }));
        let schema = json!({
            "type": "object",
            "required": ["id"],
            "allOf": [{ "$ref": "#/$defs/Base" }, { "required": ["tag"] }]
        });
        let props = provider.object_properties(&schema).unwrap();
        let summary: Vec<_> = props.iter().map(|p| (p.name, p.required)).collect();
        assert_eq!(summary, vec![("id", true), ("tag", true)]);
    }

    #[test]
    fn lone_all_of_keeps_sibling_properties() {
        let provider = SchemaProvider::from_root(json!({
            "$defs": { "Base": { "type": "object", "properties": { "id": { "type": "integer" } } } }
        }));
        let schema = json!({
            "allOf": [{ "$ref": "#/$defs/Base" }],
            "required": ["extra"],
            "properties": { "extra": { "type": "string" } }
        });
        let classified = provider.classify(&schema).unwrap();
        assert_eq!(classified.shape, Shape::Object);
        let props = provider.object_properties(classified.schema).unwrap();
        let summary: Vec<_> = props.iter().map(|p| (p.name, p.required)).collect();
        assert_eq!(summary, vec![("extra", true), ("id", false)]);
    }

    #[test]
    fn forbidden_properties_are_skipped() {
        let provider = SchemaProvider::from_root(json!({}));
        let schema = json!({
            "type": "object",
            "properties": { "legacy": false, "id": { "type": "integer" } }
        });
        let names: Vec<_> = provider.object_properties(&schema).unwrap().iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["id"]);
    }

    #[test]
    fn tuple_items_are_positional() {
        let provider = SchemaProvider::from_root(json!({}));
        let modern = json!({ "type": "array", "prefixItems": [{ "type": "string" }, { "type": "integer" }] });
        let positions: Vec<_> = provider.array_items(&modern).into_iter().map(|(i, _)| i).collect();
        assert_eq!(positions, vec![Some(0), Some(1)]);

        let draft7 = json!({ "type": "array", "items": [{ "type": "string" }], "additionalItems": { "type": "null" } });
        let positions: Vec<_> = provider.array_items(&draft7).into_iter().map(|(i, _)| i).collect();
        assert_eq!(positions, vec![Some(0), None]);

        let list = json!({ "type": "array", "items": { "type": "string" } });
        assert_eq!(provider.array_items(&list).len(), 1);
        assert!(provider.array_items(&json!({ "type": "array" })).is_empty());
    }
}
