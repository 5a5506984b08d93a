//! Append-only accumulator shared by every visitor of one walk.
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

use crate::field_info::FieldInfo;
use crate::field_type::FieldType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEntry {
    #[serde(flatten)]
    pub info: FieldInfo,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Field path → classification, in the order the walk reported them.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct VisitorContext {
    fields: IndexMap<String, FieldEntry>,
}

impl VisitorContext {
    pub fn new() -> Self { Self::default() }

    /// Record one field. A path is stored once: a repeat with the same type is
    /// ignored, a repeat with another type widens the entry to `Varies`.
    pub fn add_field(&mut self, info: &FieldInfo, field_type: FieldType) {
        match self.fields.entry(info.path().to_string()) {
            Entry::Vacant(slot) => {
                tracing::trace!(path = info.path(), %field_type, "field recorded");
                slot.insert(FieldEntry { info: info.clone(), field_type });
            }
            Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                if entry.field_type != field_type && entry.field_type != FieldType::Varies {
                    tracing::debug!(
                        path = info.path(),
                        was = %entry.field_type,
                        now = %field_type,
                        "conflicting field types, widening to varies"
                    );
                    entry.field_type = FieldType::Varies;
                }
            }
        }
    }

    pub fn field_type(&self, path: &str) -> Option<FieldType> {
        self.fields.get(path).map(|e| e.field_type)
    }

    pub fn entry(&self, path: &str) -> Option<&FieldEntry> {
        self.fields.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &FieldEntry> {
        self.fields.values()
    }

    /// The finished mapping handed to the documentation renderer.
    pub fn field_types(&self) -> IndexMap<String, FieldType> {
        self.fields.iter().map(|(k, e)| (k.clone(), e.field_type)).collect()
    }

    pub fn len(&self) -> usize { self.fields.len() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut ctx = VisitorContext::new();
        ctx.add_field(&FieldInfo::new("b", "b"), FieldType::String);
        ctx.add_field(&FieldInfo::new("a", "a"), FieldType::Number);
        let paths: Vec<_> = ctx.field_types().into_keys().collect();
        assert_eq!(paths, vec!["b", "a"]);
    }

    #[test]
    fn repeated_path_is_stored_once() {
        let mut ctx = VisitorContext::new();
        let info = FieldInfo::new("pair[].x", "x");
        ctx.add_field(&info, FieldType::Number);
        ctx.add_field(&info, FieldType::Number);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.field_type("pair[].x"), Some(FieldType::Number));

        ctx.add_field(&info, FieldType::String);
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.field_type("pair[].x"), Some(FieldType::Varies));

        ctx.add_field(&info, FieldType::Boolean);
        assert_eq!(ctx.field_type("pair[].x"), Some(FieldType::Varies));
    }

    #[test]
    fn entries_serialize_flat() {
        let mut ctx = VisitorContext::new();
        let info = FieldInfo::new("note", "note").optional(true).described(Some("Free text"));
        ctx.add_field(&info, FieldType::String);
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json, serde_json::json!({
            "note": {
                "path": "note",
                "name": "note",
                "optional": true,
                "description": "Free text",
                "type": "STRING"
            }
        }));
    }
}
