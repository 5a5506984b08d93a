use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use field_docs::{FieldType, VisitorContext};

/// `<name>.fields.json`: what walking `<name>.schema.json` must produce.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    /// Walk this local reference instead of the document root.
    #[serde(default)]
    pub reference: Option<String>,
    /// Exact mapping, in walk order.
    pub fields: IndexMap<String, FieldType>,
    /// Paths that must be flagged optional; every other path must not be.
    #[serde(default)]
    pub optional: Vec<String>,
}

impl Expectation {
    /// Every mismatch between the walk result and this expectation.
    pub fn mismatches(&self, actual: &VisitorContext) -> Vec<String> {
        let mut out = Vec::new();
        let actual_types = actual.field_types();
        if !actual_types.iter().eq(self.fields.iter()) {
            for (path, want) in &self.fields {
                match actual_types.get(path) {
                    None => out.push(format!("missing `{path}` ({want})")),
                    Some(got) if got != want => out.push(format!("`{path}`: expected {want}, got {got}")),
                    Some(_) => {}
                }
            }
            for path in actual_types.keys().filter(|p| !self.fields.contains_key(*p)) {
                out.push(format!("unexpected `{path}`"));
            }
            let want_order: Vec<_> = self.fields.keys().collect();
            let got_order: Vec<_> = actual_types.keys().collect();
            if out.is_empty() && want_order != got_order {
                out.push(format!("order differs: got {got_order:?}"));
            }
        }
        for entry in actual.entries() {
            let path = entry.info.path();
            let want_optional = self.optional.iter().any(|p| p == path);
            if entry.info.is_optional() != want_optional {
                out.push(format!("`{path}`: optional should be {want_optional}"));
            }
        }
        out
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> anyhow::Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        anyhow::anyhow!("at JSON path {path} → {}", err.into_inner())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoding_errors_name_the_path() {
        let err = from_str_with_path::<Expectation>(r#"{ "fields": { "id": "INTEGER" } }"#).unwrap_err();
        assert!(err.to_string().contains("fields.id"), "{err}");
    }

    #[test]
    fn reports_missing_unexpected_and_optional_mismatches() {
        let actual = field_docs::document_schema(&serde_json::json!({
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": { "type": "integer" },
                "note": { "type": "string" }
            }
        })).unwrap();
        let expectation: Expectation = from_str_with_path(r#"{
            "fields": { "id": "STRING", "missing": "BOOLEAN" },
            "optional": ["id"]
        }"#).unwrap();
        let mismatches = expectation.mismatches(&actual);
        assert_eq!(mismatches, vec![
            "`id`: expected string, got number",
            "missing `missing` (boolean)",
            "unexpected `note`",
            "`id`: optional should be true",
            "`note`: optional should be false",
        ]);
    }
}
