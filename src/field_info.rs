//! Field identity: the dot/bracket-qualified path plus what the table shows next to it.
//!
//! Path grammar:
//! - child `name` of the root is `name`, of `p` is `p.name`
//! - names that aren't plain identifiers use bracket form: `p['a.b']`
//! - array elements append `[]`, so `items[].sku`
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static PLAIN_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^.\[\]'\s]+$").unwrap()
});

// ————————————————————————————————————————————————————————————————————————————
// PATHS
// ————————————————————————————————————————————————————————————————————————————

pub fn child_path(parent: &str, name: &str) -> String {
    if PLAIN_SEGMENT.is_match(name) {
        if parent.is_empty() {
            name.to_string()
        } else {
            format!("{parent}.{name}")
        }
    } else {
        let quoted = name.replace('\'', "\\'");
        format!("{parent}['{quoted}']")
    }
}

pub fn element_path(parent: &str) -> String {
    format!("{parent}[]")
}

// ————————————————————————————————————————————————————————————————————————————
// FIELD INFO
// ————————————————————————————————————————————————————————————————————————————

/// One documented field. Built once by the object visitor, never mutated after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    path: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    declaring_type: Option<String>,
    optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl FieldInfo {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            declaring_type: None,
            optional: false,
            description: None,
        }
    }
    pub fn declared_in(mut self, type_name: Option<String>) -> Self {
        self.declaring_type = type_name;
        self
    }
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
    pub fn described(mut self, description: Option<&str>) -> Self {
        self.description = description
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        self
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn name(&self) -> &str { &self.name }
    pub fn declaring_type(&self) -> Option<&str> { self.declaring_type.as_deref() }
    pub fn is_optional(&self) -> bool { self.optional }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
}
