//! Documentation-facing JSON classification of a single field.
use std::fmt;
use serde::{Deserialize, Serialize};

/// JSON type shown in a field documentation table.
///
/// Maps fold into `Object`; integers fold into `Number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
    /// Any JSON value (untyped, or a union the table cannot name).
    Varies,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object  => "object",
            Self::Array   => "array",
            Self::String  => "string",
            Self::Number  => "number",
            Self::Boolean => "boolean",
            Self::Null    => "null",
            Self::Varies  => "varies",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_screaming_and_displays_lowercase() {
        let json = serde_json::to_string(&FieldType::Varies).unwrap();
        assert_eq!(json, "\"VARIES\"");
        assert_eq!(FieldType::Boolean.to_string(), "boolean");
        let back: FieldType = serde_json::from_str("\"NUMBER\"").unwrap();
        assert_eq!(back, FieldType::Number);
    }
}
