use std::sync::Arc;
use serde_json::Value;

use super::error::WalkError;
use super::protocol::FormatVisitor;
use super::walk::Walk;

const DEFINITION_CONTAINERS: [&str; 2] = ["$defs", "definitions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOptions {
    /// Maximum number of nested schema nodes on one walk path.
    pub max_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Handle on the root schema document: resolves `$ref`s and starts walks.
///
/// Cloning is cheap; the document is shared.
#[derive(Debug, Clone)]
pub struct SchemaProvider {
    root: Arc<Value>,
    options: WalkOptions,
}

impl SchemaProvider {
    pub fn from_root(root: Value) -> Self {
        Self { root: Arc::new(root), options: WalkOptions::default() }
    }

    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Value { &self.root }
    pub fn options(&self) -> WalkOptions { self.options }

    /// `(name, schema)` of every entry under `$defs` and `definitions`.
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &Value)> {
        DEFINITION_CONTAINERS.iter()
            .filter_map(move |key| self.root.get(*key).and_then(Value::as_object))
            .flat_map(|defs| defs.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Local reference pointing at the named definition.
    pub fn definition_reference(&self, name: &str) -> Option<String> {
        DEFINITION_CONTAINERS.iter()
            .find(|key| {
                self.root.get(**key)
                    .and_then(Value::as_object)
                    .is_some_and(|defs| defs.contains_key(name))
            })
            .map(|key| format!("#/{key}/{}", escape_pointer_token(name)))
    }

    /// Resolve a document-local `$ref` (`#` or `#/json/pointer`).
    pub fn resolve(&self, reference: &str) -> Result<&Value, WalkError> {
        let Some(pointer) = reference.strip_prefix('#') else {
            return Err(WalkError::ExternalReference(reference.to_string()));
        };
        if pointer.is_empty() {
            return Ok(&self.root);
        }
        self.root
            .pointer(pointer)
            .ok_or_else(|| WalkError::UnresolvedReference(reference.to_string()))
    }

    // ————————————————————————————————————————————————————————————————————————
    // WALK ENTRY POINTS
    // ————————————————————————————————————————————————————————————————————————

    /// Walk the whole document into `visitor`.
    pub fn accept_format_visitor(&self, visitor: &mut dyn FormatVisitor) -> Result<(), WalkError> {
        self.accept_reference("#", visitor)
    }

    /// Walk the node a local reference points at, e.g. `#/components/schemas/Order`.
    pub fn accept_reference(&self, reference: &str, visitor: &mut dyn FormatVisitor) -> Result<(), WalkError> {
        tracing::debug!(reference, "starting schema walk");
        let walk = Walk::new(self.clone());
        walk.visit_reference(reference, visitor)
    }

    /// Walk one named definition.
    pub fn accept_definition(&self, name: &str, visitor: &mut dyn FormatVisitor) -> Result<(), WalkError> {
        let reference = self.definition_reference(name)
            .ok_or_else(|| WalkError::UnknownDefinition(name.to_string()))?;
        self.accept_reference(&reference, visitor)
    }
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}
