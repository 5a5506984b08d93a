use thiserror::Error;

/// Failures raised while introspecting a schema. Visitors pass these through untouched.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("unresolved schema reference `{0}`")]
    UnresolvedReference(String),
    #[error("external schema reference `{0}` is not supported")]
    ExternalReference(String),
    #[error("unknown definition `{0}`")]
    UnknownDefinition(String),
    #[error("reference `{0}` never reaches a schema")]
    ReferenceLoop(String),
    #[error("malformed schema: {0}")]
    Malformed(String),
    #[error("schema nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),
}

pub(crate) fn malformed(reason: impl Into<String>) -> WalkError {
    WalkError::Malformed(reason.into())
}
