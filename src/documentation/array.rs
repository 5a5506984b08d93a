use crate::context::VisitorContext;
use crate::engine::{ArrayFormatVisitor, ItemsHandler, SchemaProvider, WalkError};
use crate::field_info::element_path;

use super::FieldDocumentationVisitor;

/// Visits element schemas at `path[]`. The element itself has no field info,
/// so only its children end up in the context.
pub struct FieldDocumentationArrayVisitor<'c> {
    provider: Option<SchemaProvider>,
    context: &'c mut VisitorContext,
    path: String,
}

impl<'c> FieldDocumentationArrayVisitor<'c> {
    pub(crate) fn new(provider: Option<SchemaProvider>, context: &'c mut VisitorContext, path: String) -> Self {
        Self { provider, context, path }
    }
}

impl ArrayFormatVisitor for FieldDocumentationArrayVisitor<'_> {
    fn items_format(&mut self, items: &ItemsHandler<'_>) -> Result<(), WalkError> {
        let mut element = FieldDocumentationVisitor::nested(
            self.provider.clone(),
            &mut *self.context,
            element_path(&self.path),
            None,
        );
        items.accept_format_visitor(&mut element)
    }
}
