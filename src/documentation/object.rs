use crate::context::VisitorContext;
use crate::engine::{ObjectFormatVisitor, PropertyWriter, SchemaProvider, WalkError};
use crate::field_info::{child_path, FieldInfo};

use super::FieldDocumentationVisitor;

/// Visits the properties of one object, one child visitor per property.
pub struct FieldDocumentationObjectVisitor<'c> {
    provider: Option<SchemaProvider>,
    type_name: Option<String>,
    context: &'c mut VisitorContext,
    path: String,
}

impl<'c> FieldDocumentationObjectVisitor<'c> {
    pub(crate) fn new(
        provider: Option<SchemaProvider>,
        type_name: Option<String>,
        context: &'c mut VisitorContext,
        path: String,
    ) -> Self {
        Self { provider, type_name, context, path }
    }
}

impl ObjectFormatVisitor for FieldDocumentationObjectVisitor<'_> {
    fn property(&mut self, writer: &PropertyWriter<'_>) -> Result<(), WalkError> {
        let path = child_path(&self.path, writer.name());
        let info = FieldInfo::new(path.clone(), writer.name())
            .declared_in(self.type_name.clone())
            .optional(!writer.is_required() || writer.is_nullable())
            .described(writer.description());
        let mut child = FieldDocumentationVisitor::nested(
            self.provider.clone(),
            &mut *self.context,
            path,
            Some(info),
        );
        writer.accept_format_visitor(&mut child)
    }
}
