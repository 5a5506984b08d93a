//! Field-type classifying visitor.
//!
//! Every `expect_*_format` call records the current field (if it has one) with
//! its [`FieldType`] and hands back the visitor for the node's shape. The root
//! node and array elements carry no [`FieldInfo`] and are never recorded.
pub mod array;
pub mod object;

use crate::context::VisitorContext;
use crate::engine::{
    ArrayFormatVisitor, FormatVisitor, MapFormatVisitor, Noop, ObjectFormatVisitor,
    ScalarFormatVisitor, SchemaProvider, TypeDescriptor, WalkError,
};
use crate::field_info::FieldInfo;
use crate::field_type::FieldType;

pub use array::FieldDocumentationArrayVisitor;
pub use object::FieldDocumentationObjectVisitor;

enum ContextSlot<'c> {
    Owned(VisitorContext),
    Shared(&'c mut VisitorContext),
}

impl ContextSlot<'_> {
    fn get(&self) -> &VisitorContext {
        match self {
            Self::Owned(context) => context,
            Self::Shared(context) => context,
        }
    }
    fn get_mut(&mut self) -> &mut VisitorContext {
        match self {
            Self::Owned(context) => context,
            Self::Shared(context) => context,
        }
    }
}

pub struct FieldDocumentationVisitor<'c> {
    provider: Option<SchemaProvider>,
    context: ContextSlot<'c>,
    path: String,
    field_info: Option<FieldInfo>,
}

impl FieldDocumentationVisitor<'static> {
    /// Root visitor with a fresh, empty context.
    pub fn create() -> Self {
        Self {
            provider: None,
            context: ContextSlot::Owned(VisitorContext::new()),
            path: String::new(),
            field_info: None,
        }
    }
}

impl<'c> FieldDocumentationVisitor<'c> {
    pub(crate) fn nested(
        provider: Option<SchemaProvider>,
        context: &'c mut VisitorContext,
        path: String,
        field_info: Option<FieldInfo>,
    ) -> Self {
        Self { provider, context: ContextSlot::Shared(context), path, field_info }
    }

    pub fn context(&self) -> &VisitorContext {
        self.context.get()
    }

    pub fn into_context(self) -> VisitorContext {
        match self.context {
            ContextSlot::Owned(context) => context,
            ContextSlot::Shared(context) => context.clone(),
        }
    }

    fn add_field_if_present(&mut self, field_type: FieldType) {
        if let Some(info) = &self.field_info {
            self.context.get_mut().add_field(info, field_type);
        }
    }

    fn leaf(&mut self, field_type: FieldType) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError> {
        self.add_field_if_present(field_type);
        Ok(Box::new(Noop))
    }
}

impl FormatVisitor for FieldDocumentationVisitor<'_> {
    fn provider(&self) -> Option<&SchemaProvider> {
        self.provider.as_ref()
    }

    fn set_provider(&mut self, provider: SchemaProvider) {
        self.provider = Some(provider);
    }

    fn expect_object_format(&mut self, ty: &TypeDescriptor<'_>) -> Result<Box<dyn ObjectFormatVisitor + '_>, WalkError> {
        self.add_field_if_present(FieldType::Object);
        let (provider, path) = (self.provider.clone(), self.path.clone());
        Ok(Box::new(FieldDocumentationObjectVisitor::new(
            provider,
            ty.name().map(str::to_owned),
            self.context.get_mut(),
            path,
        )))
    }

    fn expect_array_format(&mut self, _ty: &TypeDescriptor<'_>) -> Result<Box<dyn ArrayFormatVisitor + '_>, WalkError> {
        self.add_field_if_present(FieldType::Array);
        let (provider, path) = (self.provider.clone(), self.path.clone());
        Ok(Box::new(FieldDocumentationArrayVisitor::new(provider, self.context.get_mut(), path)))
    }

    fn expect_string_format(&mut self, _ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError> {
        self.leaf(FieldType::String)
    }

    fn expect_number_format(&mut self, _ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError> {
        self.leaf(FieldType::Number)
    }

    fn expect_integer_format(&mut self, _ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError> {
        self.leaf(FieldType::Number)
    }

    fn expect_boolean_format(&mut self, _ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError> {
        self.leaf(FieldType::Boolean)
    }

    fn expect_null_format(&mut self, _ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError> {
        self.leaf(FieldType::Null)
    }

    fn expect_any_format(&mut self, _ty: &TypeDescriptor<'_>) -> Result<Box<dyn ScalarFormatVisitor + '_>, WalkError> {
        self.leaf(FieldType::Varies)
    }

    // maps are documented as plain objects; their entries are not expanded
    fn expect_map_format(&mut self, _ty: &TypeDescriptor<'_>) -> Result<Box<dyn MapFormatVisitor + '_>, WalkError> {
        self.add_field_if_present(FieldType::Object);
        Ok(Box::new(Noop))
    }
}
