//! Model (DTO) converter.

use tracing::debug;

use super::{Category, ComplexTypeConverter, ConversionContext};
use crate::descriptor::{HasMarkers, MarkerKind, TypeDescriptor};
use crate::nullability::NullableTypeStrategy;
use crate::target::{DeclBody, InterfaceDecl, Property, TargetTypeRef};

/// Converts model classes and interfaces into TypeScript interfaces.
///
/// A class without own fields whose only supertype maps to an array or a
/// dictionary (`class Tags extends ArrayList<String>`) becomes a type alias.
#[derive(Debug, Default, Clone)]
pub struct ModelConverter {
    include_ignored: bool,
}

impl ModelConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep fields carrying the JSON-ignore marker.
    pub fn with_ignored_fields(mut self, include: bool) -> Self {
        self.include_ignored = include;
        self
    }
}

impl ComplexTypeConverter for ModelConverter {
    fn category(&self) -> Category {
        Category::Model
    }

    fn pre_convert(&self, ctx: &mut ConversionContext<'_>, descriptor: &TypeDescriptor) -> bool {
        matches!(
            ctx.register(descriptor, DeclBody::empty_interface()),
            Some((_, true))
        )
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        descriptor: &TypeDescriptor,
        nullable: &dyn NullableTypeStrategy,
    ) {
        let Some(id) = ctx.lookup(&descriptor.name) else {
            return;
        };
        if ctx.table().is_populated(id) {
            return;
        }
        debug!(type_name = %descriptor.name, "converting model type");

        let supertypes: Vec<TargetTypeRef> =
            descriptor.supertypes().map(|s| ctx.map_type(s)).collect();

        if descriptor.fields.is_empty() {
            if let [single] = supertypes.as_slice() {
                if matches!(single, TargetTypeRef::Array(_) | TargetTypeRef::Dictionary(_)) {
                    ctx.populate(
                        id,
                        DeclBody::Alias {
                            type_params: descriptor.type_params.clone(),
                            target: single.clone(),
                        },
                    );
                    return;
                }
            }
        }

        let mut extends = Vec::new();
        for supertype in supertypes {
            if supertype.is_extendable() {
                extends.push(supertype);
            } else {
                debug!(type_name = %descriptor.name, "dropping non-interface supertype {supertype:?}");
            }
        }

        let mut properties = Vec::new();
        for field in &descriptor.fields {
            if !self.include_ignored && field.has_marker(&MarkerKind::JsonIgnore) {
                continue;
            }
            let mut property = Property::new(&field.name, ctx.map_type(&field.ty));
            nullable.apply(&field.ty, &field.markers, &mut property.nullable);
            properties.push(property);
        }

        ctx.populate(
            id,
            DeclBody::Interface(InterfaceDecl {
                type_params: descriptor.type_params.clone(),
                extends,
                properties,
                methods: Vec::new(),
            }),
        );
    }
}
