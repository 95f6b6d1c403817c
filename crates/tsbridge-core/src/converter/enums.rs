//! Built-in enum converter.

use tracing::debug;

use super::{Category, ComplexTypeConverter, ConversionContext};
use crate::descriptor::TypeDescriptor;
use crate::nullability::NullableTypeStrategy;
use crate::target::{DeclBody, EnumDecl};

/// Converts source enums into string-valued TypeScript enums.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumConverter;

impl ComplexTypeConverter for EnumConverter {
    fn category(&self) -> Category {
        Category::Enum
    }

    fn pre_convert(&self, ctx: &mut ConversionContext<'_>, descriptor: &TypeDescriptor) -> bool {
        matches!(
            ctx.register(descriptor, DeclBody::empty_enum()),
            Some((_, true))
        )
    }

    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        descriptor: &TypeDescriptor,
        _nullable: &dyn NullableTypeStrategy,
    ) {
        let Some(id) = ctx.lookup(&descriptor.name) else {
            return;
        };
        debug!(type_name = %descriptor.name, constants = descriptor.constants.len(), "converting enum");
        ctx.populate(
            id,
            DeclBody::Enum(EnumDecl {
                members: descriptor.constants.clone(),
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::converter::TypeIndex;
    use crate::mapper::TypeMapper;
    use crate::module::DepthModuleConverter;
    use crate::nullability::DefaultNullableTypeStrategy;

    #[test]
    fn EnumConverter___two_phases___populates_constants_in_order() {
        let index = TypeIndex::default();
        let mapper = TypeMapper::new();
        let mut ctx = ConversionContext::new(&index, &mapper, Box::new(DepthModuleConverter::new(1)));
        let color = TypeDescriptor::enumeration("app.enums.Color", &["RED", "GREEN"]);
        let converter = EnumConverter;

        assert!(converter.pre_convert(&mut ctx, &color));
        assert!(!converter.pre_convert(&mut ctx, &color));
        converter.convert(&mut ctx, &color, &DefaultNullableTypeStrategy);

        let id = ctx.lookup("app.enums.Color").unwrap();
        assert_eq!(
            ctx.table().get(id).body,
            DeclBody::Enum(EnumDecl {
                members: vec!["RED".into(), "GREEN".into()]
            })
        );
    }
}
