//! API-surface (REST controller) converter.

use tracing::debug;

use super::{Category, ComplexTypeConverter, ConversionContext};
use crate::descriptor::{HasMarkers, Marker, Method, TypeDescriptor};
use crate::nullability::NullableTypeStrategy;
use crate::target::{DeclBody, InterfaceDecl, MethodSignature, Property, TargetTypeRef};

/// Converts controllers into interfaces of endpoint signatures.
///
/// Every method carrying a request mapping becomes
/// `name(params): Wrapper<Result>`, documented with its HTTP method and the
/// full path (type-level prefix joined with the method path).
#[derive(Debug, Clone)]
pub struct RestConverter {
    response_wrapper: TargetTypeRef,
}

impl Default for RestConverter {
    fn default() -> Self {
        Self {
            response_wrapper: TargetTypeRef::Global("Promise".to_string()),
        }
    }
}

impl RestConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap results in another generic type, e.g. `Observable` from `rxjs`.
    pub fn with_response_wrapper(mut self, wrapper: TargetTypeRef) -> Self {
        self.response_wrapper = wrapper;
        self
    }

    fn convert_method(
        &self,
        ctx: &mut ConversionContext<'_>,
        prefix: &str,
        method: &Method,
        nullable: &dyn NullableTypeStrategy,
    ) -> MethodSignature {
        let mut params = Vec::with_capacity(method.params.len());
        for param in &method.params {
            let mut property = Property::new(&param.name, ctx.map_type(&param.ty));
            let optional_query = param
                .markers
                .iter()
                .any(|m| matches!(m, Marker::RequestParam { required: false, .. }));
            if optional_query {
                property.nullable.mark();
            }
            nullable.apply(&param.ty, &param.markers, &mut property.nullable);
            params.push(property);
        }

        let result = ctx.map_type(&method.returns);
        let returns = TargetTypeRef::generic(self.response_wrapper.clone(), vec![result]);

        let (path, http_method) = method.request_mapping().unwrap_or(("", None));
        let verb = http_method.map_or_else(|| "ANY".to_string(), |m| m.to_string());
        MethodSignature {
            name: method.name.clone(),
            params,
            returns,
            docs: vec![format!("{verb} {}", join_path(prefix, path))],
        }
    }
}

/// Join a type-level path prefix and a method path.
pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    let joined = match (prefix.is_empty(), path.is_empty()) {
        (true, true) => String::new(),
        (false, true) => prefix.to_string(),
        (true, false) => path.to_string(),
        (false, false) => format!("{prefix}/{path}"),
    };
    if joined.starts_with('/') {
        joined
    } else {
        format!("/{joined}")
    }
}

impl ComplexTypeConverter for RestConverter {
    fn category(&self) -> Category {
        Category::Rest
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
        let prefix = descriptor
            .request_mapping()
            .map(|(path, _)| path)
            .unwrap_or_default();

        let extends: Vec<TargetTypeRef> = descriptor
            .supertypes()
            .map(|s| ctx.map_type(s))
            .filter(TargetTypeRef::is_extendable)
            .collect();

        let methods: Vec<MethodSignature> = descriptor
            .endpoints()
            .map(|m| self.convert_method(ctx, prefix, m, nullable))
            .collect();
        debug!(type_name = %descriptor.name, endpoints = methods.len(), "converting rest type");

        ctx.populate(
            id,
            DeclBody::Interface(InterfaceDecl {
                type_params: descriptor.type_params.clone(),
                extends,
                properties: Vec::new(),
                methods,
            }),
        );
    }
}
