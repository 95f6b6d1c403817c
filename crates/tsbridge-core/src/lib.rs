//! tsbridge-core - Conversion of nominal class graphs into TypeScript modules
//!
//! This crate turns discovered source type descriptors into a tree of
//! TypeScript modules:
//! - [`TypeDiscovery`] collaborators supply [`TypeDescriptor`]s
//! - [`TypeFilter`]s classify them as model or API-surface types (enums always
//!   go to the enum category)
//! - [`ComplexTypeConverter`]s convert each category in two phases
//! - [`GeneratedModules`] renders and writes the resulting `.ts` files
//!
//! [`Generator`] wires the pipeline together; [`GeneratorConfig`] builds one
//! from `tsbridge.toml`.

mod config;
mod converter;
mod descriptor;
mod discovery;
mod emit;
mod error;
mod filter;
mod generator;
mod mapper;
mod module;
mod nullability;
mod target;

pub use config::{
    ConvertersConfig, CustomTypeSpec, GeneratorConfig, LOG_LEVELS, ModelConverterConfig,
    RestConverterConfig,
};
pub use converter::{
    Category, ComplexTypeConverter, ConversionContext, EnumConverter, ModelConverter,
    RestConverter, TypeIndex,
};
pub use descriptor::{
    Field, HasMarkers, HttpMethod, Marker, MarkerKind, Method, Parameter, PrimitiveType,
    TypeDescriptor, TypeKind, TypeRef, well_known,
};
pub use discovery::{
    Discovery, InMemoryDiscovery, LoadFailure, MANIFEST_FORMAT_VERSION, ManifestDiscovery,
    TypeDiscovery, in_namespaces,
};
pub use emit::{GeneratedModules, RenderedModule};
pub use error::{GeneratorError, GeneratorResult};
pub use filter::{
    AcceptAllFilter, AndFilter, ExtendsFilter, FilterSpec, HasMarkerFilter, NameContainsFilter,
    NotFilter, OrFilter, RegexFilter, RejectAllFilter, TypeFilter, TypeSetFilter,
};
pub use generator::{Classification, DEFAULT_PACKAGE_DEPTH, Generator};
pub use mapper::{BuiltinMapping, TypeMapper, builtin};
pub use module::{
    DepthModuleConverter, GLOBAL_MODULE, ModuleId, ModuleTree, PackageToModuleConverter,
    SingleModuleConverter, TargetModule,
};
pub use nullability::{
    DefaultNullableTypeStrategy, MarkerOnlyNullableStrategy, NullableStrategyKind,
    NullableTypeStrategy,
};
pub use target::{
    DeclBody, DeclState, EnumDecl, InterfaceDecl, MethodSignature, Nullable, Property,
    TargetDecl, TargetTypeRef, TsPrimitive, TypeId, TypeTable,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ComplexTypeConverter, GeneratedModules, Generator, GeneratorConfig, GeneratorError,
        GeneratorResult, InMemoryDiscovery, ManifestDiscovery, ModelConverter,
        NullableTypeStrategy, RestConverter, TargetTypeRef, TypeDescriptor, TypeDiscovery,
        TypeFilter, TypeRef,
    };
}
