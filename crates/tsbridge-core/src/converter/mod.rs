//! Two-phase conversion of source types into target declarations.
//!
//! Conversion of a category runs in two passes over all of its types:
//!
//! ```text
//! phase 1 (pre_convert)  every type  → empty shell registered by identity
//! phase 2 (convert)      every shell → members resolved and filled in
//! ```
//!
//! Because every shell exists before any member is resolved, a reference from
//! `A` to `B` and back from `B` to `A` resolves to two [`TypeId`]s without
//! recursion. A type referenced in phase 2 that no category claimed is
//! registered on demand and queued in the [`ConversionContext`]; the
//! generator drains that queue before moving on.
//!
//! [`TypeId`]: crate::target::TypeId

mod context;
mod enums;
mod model;
mod rest;

pub use context::{ConversionContext, TypeIndex};
pub use enums::EnumConverter;
pub use model::ModelConverter;
pub use rest::RestConverter;

use crate::descriptor::TypeDescriptor;
use crate::nullability::NullableTypeStrategy;

/// Classification category of a discovered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Enum,
    Model,
    Rest,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Enum => write!(f, "enum"),
            Category::Model => write!(f, "model"),
            Category::Rest => write!(f, "rest"),
        }
    }
}

/// Converter for one category of types.
pub trait ComplexTypeConverter {
    fn category(&self) -> Category;

    /// Phase 1: register an empty shell for `descriptor`.
    ///
    /// Returns `true` when the type was newly registered, `false` when it was
    /// already present or is covered by a custom mapping.
    fn pre_convert(&self, ctx: &mut ConversionContext<'_>, descriptor: &TypeDescriptor) -> bool;

    /// Phase 2: resolve members of a registered shell and populate it.
    fn convert(
        &self,
        ctx: &mut ConversionContext<'_>,
        descriptor: &TypeDescriptor,
        nullable: &dyn NullableTypeStrategy,
    );
}
