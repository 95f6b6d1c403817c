//! Nullability inference for converted members.

use serde::{Deserialize, Serialize};

use crate::descriptor::{Marker, TypeRef, well_known};
use crate::target::Nullable;

/// Decides whether a member may be absent on the target side.
pub trait NullableTypeStrategy {
    /// Inference for a member's declared type and metadata.
    fn is_nullable(&self, declared: &TypeRef, markers: &[Marker]) -> bool;

    /// Raise `nullable` when the member is inferred nullable.
    ///
    /// A member already marked nullable is not evaluated again and never
    /// lowered.
    fn apply(&self, declared: &TypeRef, markers: &[Marker], nullable: &mut Nullable) {
        if !nullable.is_set() && self.is_nullable(declared, markers) {
            nullable.mark();
        }
    }
}

/// Optional wrapper, explicit marker, boxed number, boxed boolean; in that order.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNullableTypeStrategy;

impl NullableTypeStrategy for DefaultNullableTypeStrategy {
    fn is_nullable(&self, declared: &TypeRef, markers: &[Marker]) -> bool {
        if declared.is_optional_wrapper() {
            return true;
        }
        if markers.iter().any(|m| matches!(m, Marker::Nullable)) {
            return true;
        }
        match declared {
            TypeRef::Named { name, .. } => {
                well_known::is_boxed_number(name) || name == well_known::BOOLEAN
            }
            _ => false,
        }
    }
}

/// Only the optional wrapper or an explicit marker make a member nullable.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerOnlyNullableStrategy;

impl NullableTypeStrategy for MarkerOnlyNullableStrategy {
    fn is_nullable(&self, declared: &TypeRef, markers: &[Marker]) -> bool {
        declared.is_optional_wrapper() || markers.iter().any(|m| matches!(m, Marker::Nullable))
    }
}

/// Strategy selection in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullableStrategyKind {
    #[default]
    Default,
    MarkerOnly,
}

impl NullableStrategyKind {
    pub fn build(self) -> Box<dyn NullableTypeStrategy> {
        match self {
            NullableStrategyKind::Default => Box::new(DefaultNullableTypeStrategy),
            NullableStrategyKind::MarkerOnly => Box::new(MarkerOnlyNullableStrategy),
        }
    }
}
