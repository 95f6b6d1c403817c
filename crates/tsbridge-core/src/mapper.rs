//! Custom type mapping registry and built-in structural mappings.
//!
//! The registry is populated once, before conversion starts, and is then only
//! read: the generator hands converters a shared reference to it.

use std::collections::BTreeMap;

use crate::descriptor::well_known;
use crate::target::{TargetTypeRef, TsPrimitive};

/// Structural mapping of well-known library types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMapping {
    Primitive(TsPrimitive),
    /// Ambient global type such as `Date`
    Global(&'static str),
    /// Optional wrapper, mapped to its element type
    Optional,
    /// Collection, mapped to an array of its element type
    Collection,
    /// Map, mapped to a string-keyed dictionary of its value type
    Map,
}

/// Look up the built-in mapping of a source identity.
pub fn builtin(identity: &str) -> Option<BuiltinMapping> {
    if well_known::is_boxed_number(identity) {
        return Some(BuiltinMapping::Primitive(TsPrimitive::Number));
    }
    if well_known::DATE_TIMES.contains(&identity) {
        return Some(BuiltinMapping::Global("Date"));
    }
    if well_known::COLLECTIONS.contains(&identity) {
        return Some(BuiltinMapping::Collection);
    }
    if well_known::MAPS.contains(&identity) {
        return Some(BuiltinMapping::Map);
    }
    match identity {
        well_known::STRING | well_known::CHARACTER | well_known::UUID => {
            Some(BuiltinMapping::Primitive(TsPrimitive::String))
        }
        well_known::BOOLEAN => Some(BuiltinMapping::Primitive(TsPrimitive::Boolean)),
        well_known::OBJECT => Some(BuiltinMapping::Primitive(TsPrimitive::Any)),
        well_known::VOID => Some(BuiltinMapping::Primitive(TsPrimitive::Void)),
        well_known::OPTIONAL => Some(BuiltinMapping::Optional),
        _ => None,
    }
}

/// Registry of fixed substitutions from source identities to target types.
///
/// A registered identity never gets a generated declaration; every reference
/// to it resolves to the registered target.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    custom: BTreeMap<String, TargetTypeRef>,
}

impl TypeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapping. A later registration for the same identity replaces
    /// the earlier one.
    pub fn register(&mut self, identity: impl Into<String>, target: TargetTypeRef) {
        self.custom.insert(identity.into(), target);
    }

    pub fn resolve(&self, identity: &str) -> Option<&TargetTypeRef> {
        self.custom.get(identity)
    }

    /// Whether references to `identity` never need a generated declaration.
    pub fn is_mapped(&self, identity: &str) -> bool {
        self.custom.contains_key(identity) || builtin(identity).is_some()
    }

    pub fn len(&self) -> usize {
        self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }
}

impl FromIterator<(String, TargetTypeRef)> for TypeMapper {
    fn from_iter<I: IntoIterator<Item = (String, TargetTypeRef)>>(iter: I) -> Self {
        Self {
            custom: iter.into_iter().collect(),
        }
    }
}
