//! Type filters classifying discovered types.
//!
//! A generator with no explicit filter uses [`RejectAllFilter`], so nothing
//! is classified as a model or API-surface type until the caller opts in.
//! Filters compose with [`AndFilter`], [`OrFilter`] and [`NotFilter`], and
//! can be described declaratively with [`FilterSpec`].

use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::descriptor::{HasMarkers, MarkerKind, TypeDescriptor};
use crate::error::{GeneratorError, GeneratorResult};

/// Predicate over type descriptors.
pub trait TypeFilter {
    fn accept(&self, descriptor: &TypeDescriptor) -> bool;

    /// Human-readable reason for the decision, for diagnostics only.
    fn explain(&self, descriptor: &TypeDescriptor) -> String;
}

fn verdict(accepted: bool) -> &'static str {
    if accepted { "accepted" } else { "rejected" }
}

/// Rejects everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct RejectAllFilter;

impl TypeFilter for RejectAllFilter {
    fn accept(&self, _descriptor: &TypeDescriptor) -> bool {
        false
    }

    fn explain(&self, descriptor: &TypeDescriptor) -> String {
        format!("RejectAll: {} rejected, no accept policy configured", descriptor.name)
    }
}

/// Accepts everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllFilter;

impl TypeFilter for AcceptAllFilter {
    fn accept(&self, _descriptor: &TypeDescriptor) -> bool {
        true
    }

    fn explain(&self, descriptor: &TypeDescriptor) -> String {
        format!("AcceptAll: {} accepted", descriptor.name)
    }
}

/// Accepts an explicit set of identities.
#[derive(Debug, Default, Clone)]
pub struct TypeSetFilter {
    names: BTreeSet<String>,
}

impl TypeSetFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl TypeFilter for TypeSetFilter {
    fn accept(&self, descriptor: &TypeDescriptor) -> bool {
        self.names.contains(&descriptor.name)
    }

    fn explain(&self, descriptor: &TypeDescriptor) -> String {
        let accepted = self.accept(descriptor);
        format!(
            "TypeSet: {} {} (set of {})",
            descriptor.name,
            verdict(accepted),
            self.names.len()
        )
    }
}

/// Accepts types carrying a marker.
#[derive(Debug, Clone)]
pub struct HasMarkerFilter {
    marker: MarkerKind,
}

impl HasMarkerFilter {
    pub fn new(marker: MarkerKind) -> Self {
        Self { marker }
    }
}

impl TypeFilter for HasMarkerFilter {
    fn accept(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.has_marker(&self.marker)
    }

    fn explain(&self, descriptor: &TypeDescriptor) -> String {
        let accepted = self.accept(descriptor);
        format!(
            "HasMarker({:?}): {} {}",
            self.marker,
            descriptor.name,
            verdict(accepted)
        )
    }
}

/// Accepts types with the given direct supertype.
#[derive(Debug, Clone)]
pub struct ExtendsFilter {
    base: String,
}

impl ExtendsFilter {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl TypeFilter for ExtendsFilter {
    fn accept(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.directly_extends(&self.base)
    }

    fn explain(&self, descriptor: &TypeDescriptor) -> String {
        let accepted = self.accept(descriptor);
        format!(
            "Extends({}): {} {}",
            self.base,
            descriptor.name,
            verdict(accepted)
        )
    }
}

/// Accepts types whose simple name contains a substring.
#[derive(Debug, Clone)]
pub struct NameContainsFilter {
    needle: String,
}

impl NameContainsFilter {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl TypeFilter for NameContainsFilter {
    fn accept(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor.simple_name().contains(&self.needle)
    }

    fn explain(&self, descriptor: &TypeDescriptor) -> String {
        let accepted = self.accept(descriptor);
        format!(
            "NameContains({:?}): {} {}",
            self.needle,
            descriptor.name,
            verdict(accepted)
        )
    }
}

/// Accepts types whose fully-qualified name matches a pattern.
#[derive(Debug, Clone)]
pub struct RegexFilter {
    pattern: Regex,
}

impl RegexFilter {
    pub fn new(pattern: &str) -> GeneratorResult<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| GeneratorError::InvalidFilter(format!("bad pattern {pattern:?}: {e}")))?;
        Ok(Self { pattern })
    }
}

impl TypeFilter for RegexFilter {
    fn accept(&self, descriptor: &TypeDescriptor) -> bool {
        self.pattern.is_match(&descriptor.name)
    }

    fn explain(&self, descriptor: &TypeDescriptor) -> String {
        let accepted = self.accept(descriptor);
        format!(
            "Regex({}): {} {}",
            self.pattern.as_str(),
            descriptor.name,
            verdict(accepted)
        )
    }
}

/// Accepts when every operand accepts. No operands rejects.
pub struct AndFilter {
    operands: Vec<Box<dyn TypeFilter>>,
}

impl AndFilter {
    pub fn new(operands: Vec<Box<dyn TypeFilter>>) -> Self {
        Self { operands }
    }
}

impl TypeFilter for AndFilter {
    fn accept(&self, descriptor: &TypeDescriptor) -> bool {
        !self.operands.is_empty() && self.operands.iter().all(|f| f.accept(descriptor))
    }

    fn explain(&self, descriptor: &TypeDescriptor) -> String {
        let parts: Vec<String> = self.operands.iter().map(|f| f.explain(descriptor)).collect();
        format!(
            "And[{}] => {}",
            parts.join("; "),
            verdict(self.accept(descriptor))
        )
    }
}

/// Accepts when any operand accepts.
pub struct OrFilter {
    operands: Vec<Box<dyn TypeFilter>>,
}

impl OrFilter {
    pub fn new(operands: Vec<Box<dyn TypeFilter>>) -> Self {
        Self { operands }
    }
}

impl TypeFilter for OrFilter {
    fn accept(&self, descriptor: &TypeDescriptor) -> bool {
        self.operands.iter().any(|f| f.accept(descriptor))
    }

    fn explain(&self, descriptor: &TypeDescriptor) -> String {
        let parts: Vec<String> = self.operands.iter().map(|f| f.explain(descriptor)).collect();
        format!(
            "Or[{}] => {}",
            parts.join("; "),
            verdict(self.accept(descriptor))
        )
    }
}

/// Inverts its operand.
pub struct NotFilter {
    operand: Box<dyn TypeFilter>,
}

impl NotFilter {
    pub fn new(operand: Box<dyn TypeFilter>) -> Self {
        Self { operand }
    }
}

impl TypeFilter for NotFilter {
    fn accept(&self, descriptor: &TypeDescriptor) -> bool {
        !self.operand.accept(descriptor)
    }

    fn explain(&self, descriptor: &TypeDescriptor) -> String {
        format!(
            "Not[{}] => {}",
            self.operand.explain(descriptor),
            verdict(self.accept(descriptor))
        )
    }
}

/// Declarative filter description, as written in `tsbridge.toml`.
///
/// ```toml
/// [model_filter]
/// type = "and"
/// filters = [
///     { type = "regex", pattern = "^app\\.model\\." },
///     { type = "not", filter = { type = "name_contains", text = "Internal" } },
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterSpec {
    #[default]
    RejectAll,
    AcceptAll,
    TypeSet {
        names: Vec<String>,
    },
    HasMarker {
        marker: MarkerKind,
    },
    Extends {
        base: String,
    },
    NameContains {
        text: String,
    },
    Regex {
        pattern: String,
    },
    And {
        filters: Vec<FilterSpec>,
    },
    Or {
        filters: Vec<FilterSpec>,
    },
    Not {
        filter: Box<FilterSpec>,
    },
}

impl FilterSpec {
    pub fn build(&self) -> GeneratorResult<Box<dyn TypeFilter>> {
        Ok(match self {
            FilterSpec::RejectAll => Box::new(RejectAllFilter),
            FilterSpec::AcceptAll => Box::new(AcceptAllFilter),
            FilterSpec::TypeSet { names } => Box::new(TypeSetFilter::new(names.iter().cloned())),
            FilterSpec::HasMarker { marker } => Box::new(HasMarkerFilter::new(marker.clone())),
            FilterSpec::Extends { base } => Box::new(ExtendsFilter::new(base.clone())),
            FilterSpec::NameContains { text } => Box::new(NameContainsFilter::new(text.clone())),
            FilterSpec::Regex { pattern } => Box::new(RegexFilter::new(pattern)?),
            FilterSpec::And { filters } => Box::new(AndFilter::new(Self::build_all(filters)?)),
            FilterSpec::Or { filters } => Box::new(OrFilter::new(Self::build_all(filters)?)),
            FilterSpec::Not { filter } => Box::new(NotFilter::new(filter.build()?)),
        })
    }

    fn build_all(specs: &[FilterSpec]) -> GeneratorResult<Vec<Box<dyn TypeFilter>>> {
        specs.iter().map(FilterSpec::build).collect()
    }
}

#[cfg(test)]
#[path = "filter/filter_tests.rs"]
mod filter_tests;
