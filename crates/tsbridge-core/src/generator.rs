//! Generation pipeline.
//!
//! ```text
//! discover → classify {enum, model, rest} → register custom mappings
//!          → explore rest types for reachable models → assign modules
//!          → convert enums → convert models → convert rest types
//! ```
//!
//! The run is single-pass and synchronous. It either returns the complete
//! [`GeneratedModules`] or fails before anything is written.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, info, warn};

use crate::converter::{
    Category, ComplexTypeConverter, ConversionContext, EnumConverter, TypeIndex,
};
use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::discovery::{Discovery, TypeDiscovery};
use crate::emit::GeneratedModules;
use crate::error::{GeneratorError, GeneratorResult};
use crate::filter::{RejectAllFilter, TypeFilter};
use crate::mapper::TypeMapper;
use crate::module::{DepthModuleConverter, PackageToModuleConverter};
use crate::nullability::{DefaultNullableTypeStrategy, NullableTypeStrategy};
use crate::target::TargetTypeRef;

/// Default number of namespace segments collapsed into a top-level module.
pub const DEFAULT_PACKAGE_DEPTH: usize = 2;

/// Identities of classified types, per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub enums: BTreeSet<String>,
    pub models: BTreeSet<String>,
    pub rests: BTreeSet<String>,
}

impl Classification {
    pub fn set(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Enum => &self.enums,
            Category::Model => &self.models,
            Category::Rest => &self.rests,
        }
    }

    /// Categories `identity` was classified into.
    pub fn categories_of(&self, identity: &str) -> Vec<Category> {
        [Category::Enum, Category::Model, Category::Rest]
            .into_iter()
            .filter(|c| self.set(*c).contains(identity))
            .collect()
    }

    pub fn is_classified(&self, identity: &str) -> bool {
        self.enums.contains(identity)
            || self.models.contains(identity)
            || self.rests.contains(identity)
    }
}

/// Configured generator. Consumed by [`Generator::generate`].
pub struct Generator {
    custom_type_mapping: BTreeMap<String, TargetTypeRef>,
    model_filter: Box<dyn TypeFilter>,
    rest_filter: Box<dyn TypeFilter>,
    nullable_strategy: Box<dyn NullableTypeStrategy>,
    module_converter: Box<dyn PackageToModuleConverter>,
    enum_converter: Box<dyn ComplexTypeConverter>,
    model_converter: Option<Box<dyn ComplexTypeConverter>>,
    rest_converter: Option<Box<dyn ComplexTypeConverter>>,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            custom_type_mapping: BTreeMap::new(),
            model_filter: Box::new(RejectAllFilter),
            rest_filter: Box::new(RejectAllFilter),
            nullable_strategy: Box::new(DefaultNullableTypeStrategy),
            module_converter: Box::new(DepthModuleConverter::new(DEFAULT_PACKAGE_DEPTH)),
            enum_converter: Box::new(EnumConverter),
            model_converter: None,
            rest_converter: None,
        }
    }
}

impl Generator {
    /// Generator that rejects every type and has only the enum converter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_filter(mut self, filter: impl TypeFilter + 'static) -> Self {
        self.model_filter = Box::new(filter);
        self
    }

    pub fn with_rest_filter(mut self, filter: impl TypeFilter + 'static) -> Self {
        self.rest_filter = Box::new(filter);
        self
    }

    pub fn with_boxed_filters(
        mut self,
        model_filter: Box<dyn TypeFilter>,
        rest_filter: Box<dyn TypeFilter>,
    ) -> Self {
        self.model_filter = model_filter;
        self.rest_filter = rest_filter;
        self
    }

    pub fn with_nullable_strategy(mut self, strategy: Box<dyn NullableTypeStrategy>) -> Self {
        self.nullable_strategy = strategy;
        self
    }

    pub fn with_module_converter(mut self, converter: Box<dyn PackageToModuleConverter>) -> Self {
        self.module_converter = converter;
        self
    }

    pub fn with_enum_converter(mut self, converter: impl ComplexTypeConverter + 'static) -> Self {
        self.enum_converter = Box::new(converter);
        self
    }

    pub fn with_model_converter(mut self, converter: impl ComplexTypeConverter + 'static) -> Self {
        self.model_converter = Some(Box::new(converter));
        self
    }

    pub fn with_rest_converter(mut self, converter: impl ComplexTypeConverter + 'static) -> Self {
        self.rest_converter = Some(Box::new(converter));
        self
    }

    pub fn with_custom_type(mut self, identity: impl Into<String>, target: TargetTypeRef) -> Self {
        self.custom_type_mapping.insert(identity.into(), target);
        self
    }

    pub fn custom_type_mapping_mut(&mut self) -> &mut BTreeMap<String, TargetTypeRef> {
        &mut self.custom_type_mapping
    }

    /// Split candidates into categories. Enums never reach the filters.
    pub fn classify<'d>(
        &self,
        candidates: impl IntoIterator<Item = &'d TypeDescriptor> + Clone,
    ) -> Classification {
        let mut classification = Classification::default();
        info!("Scanning model types");
        search_types(
            candidates.clone(),
            self.model_filter.as_ref(),
            &mut classification.models,
            &mut classification.enums,
        );
        info!("Scanning rest controller types");
        search_types(
            candidates,
            self.rest_filter.as_ref(),
            &mut classification.rests,
            &mut classification.enums,
        );
        classification
    }

    /// Filter explanations for a descriptor, for diagnostics.
    pub fn explain(&self, descriptor: &TypeDescriptor) -> Vec<(Category, String)> {
        if descriptor.is_enum() {
            return vec![(Category::Enum, format!("{} is an enum", descriptor.name))];
        }
        vec![
            (Category::Model, self.model_filter.explain(descriptor)),
            (Category::Rest, self.rest_filter.explain(descriptor)),
        ]
    }

    /// Run the whole pipeline over the types found by `discovery`.
    pub fn generate(
        self,
        discovery: &dyn TypeDiscovery,
        namespaces: &[String],
    ) -> GeneratorResult<GeneratedModules> {
        info!("Scanning namespaces: {}", namespaces.join(", "));
        let Discovery {
            candidates,
            references,
            failures,
        } = discovery.discover(namespaces)?;
        for failure in &failures {
            warn!(type_name = %failure.name, "Failed to load type: {}", failure.reason);
        }

        let candidate_names: Vec<String> = candidates.iter().map(|d| d.name.clone()).collect();
        let index = TypeIndex::new(candidates.into_iter().chain(references));
        let candidates: Vec<&TypeDescriptor> =
            candidate_names.iter().filter_map(|n| index.get(n)).collect();

        let mut classification = self.classify(candidates.iter().copied());
        let mapper = self.register_custom_type_mapping();

        self.explore_rest_types(&index, &mapper, &mut classification);
        explore_model_types(&index, &classification);
        info!(
            enums = classification.enums.len(),
            models = classification.models.len(),
            rests = classification.rests.len(),
            "Classification finished"
        );

        self.check_converters(&classification)?;

        let Generator {
            nullable_strategy,
            module_converter,
            enum_converter,
            model_converter,
            rest_converter,
            ..
        } = self;
        let converters = Converters {
            enums: enum_converter.as_ref(),
            models: model_converter.as_deref(),
            rests: rest_converter.as_deref(),
        };

        let mut ctx = ConversionContext::new(&index, &mapper, module_converter);
        for set in [
            &classification.enums,
            &classification.models,
            &classification.rests,
        ] {
            for name in set {
                if let Some(descriptor) = index.get(name) {
                    ctx.module_for(descriptor);
                }
            }
        }

        let nullable = nullable_strategy.as_ref();
        convert_types(
            &mut ctx,
            &classification.enums,
            converters.enums,
            &converters,
            nullable,
        )?;
        if let Some(models) = converters.models {
            if !classification.models.is_empty() {
                convert_types(&mut ctx, &classification.models, models, &converters, nullable)?;
            }
        }
        if let Some(rests) = converters.rests {
            if !classification.rests.is_empty() {
                convert_types(&mut ctx, &classification.rests, rests, &converters, nullable)?;
            }
        }

        let (tree, table) = ctx.into_output();
        info!(
            modules = tree.len(),
            declarations = table.len(),
            "Conversion finished"
        );
        Ok(GeneratedModules::new(tree, table))
    }

    fn register_custom_type_mapping(&self) -> TypeMapper {
        let mapper: TypeMapper = self
            .custom_type_mapping
            .iter()
            .map(|(identity, target)| (identity.clone(), target.clone()))
            .collect();
        debug!(custom_types = mapper.len(), "Registered custom type mapping");
        mapper
    }

    fn check_converters(&self, classification: &Classification) -> GeneratorResult<()> {
        if !classification.models.is_empty() && self.model_converter.is_none() {
            return Err(GeneratorError::MissingConverter {
                category: Category::Model,
            });
        }
        if !classification.rests.is_empty() && self.rest_converter.is_none() {
            return Err(GeneratorError::MissingConverter {
                category: Category::Rest,
            });
        }
        Ok(())
    }

    /// Pull every model type reachable from endpoint signatures into the
    /// model set, transitively through fields and supertypes.
    ///
    /// Supertypes of rest types join the rest set themselves, so a base
    /// controller without endpoints never needs the model converter.
    fn explore_rest_types(
        &self,
        index: &TypeIndex,
        mapper: &TypeMapper,
        classification: &mut Classification,
    ) {
        let mut bases: VecDeque<&TypeDescriptor> = classification
            .rests
            .iter()
            .filter_map(|name| index.get(name))
            .collect();
        let mut queue: VecDeque<&str> = VecDeque::new();

        while let Some(rest) = bases.pop_front() {
            queue.extend(rest.endpoint_references());
            for supertype in rest.supertypes() {
                let mut identities = supertype.named_identities().into_iter();
                let Some(base) = identities.next() else {
                    continue;
                };
                queue.extend(identities);
                if mapper.is_mapped(base) || classification.is_classified(base) {
                    continue;
                }
                let Some(descriptor) = index.get(base) else {
                    continue;
                };
                if descriptor.is_enum() || descriptor.kind == TypeKind::Annotation {
                    continue;
                }
                info!("Found rest supertype through exploration: {base}");
                classification.rests.insert(base.to_string());
                bases.push_back(descriptor);
            }
        }

        while let Some(name) = queue.pop_front() {
            if mapper.is_mapped(name) || classification.is_classified(name) {
                continue;
            }
            let Some(descriptor) = index.get(name) else {
                debug!(type_name = %name, "Referenced type is not known, skipping exploration");
                continue;
            };
            if descriptor.kind == TypeKind::Annotation {
                continue;
            }
            if descriptor.is_enum() {
                info!("Found enum type through exploration: {name}");
                classification.enums.insert(name.to_string());
                continue;
            }
            if descriptor.endpoints().next().is_some() {
                debug!(type_name = %name, "Referenced type exposes endpoints, not a model");
                continue;
            }
            info!("Found model type through exploration: {name}");
            debug!("{}", self.model_filter.explain(descriptor));
            classification.models.insert(name.to_string());
            queue.extend(descriptor.model_references());
        }
    }
}

/// Model types referencing API-surface types are reported, not reclassified.
fn explore_model_types(index: &TypeIndex, classification: &Classification) {
    for name in &classification.models {
        let Some(descriptor) = index.get(name) else {
            continue;
        };
        for reference in descriptor.model_references() {
            if classification.rests.contains(reference) {
                warn!("Model type {name} references rest type {reference}");
            }
        }
    }
}

fn search_types<'d>(
    candidates: impl IntoIterator<Item = &'d TypeDescriptor>,
    filter: &dyn TypeFilter,
    types: &mut BTreeSet<String>,
    enums: &mut BTreeSet<String>,
) {
    for descriptor in candidates {
        debug!("Found type: {}", descriptor.name);
        if descriptor.is_enum() {
            debug!("Found enum type: {}", descriptor.name);
            enums.insert(descriptor.name.clone());
            continue;
        }
        if filter.accept(descriptor) {
            types.insert(descriptor.name.clone());
        } else {
            info!("Type filtered out: {}", descriptor.simple_name());
        }
        debug!("{}", filter.explain(descriptor));
    }
}

/// Converters available to populate types registered on demand.
struct Converters<'c> {
    enums: &'c dyn ComplexTypeConverter,
    models: Option<&'c dyn ComplexTypeConverter>,
    rests: Option<&'c dyn ComplexTypeConverter>,
}

impl<'c> Converters<'c> {
    fn for_descriptor(
        &self,
        descriptor: &TypeDescriptor,
    ) -> GeneratorResult<&'c dyn ComplexTypeConverter> {
        if descriptor.is_enum() {
            return Ok(self.enums);
        }
        if descriptor.endpoints().next().is_some() {
            if let Some(rests) = self.rests {
                return Ok(rests);
            }
        }
        self.models.ok_or(GeneratorError::MissingConverter {
            category: Category::Model,
        })
    }
}

/// Phase 1 over the whole set, then phase 2, then types found on the way.
fn convert_types(
    ctx: &mut ConversionContext<'_>,
    names: &BTreeSet<String>,
    converter: &dyn ComplexTypeConverter,
    converters: &Converters<'_>,
    nullable: &dyn NullableTypeStrategy,
) -> GeneratorResult<()> {
    let index = ctx.index();
    let mut registered = Vec::with_capacity(names.len());
    for name in names {
        let Some(descriptor) = index.get(name) else {
            continue;
        };
        if converter.pre_convert(ctx, descriptor) {
            registered.push(descriptor);
        }
    }
    info!(
        category = %converter.category(),
        registered = registered.len(),
        "Converting types"
    );

    for descriptor in registered {
        converter.convert(ctx, descriptor, nullable);
    }

    while let Some(descriptor) = ctx.take_pending() {
        let pending_converter = converters.for_descriptor(descriptor)?;
        debug!(
            type_name = %descriptor.name,
            category = %pending_converter.category(),
            "Converting type found during conversion"
        );
        pending_converter.convert(ctx, descriptor, nullable);
    }
    Ok(())
}

#[cfg(test)]
#[path = "generator/generator_tests.rs"]
mod generator_tests;
