//! Shared state of one conversion run.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::descriptor::{PrimitiveType, TypeDescriptor, TypeKind, TypeRef};
use crate::mapper::{BuiltinMapping, TypeMapper, builtin};
use crate::module::{ModuleId, ModuleTree, PackageToModuleConverter};
use crate::target::{DeclBody, TargetTypeRef, TsPrimitive, TypeId, TypeTable};

/// Every known descriptor, candidates and reference-only types alike.
#[derive(Debug, Default)]
pub struct TypeIndex {
    by_name: HashMap<String, TypeDescriptor>,
}

impl TypeIndex {
    /// Build the index. On duplicate identities the first descriptor wins.
    pub fn new(descriptors: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        let mut by_name = HashMap::new();
        for descriptor in descriptors {
            by_name.entry(descriptor.name.clone()).or_insert(descriptor);
        }
        Self { by_name }
    }

    pub fn get(&self, identity: &str) -> Option<&TypeDescriptor> {
        self.by_name.get(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.by_name.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Identity table, module tree and on-demand queue of one run.
pub struct ConversionContext<'a> {
    index: &'a TypeIndex,
    mapper: &'a TypeMapper,
    modules: Box<dyn PackageToModuleConverter>,
    table: TypeTable,
    pending: VecDeque<&'a TypeDescriptor>,
}

impl<'a> ConversionContext<'a> {
    pub fn new(
        index: &'a TypeIndex,
        mapper: &'a TypeMapper,
        modules: Box<dyn PackageToModuleConverter>,
    ) -> Self {
        Self {
            index,
            mapper,
            modules,
            table: TypeTable::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn index(&self) -> &'a TypeIndex {
        self.index
    }

    pub fn mapper(&self) -> &'a TypeMapper {
        self.mapper
    }

    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    pub fn modules(&self) -> &ModuleTree {
        self.modules.tree()
    }

    pub fn module_for(&mut self, descriptor: &TypeDescriptor) -> ModuleId {
        self.modules.module_for(descriptor)
    }

    pub fn lookup(&self, identity: &str) -> Option<TypeId> {
        self.table.lookup(identity)
    }

    /// Register an empty shell for `descriptor` in its module.
    ///
    /// Returns `None` for custom-mapped identities, which never get a
    /// declaration. Otherwise returns the id and whether it is new.
    pub fn register(
        &mut self,
        descriptor: &TypeDescriptor,
        shell: DeclBody,
    ) -> Option<(TypeId, bool)> {
        if self.mapper.resolve(&descriptor.name).is_some() {
            debug!(type_name = %descriptor.name, "custom mapping registered, no declaration generated");
            return None;
        }
        if let Some(existing) = self.table.lookup(&descriptor.name) {
            return Some((existing, false));
        }

        let module = self.modules.module_for(descriptor);
        let preferred = target_name(descriptor.simple_name());
        let (id, _) = self
            .table
            .register(&descriptor.name, preferred.clone(), module, shell);
        let claimed = self.modules.tree_mut().claim_name(module, &preferred, id);
        if claimed != preferred {
            warn!(
                type_name = %descriptor.name,
                "name {preferred} already taken in module, using {claimed}"
            );
            self.table.rename(id, claimed);
        }
        Some((id, true))
    }

    /// Fill a registered shell.
    pub fn populate(&mut self, id: TypeId, body: DeclBody) {
        if !self.table.populate(id, body) {
            debug!(type_name = %self.table.get(id).source, "already populated");
        }
    }

    /// Next type registered on demand that still awaits phase 2.
    pub fn take_pending(&mut self) -> Option<&'a TypeDescriptor> {
        self.pending.pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Map a declared source type to a target reference.
    ///
    /// Custom mappings win, then built-in mappings, then declarations already
    /// registered. A known but unregistered type is registered on demand and
    /// queued; an unknown type maps to `any`. A generic type used raw gets
    /// `any` for each missing argument.
    pub fn map_type(&mut self, ty: &TypeRef) -> TargetTypeRef {
        match ty {
            TypeRef::Primitive { name } => TargetTypeRef::Primitive(map_primitive(*name)),
            TypeRef::Array { element } => TargetTypeRef::array(self.map_type(element)),
            TypeRef::Variable { name } => TargetTypeRef::Parameter(name.clone()),
            TypeRef::Named { name, args } => {
                if let Some(target) = self.mapper.resolve(name) {
                    return target.clone();
                }
                if let Some(mapping) = builtin(name) {
                    return self.map_builtin(mapping, args);
                }
                let mut args: Vec<TargetTypeRef> =
                    args.iter().map(|a| self.map_type(a)).collect();
                match self.resolve_declared(name) {
                    Some(id) => {
                        let arity = self.index.get(name).map_or(0, |d| d.type_params.len());
                        if args.len() < arity {
                            args.resize_with(arity, TargetTypeRef::any);
                        }
                        TargetTypeRef::generic(TargetTypeRef::Declared(id), args)
                    }
                    None => {
                        warn!(type_name = %name, "unresolved type reference, mapped to any");
                        TargetTypeRef::any()
                    }
                }
            }
        }
    }

    fn map_builtin(&mut self, mapping: BuiltinMapping, args: &[TypeRef]) -> TargetTypeRef {
        let arg = |i: usize, ctx: &mut Self| {
            args.get(i)
                .map(|a| ctx.map_type(a))
                .unwrap_or_else(TargetTypeRef::any)
        };
        match mapping {
            BuiltinMapping::Primitive(p) => TargetTypeRef::Primitive(p),
            BuiltinMapping::Global(name) => TargetTypeRef::Global(name.to_string()),
            BuiltinMapping::Optional => arg(0, self),
            BuiltinMapping::Collection => TargetTypeRef::array(arg(0, self)),
            BuiltinMapping::Map => TargetTypeRef::Dictionary(Box::new(arg(1, self))),
        }
    }

    fn resolve_declared(&mut self, identity: &str) -> Option<TypeId> {
        if let Some(id) = self.table.lookup(identity) {
            return Some(id);
        }
        let index = self.index;
        let descriptor = index.get(identity)?;
        if descriptor.kind == TypeKind::Annotation {
            return None;
        }
        let shell = if descriptor.is_enum() {
            DeclBody::empty_enum()
        } else {
            DeclBody::empty_interface()
        };
        let (id, newly) = self.register(descriptor, shell)?;
        if newly {
            debug!(type_name = %identity, "registered on demand");
            self.pending.push_back(descriptor);
        }
        Some(id)
    }

    /// Release the module tree and declarations.
    pub fn into_output(self) -> (ModuleTree, TypeTable) {
        (self.modules.into_tree(), self.table)
    }
}

fn map_primitive(primitive: PrimitiveType) -> TsPrimitive {
    match primitive {
        PrimitiveType::Boolean => TsPrimitive::Boolean,
        PrimitiveType::Char => TsPrimitive::String,
        PrimitiveType::Void => TsPrimitive::Void,
        PrimitiveType::Byte
        | PrimitiveType::Short
        | PrimitiveType::Int
        | PrimitiveType::Long
        | PrimitiveType::Float
        | PrimitiveType::Double => TsPrimitive::Number,
    }
}

/// Target declaration name for a source simple name (`Outer$Inner` → `Outer_Inner`).
fn target_name(simple_name: &str) -> String {
    simple_name.replace('$', "_")
}
