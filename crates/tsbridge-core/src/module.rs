//! Package-to-module mapping and the output module tree.
//!
//! The tree is an arena of [`TargetModule`]s keyed by path segments. Children
//! and declarations are kept in `BTreeMap`s, so walking the tree with
//! [`ModuleTree::sorted`] always yields the same order for the same input.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::descriptor::TypeDescriptor;
use crate::target::TypeId;

/// Module used for types declared outside any namespace.
pub const GLOBAL_MODULE: &str = "global";

/// Handle of a module in the [`ModuleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

/// A node of the module tree.
#[derive(Debug, Clone)]
pub struct TargetModule {
    path: Vec<String>,
    parent: Option<ModuleId>,
    children: BTreeMap<String, ModuleId>,
    types: BTreeMap<String, TypeId>,
}

impl TargetModule {
    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Slash-separated display form of the path.
    pub fn qualified_name(&self) -> String {
        self.path.join("/")
    }

    pub fn parent(&self) -> Option<ModuleId> {
        self.parent
    }

    pub fn children(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.children.values().copied()
    }

    /// Owned declarations, sorted by name.
    pub fn types(&self) -> impl Iterator<Item = (&str, TypeId)> + '_ {
        self.types.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn has_types(&self) -> bool {
        !self.types.is_empty()
    }

    /// Output file of the module, relative to the output directory.
    pub fn file_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for (i, segment) in self.path.iter().enumerate() {
            if i + 1 == self.path.len() {
                path.push(format!("{segment}.ts"));
            } else {
                path.push(segment);
            }
        }
        path
    }
}

/// Arena of modules with deterministic traversal.
#[derive(Debug, Default)]
pub struct ModuleTree {
    modules: Vec<TargetModule>,
    roots: BTreeMap<String, ModuleId>,
}

impl ModuleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the module at `path`, creating missing nodes on the way.
    pub fn ensure(&mut self, path: &[String]) -> ModuleId {
        let mut current: Option<ModuleId> = None;
        for (depth, segment) in path.iter().enumerate() {
            let existing = match current {
                None => self.roots.get(segment).copied(),
                Some(parent) => self.modules[parent.0].children.get(segment).copied(),
            };
            let id = match existing {
                Some(id) => id,
                None => {
                    let id = ModuleId(self.modules.len());
                    self.modules.push(TargetModule {
                        path: path[..=depth].to_vec(),
                        parent: current,
                        children: BTreeMap::new(),
                        types: BTreeMap::new(),
                    });
                    match current {
                        None => self.roots.insert(segment.clone(), id),
                        Some(parent) => self.modules[parent.0].children.insert(segment.clone(), id),
                    };
                    id
                }
            };
            current = Some(id);
        }
        match current {
            Some(id) => id,
            None => self.ensure(&[GLOBAL_MODULE.to_string()]),
        }
    }

    pub fn get(&self, id: ModuleId) -> &TargetModule {
        &self.modules[id.0]
    }

    /// Look a module up by path without creating it.
    pub fn find(&self, path: &[&str]) -> Option<ModuleId> {
        let (first, rest) = path.split_first()?;
        let mut current = *self.roots.get(*first)?;
        for segment in rest {
            current = *self.modules[current.0].children.get(*segment)?;
        }
        Some(current)
    }

    pub fn roots(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.roots.values().copied()
    }

    /// All modules in path order (pre-order, children by name).
    pub fn sorted(&self) -> Vec<ModuleId> {
        let mut out = Vec::with_capacity(self.modules.len());
        let mut stack: Vec<ModuleId> = self.roots.values().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.modules[id.0].children.values().rev().copied());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Reserve a declaration name in a module.
    ///
    /// Names stay unique within a module; a clash gets a numeric suffix.
    pub fn claim_name(&mut self, module: ModuleId, preferred: &str, id: TypeId) -> String {
        let types = &mut self.modules[module.0].types;
        let mut name = preferred.to_string();
        let mut counter = 2;
        while types.contains_key(&name) {
            name = format!("{preferred}{counter}");
            counter += 1;
        }
        types.insert(name.clone(), id);
        name
    }

    /// Relative import specifier from the file of `from` to the file of `to`.
    pub fn relative_specifier(&self, from: ModuleId, to: ModuleId) -> String {
        let from_path = &self.get(from).path;
        let to_path = &self.get(to).path;
        let from_dir = &from_path[..from_path.len().saturating_sub(1)];
        let to_dir = &to_path[..to_path.len().saturating_sub(1)];

        let common = from_dir
            .iter()
            .zip(to_dir.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let ups = from_dir.len() - common;
        let rest = to_path[common..].join("/");

        if ups == 0 {
            format!("./{rest}")
        } else {
            format!("{}{rest}", "../".repeat(ups))
        }
    }
}

/// Maps a source type's namespace onto a module of the tree.
///
/// `module_for` must be idempotent: the same descriptor always yields the
/// same module.
pub trait PackageToModuleConverter {
    fn module_for(&mut self, descriptor: &TypeDescriptor) -> ModuleId;

    fn tree(&self) -> &ModuleTree;

    fn tree_mut(&mut self) -> &mut ModuleTree;

    fn into_tree(self: Box<Self>) -> ModuleTree;
}

/// Collapses the first `depth` namespace segments into one top-level module
/// and nests the remaining segments below it.
///
/// With depth 2, `com.acme.model.core` maps to `com.acme` / `model` / `core`.
#[derive(Debug)]
pub struct DepthModuleConverter {
    depth: usize,
    tree: ModuleTree,
    cache: HashMap<String, ModuleId>,
}

impl DepthModuleConverter {
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            tree: ModuleTree::new(),
            cache: HashMap::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn module_path(&self, namespace: &str) -> Vec<String> {
        let segments: Vec<&str> = namespace.split('.').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return vec![GLOBAL_MODULE.to_string()];
        }
        let split = self.depth.min(segments.len());
        let mut path = vec![segments[..split].join(".")];
        path.extend(segments[split..].iter().map(|s| s.to_string()));
        path
    }
}

impl PackageToModuleConverter for DepthModuleConverter {
    fn module_for(&mut self, descriptor: &TypeDescriptor) -> ModuleId {
        let namespace = descriptor.namespace();
        if let Some(id) = self.cache.get(namespace) {
            return *id;
        }
        let path = self.module_path(namespace);
        let id = self.tree.ensure(&path);
        self.cache.insert(namespace.to_string(), id);
        id
    }

    fn tree(&self) -> &ModuleTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut ModuleTree {
        &mut self.tree
    }

    fn into_tree(self: Box<Self>) -> ModuleTree {
        self.tree
    }
}

/// Places every type in one module.
#[derive(Debug)]
pub struct SingleModuleConverter {
    name: String,
    tree: ModuleTree,
}

impl SingleModuleConverter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tree: ModuleTree::new(),
        }
    }
}

impl PackageToModuleConverter for SingleModuleConverter {
    fn module_for(&mut self, _descriptor: &TypeDescriptor) -> ModuleId {
        let path = [self.name.clone()];
        self.tree.ensure(&path)
    }

    fn tree(&self) -> &ModuleTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut ModuleTree {
        &mut self.tree
    }

    fn into_tree(self: Box<Self>) -> ModuleTree {
        self.tree
    }
}
