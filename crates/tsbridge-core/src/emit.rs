//! TypeScript serialization of the converted module tree.
//!
//! One file per module that owns declarations. Imports are grouped by
//! specifier and sorted, declarations follow in name order, so rendering the
//! same graph twice yields identical bytes. An imported name that clashes
//! with a local declaration or an earlier import is bound under an alias.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{GeneratorError, GeneratorResult};
use crate::module::{ModuleId, ModuleTree};
use crate::target::{DeclBody, Property, TargetDecl, TargetTypeRef, TypeId, TypeTable};

const HEADER: &str = "// Generated by tsbridge. Do not edit.\n";
const INDENT: &str = "    ";

/// Rendered content of one module file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedModule {
    /// Path relative to the output directory
    pub path: PathBuf,
    pub content: String,
}

/// Complete output graph of a generation run.
#[derive(Debug)]
pub struct GeneratedModules {
    tree: ModuleTree,
    table: TypeTable,
}

impl GeneratedModules {
    pub fn new(tree: ModuleTree, table: TypeTable) -> Self {
        Self { tree, table }
    }

    pub fn tree(&self) -> &ModuleTree {
        &self.tree
    }

    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    /// Paths of all modules, in order.
    pub fn module_paths(&self) -> Vec<String> {
        self.tree
            .sorted()
            .into_iter()
            .map(|id| self.tree.get(id).qualified_name())
            .collect()
    }

    /// Declaration `name` in the module at `path`.
    pub fn find(&self, path: &[&str], name: &str) -> Option<&TargetDecl> {
        let module = self.tree.find(path)?;
        self.tree
            .get(module)
            .types()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| self.table.get(id))
    }

    /// Declaration converted from the source identity.
    pub fn find_source(&self, identity: &str) -> Option<&TargetDecl> {
        self.table.lookup(identity).map(|id| self.table.get(id))
    }

    /// Name under which a declaration is emitted.
    pub fn name_of(&self, id: TypeId) -> &str {
        &self.table.get(id).name
    }

    /// Render every module owning declarations, in path order.
    pub fn render(&self) -> Vec<RenderedModule> {
        self.tree
            .sorted()
            .into_iter()
            .filter(|id| self.tree.get(*id).has_types())
            .map(|id| RenderedModule {
                path: self.tree.get(id).file_path(),
                content: self.render_module(id),
            })
            .collect()
    }

    /// Write all rendered modules below `output_dir`.
    pub fn write_to(&self, output_dir: &Path) -> GeneratorResult<Vec<PathBuf>> {
        let rendered = self.render();
        let mut written = Vec::with_capacity(rendered.len());
        for module in rendered {
            let path = output_dir.join(&module.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e))?;
            }
            fs::write(&path, module.content).map_err(|e| GeneratorError::io(&path, e))?;
            info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    pub fn render_module(&self, module: ModuleId) -> String {
        let decls: Vec<&TargetDecl> = self
            .tree
            .get(module)
            .types()
            .map(|(_, id)| self.table.get(id))
            .collect();

        let mut code = String::from(HEADER);

        let scope = self.import_scope(module, &decls);
        if !scope.imports.is_empty() {
            code.push('\n');
            for (specifier, names) in &scope.imports {
                let names: Vec<String> = names
                    .iter()
                    .map(|(name, local)| {
                        if name == local {
                            name.clone()
                        } else {
                            format!("{name} as {local}")
                        }
                    })
                    .collect();
                code.push_str(&format!(
                    "import {{ {} }} from '{}';\n",
                    names.join(", "),
                    specifier
                ));
            }
        }

        for decl in decls {
            code.push('\n');
            self.render_decl(decl, &scope, &mut code);
        }

        code
    }

    /// Imports of `module`, each bound to a name that clashes neither with a
    /// local declaration nor with another import.
    fn import_scope(&self, module: ModuleId, decls: &[&TargetDecl]) -> ImportScope {
        let mut wanted: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for decl in decls {
            for reference in decl.body.references() {
                let mut ids = Vec::new();
                reference.declared_ids(&mut ids);
                for id in ids {
                    let target = self.table.get(id);
                    if target.module != module {
                        wanted
                            .entry(self.tree.relative_specifier(module, target.module))
                            .or_default()
                            .insert(target.name.clone());
                    }
                }

                let mut externals = Vec::new();
                reference.externals(&mut externals);
                for (specifier, name) in externals {
                    wanted
                        .entry(specifier.to_string())
                        .or_default()
                        .insert(name.to_string());
                }
            }
        }

        let mut taken: BTreeSet<String> = decls.iter().map(|d| d.name.clone()).collect();
        let mut imports: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (specifier, names) in wanted {
            let bound = imports.entry(specifier.clone()).or_default();
            for name in names {
                let local = if taken.contains(&name) {
                    import_alias(&name, &specifier, &taken)
                } else {
                    name.clone()
                };
                taken.insert(local.clone());
                bound.insert(name, local);
            }
        }

        ImportScope {
            module: Some(module),
            imports,
        }
    }

    fn render_decl(&self, decl: &TargetDecl, scope: &ImportScope, code: &mut String) {
        match &decl.body {
            DeclBody::Enum(body) => {
                code.push_str(&format!("export enum {} {{\n", decl.name));
                for member in &body.members {
                    code.push_str(&format!("{INDENT}{member} = '{member}',\n"));
                }
                code.push_str("}\n");
            }
            DeclBody::Alias {
                type_params,
                target,
            } => {
                code.push_str(&format!(
                    "export type {}{} = {};\n",
                    decl.name,
                    type_params_clause(type_params),
                    self.render_type_in(target, scope)
                ));
            }
            DeclBody::Interface(body) => {
                code.push_str(&format!(
                    "export interface {}{}",
                    decl.name,
                    type_params_clause(&body.type_params)
                ));
                if !body.extends.is_empty() {
                    let extends: Vec<String> = body
                        .extends
                        .iter()
                        .map(|e| self.render_type_in(e, scope))
                        .collect();
                    code.push_str(&format!(" extends {}", extends.join(", ")));
                }
                code.push_str(" {\n");

                for property in &body.properties {
                    code.push_str(&format!(
                        "{INDENT}{}{}: {};\n",
                        property_name(&property.name),
                        if property.nullable.is_set() { "?" } else { "" },
                        self.render_type_in(&property.ty, scope)
                    ));
                }

                for (i, method) in body.methods.iter().enumerate() {
                    if i > 0 || !body.properties.is_empty() {
                        code.push('\n');
                    }
                    if !method.docs.is_empty() {
                        code.push_str(&format!("{INDENT}/**\n"));
                        for doc in &method.docs {
                            code.push_str(&format!("{INDENT} * {doc}\n"));
                        }
                        code.push_str(&format!("{INDENT} */\n"));
                    }
                    code.push_str(&format!(
                        "{INDENT}{}({}): {};\n",
                        method.name,
                        self.render_params(&method.params, scope),
                        self.render_type_in(&method.returns, scope)
                    ));
                }

                code.push_str("}\n");
            }
        }
    }

    /// Optional parameters may only trail; an optional one followed by a
    /// required one is rendered as `T | undefined`.
    fn render_params(&self, params: &[Property], scope: &ImportScope) -> String {
        let trailing_optional = params
            .iter()
            .rev()
            .take_while(|p| p.nullable.is_set())
            .count();
        let first_trailing = params.len() - trailing_optional;

        params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let ty = self.render_type_in(&p.ty, scope);
                if i >= first_trailing {
                    format!("{}?: {ty}", p.name)
                } else if p.nullable.is_set() {
                    format!("{}: {ty} | undefined", p.name)
                } else {
                    format!("{}: {ty}", p.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Type syntax with declarations referenced by their own names.
    pub fn render_type(&self, ty: &TargetTypeRef) -> String {
        self.render_type_in(ty, &ImportScope::default())
    }

    fn render_type_in(&self, ty: &TargetTypeRef, scope: &ImportScope) -> String {
        match ty {
            TargetTypeRef::Primitive(p) => p.keyword().to_string(),
            TargetTypeRef::Global(name) => name.clone(),
            TargetTypeRef::Declared(id) => {
                let target = self.table.get(*id);
                match scope.module {
                    Some(module) if module != target.module => scope
                        .local_name(
                            &self.tree.relative_specifier(module, target.module),
                            &target.name,
                        )
                        .to_string(),
                    _ => target.name.clone(),
                }
            }
            TargetTypeRef::External { name, module } => {
                scope.local_name(module, name).to_string()
            }
            TargetTypeRef::Array(inner) => format!("{}[]", self.render_type_in(inner, scope)),
            TargetTypeRef::Generic { base, args } => {
                let args: Vec<String> =
                    args.iter().map(|a| self.render_type_in(a, scope)).collect();
                format!("{}<{}>", self.render_type_in(base, scope), args.join(", "))
            }
            TargetTypeRef::Parameter(name) => name.clone(),
            TargetTypeRef::Dictionary(value) => {
                format!("{{ [key: string]: {} }}", self.render_type_in(value, scope))
            }
        }
    }
}

/// Local bindings of the imports of one module file.
#[derive(Debug, Default)]
struct ImportScope {
    module: Option<ModuleId>,
    /// specifier -> imported name -> local name
    imports: BTreeMap<String, BTreeMap<String, String>>,
}

impl ImportScope {
    fn local_name<'a>(&'a self, specifier: &str, name: &'a str) -> &'a str {
        self.imports
            .get(specifier)
            .and_then(|names| names.get(name))
            .map_or(name, String::as_str)
    }
}

/// `User` imported from `./app.b` next to a local `User` becomes `User_b`.
fn import_alias(name: &str, specifier: &str, taken: &BTreeSet<String>) -> String {
    let suffix = specifier
        .rsplit(|c: char| !c.is_ascii_alphanumeric())
        .find(|s| !s.is_empty())
        .unwrap_or("import");
    let preferred = format!("{name}_{suffix}");
    let mut alias = preferred.clone();
    let mut counter = 2;
    while taken.contains(&alias) {
        alias = format!("{preferred}{counter}");
        counter += 1;
    }
    alias
}

fn type_params_clause(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", params.join(", "))
    }
}

/// Quote property names that are not plain identifiers.
fn property_name(name: &str) -> String {
    let mut chars = name.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "\\'"))
    }
}
