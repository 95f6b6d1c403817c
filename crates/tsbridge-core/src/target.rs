//! Output-side type graph.
//!
//! Declarations live in a [`TypeTable`] arena keyed by the identity of the
//! source type they were converted from. A declaration is allocated empty
//! (phase 1) and populated later (phase 2), so references between
//! declarations are plain [`TypeId`]s and cycles need no special handling.

use std::collections::HashMap;

use crate::module::ModuleId;

/// Handle of a declaration in the [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

/// TypeScript keyword types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TsPrimitive {
    Number,
    String,
    Boolean,
    Any,
    Void,
    Null,
    Unknown,
}

impl TsPrimitive {
    pub fn keyword(self) -> &'static str {
        match self {
            TsPrimitive::Number => "number",
            TsPrimitive::String => "string",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Any => "any",
            TsPrimitive::Void => "void",
            TsPrimitive::Null => "null",
            TsPrimitive::Unknown => "unknown",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "number" => Some(TsPrimitive::Number),
            "string" => Some(TsPrimitive::String),
            "boolean" => Some(TsPrimitive::Boolean),
            "any" => Some(TsPrimitive::Any),
            "void" => Some(TsPrimitive::Void),
            "null" => Some(TsPrimitive::Null),
            "unknown" => Some(TsPrimitive::Unknown),
            _ => None,
        }
    }
}

/// Reference to a target type, as used by members and supertypes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetTypeRef {
    /// Keyword type
    Primitive(TsPrimitive),

    /// Ambient global type needing no import (`Date`, `Promise`)
    Global(String),

    /// Declaration in the output graph
    Declared(TypeId),

    /// Named export of an existing module (`import { name } from 'module'`)
    External { name: String, module: String },

    /// `T[]`
    Array(Box<TargetTypeRef>),

    /// `Base<A, B>`
    Generic {
        base: Box<TargetTypeRef>,
        args: Vec<TargetTypeRef>,
    },

    /// Type parameter of the enclosing declaration
    Parameter(String),

    /// `{ [key: string]: V }`
    Dictionary(Box<TargetTypeRef>),
}

impl TargetTypeRef {
    pub fn array(element: TargetTypeRef) -> Self {
        TargetTypeRef::Array(Box::new(element))
    }

    pub fn generic(base: TargetTypeRef, args: Vec<TargetTypeRef>) -> Self {
        if args.is_empty() {
            base
        } else {
            TargetTypeRef::Generic {
                base: Box::new(base),
                args,
            }
        }
    }

    pub fn any() -> Self {
        TargetTypeRef::Primitive(TsPrimitive::Any)
    }

    /// Parse the textual form used by custom mappings.
    ///
    /// Keywords become [`TargetTypeRef::Primitive`], a trailing `[]` an array,
    /// and with a module the name is imported from it.
    pub fn from_name(name: &str, module: Option<&str>) -> Self {
        if let Some(element) = name.strip_suffix("[]") {
            return TargetTypeRef::array(Self::from_name(element, module));
        }
        if let Some(primitive) = TsPrimitive::from_keyword(name) {
            return TargetTypeRef::Primitive(primitive);
        }
        match module {
            Some(module) => TargetTypeRef::External {
                name: name.to_string(),
                module: module.to_string(),
            },
            None => TargetTypeRef::Global(name.to_string()),
        }
    }

    /// Whether this reference can appear in an `extends` clause.
    pub fn is_extendable(&self) -> bool {
        match self {
            TargetTypeRef::Declared(_) | TargetTypeRef::External { .. } => true,
            TargetTypeRef::Generic { base, .. } => base.is_extendable(),
            _ => false,
        }
    }

    /// Declarations this reference points at, in order of appearance.
    pub fn declared_ids(&self, out: &mut Vec<TypeId>) {
        match self {
            TargetTypeRef::Declared(id) => out.push(*id),
            TargetTypeRef::Array(inner) | TargetTypeRef::Dictionary(inner) => {
                inner.declared_ids(out)
            }
            TargetTypeRef::Generic { base, args } => {
                base.declared_ids(out);
                for arg in args {
                    arg.declared_ids(out);
                }
            }
            TargetTypeRef::Primitive(_)
            | TargetTypeRef::Global(_)
            | TargetTypeRef::External { .. }
            | TargetTypeRef::Parameter(_) => {}
        }
    }

    /// External `(module, name)` imports this reference needs.
    pub fn externals<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            TargetTypeRef::External { name, module } => out.push((module, name)),
            TargetTypeRef::Array(inner) | TargetTypeRef::Dictionary(inner) => inner.externals(out),
            TargetTypeRef::Generic { base, args } => {
                base.externals(out);
                for arg in args {
                    arg.externals(out);
                }
            }
            TargetTypeRef::Primitive(_)
            | TargetTypeRef::Global(_)
            | TargetTypeRef::Declared(_)
            | TargetTypeRef::Parameter(_) => {}
        }
    }
}

/// Optionality flag of a member. Once raised it stays raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nullable(bool);

impl Nullable {
    pub fn is_set(self) -> bool {
        self.0
    }

    pub fn mark(&mut self) {
        self.0 = true;
    }
}

/// Interface property or method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: TargetTypeRef,
    pub nullable: Nullable,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: TargetTypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: Nullable::default(),
        }
    }
}

/// Endpoint signature on an API-surface interface.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Property>,
    pub returns: TargetTypeRef,
    pub docs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceDecl {
    pub type_params: Vec<String>,
    pub extends: Vec<TargetTypeRef>,
    pub properties: Vec<Property>,
    pub methods: Vec<MethodSignature>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumDecl {
    pub members: Vec<String>,
}

/// Body of a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclBody {
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    Alias {
        type_params: Vec<String>,
        target: TargetTypeRef,
    },
}

impl DeclBody {
    pub fn empty_interface() -> Self {
        DeclBody::Interface(InterfaceDecl::default())
    }

    pub fn empty_enum() -> Self {
        DeclBody::Enum(EnumDecl::default())
    }

    /// All references made by the body, supertypes first.
    pub fn references(&self) -> Vec<&TargetTypeRef> {
        match self {
            DeclBody::Interface(decl) => decl
                .extends
                .iter()
                .chain(decl.properties.iter().map(|p| &p.ty))
                .chain(decl.methods.iter().flat_map(|m| {
                    m.params
                        .iter()
                        .map(|p| &p.ty)
                        .chain(std::iter::once(&m.returns))
                }))
                .collect(),
            DeclBody::Enum(_) => Vec::new(),
            DeclBody::Alias { target, .. } => vec![target],
        }
    }
}

/// Conversion progress of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclState {
    /// Allocated by phase 1, members not resolved yet
    Registered,
    /// Filled by phase 2; never mutated afterwards
    Populated,
}

/// A declaration of the output graph.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetDecl {
    /// Unique name within its module
    pub name: String,
    /// Identity of the source type
    pub source: String,
    pub module: ModuleId,
    pub body: DeclBody,
    pub state: DeclState,
}

/// Identity-keyed arena of declarations.
#[derive(Debug, Default)]
pub struct TypeTable {
    decls: Vec<TargetDecl>,
    by_source: HashMap<String, TypeId>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, source: &str) -> Option<TypeId> {
        self.by_source.get(source).copied()
    }

    /// Allocate a declaration shell. First registration of an identity wins.
    pub fn register(
        &mut self,
        source: &str,
        name: String,
        module: ModuleId,
        body: DeclBody,
    ) -> (TypeId, bool) {
        if let Some(existing) = self.lookup(source) {
            return (existing, false);
        }
        let id = TypeId(self.decls.len());
        self.decls.push(TargetDecl {
            name,
            source: source.to_string(),
            module,
            body,
            state: DeclState::Registered,
        });
        self.by_source.insert(source.to_string(), id);
        (id, true)
    }

    pub fn get(&self, id: TypeId) -> &TargetDecl {
        &self.decls[id.0]
    }

    /// Fill a registered shell. Populated declarations are left untouched.
    pub fn populate(&mut self, id: TypeId, body: DeclBody) -> bool {
        let decl = &mut self.decls[id.0];
        if decl.state == DeclState::Populated {
            return false;
        }
        decl.body = body;
        decl.state = DeclState::Populated;
        true
    }

    pub(crate) fn rename(&mut self, id: TypeId, name: String) {
        self.decls[id.0].name = name;
    }

    pub fn is_populated(&self, id: TypeId) -> bool {
        self.get(id).state == DeclState::Populated
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &TargetDecl)> {
        self.decls.iter().enumerate().map(|(i, d)| (TypeId(i), d))
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
