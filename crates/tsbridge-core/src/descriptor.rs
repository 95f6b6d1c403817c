//! Read-only view over discovered source types.
//!
//! A [`TypeDescriptor`] is what the discovery collaborator hands to the
//! generator: a fully-qualified identity, a kind, generic parameters, members,
//! supertypes and typed metadata ([`Marker`]s). Descriptors are never mutated
//! after discovery; converters only borrow them.
//!
//! Descriptors deserialize from the JSON type manifest format:
//!
//! ```json
//! {
//!   "name": "app.model.User",
//!   "kind": "class",
//!   "fields": [
//!     { "name": "id", "type": { "kind": "primitive", "name": "int" } },
//!     { "name": "email", "type": { "kind": "named", "name": "java.util.Optional",
//!       "args": [{ "kind": "named", "name": "java.lang.String" }] } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Fully-qualified identities the engine treats specially.
pub mod well_known {
    pub const OBJECT: &str = "java.lang.Object";
    pub const STRING: &str = "java.lang.String";
    pub const BOOLEAN: &str = "java.lang.Boolean";
    pub const CHARACTER: &str = "java.lang.Character";
    pub const VOID: &str = "java.lang.Void";
    pub const ENUM: &str = "java.lang.Enum";
    pub const OPTIONAL: &str = "java.util.Optional";
    pub const UUID: &str = "java.util.UUID";

    /// Subtypes of `java.lang.Number`: boxed, hence possibly absent.
    pub const BOXED_NUMBERS: &[&str] = &[
        "java.lang.Number",
        "java.lang.Byte",
        "java.lang.Short",
        "java.lang.Integer",
        "java.lang.Long",
        "java.lang.Float",
        "java.lang.Double",
        "java.math.BigDecimal",
        "java.math.BigInteger",
        "java.util.concurrent.atomic.AtomicInteger",
        "java.util.concurrent.atomic.AtomicLong",
    ];

    pub const DATE_TIMES: &[&str] = &[
        "java.util.Date",
        "java.util.Calendar",
        "java.sql.Date",
        "java.sql.Timestamp",
        "java.time.Instant",
        "java.time.LocalDate",
        "java.time.LocalDateTime",
        "java.time.OffsetDateTime",
        "java.time.ZonedDateTime",
    ];

    pub const COLLECTIONS: &[&str] = &[
        "java.lang.Iterable",
        "java.util.Collection",
        "java.util.List",
        "java.util.ArrayList",
        "java.util.LinkedList",
        "java.util.Set",
        "java.util.HashSet",
        "java.util.LinkedHashSet",
        "java.util.SortedSet",
        "java.util.TreeSet",
    ];

    pub const MAPS: &[&str] = &[
        "java.util.Map",
        "java.util.HashMap",
        "java.util.LinkedHashMap",
        "java.util.SortedMap",
        "java.util.TreeMap",
    ];

    pub fn is_boxed_number(name: &str) -> bool {
        BOXED_NUMBERS.contains(&name)
    }
}

/// Kind of a discovered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

/// Unboxed primitive types; these can never be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Void,
}

/// A declared type reference as it appears on a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// Unboxed primitive (`int`, `boolean`, ...)
    Primitive { name: PrimitiveType },

    /// Reference to a named type, possibly instantiated with generic arguments
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeRef>,
    },

    /// Array of the element type
    Array { element: Box<TypeRef> },

    /// Type variable (`T`)
    Variable { name: String },
}

impl TypeRef {
    pub fn primitive(name: PrimitiveType) -> Self {
        TypeRef::Primitive { name }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        TypeRef::Variable { name: name.into() }
    }

    /// The raw type identity, for named references.
    pub fn raw_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether this is the generic optional-presence wrapper.
    ///
    /// Only a parameterized use counts; a raw `Optional` carries no element.
    pub fn is_optional_wrapper(&self) -> bool {
        matches!(self, TypeRef::Named { name, args } if name == well_known::OPTIONAL && !args.is_empty())
    }

    /// Every named identity mentioned by this reference, including generic
    /// arguments and array elements.
    pub fn named_identities(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeRef::Named { name, args } => {
                out.push(name);
                for arg in args {
                    arg.collect_names(out);
                }
            }
            TypeRef::Array { element } => element.collect_names(out),
            TypeRef::Primitive { .. } | TypeRef::Variable { .. } => {}
        }
    }
}

/// HTTP method attached to a request mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        };
        f.write_str(name)
    }
}

/// Typed metadata attached to a type, member or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Marker {
    /// The element may be absent
    Nullable,

    /// The type exposes REST endpoints
    RestController,

    /// Endpoint mapping, on a type (path prefix) or a method
    RequestMapping {
        #[serde(default)]
        path: String,
        #[serde(default)]
        method: Option<HttpMethod>,
    },

    /// Parameter bound to the request body
    RequestBody,

    /// Parameter bound to a path segment
    PathVariable {
        #[serde(default)]
        name: Option<String>,
    },

    /// Parameter bound to a query parameter
    RequestParam {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_required")]
        required: bool,
    },

    /// Member excluded from serialization
    JsonIgnore,

    /// Any other metadata, by name
    Other { name: String },
}

fn default_required() -> bool {
    true
}

/// Capability key used to query markers without matching on payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Nullable,
    RestController,
    RequestMapping,
    RequestBody,
    PathVariable,
    RequestParam,
    JsonIgnore,
    Other(String),
}

impl Marker {
    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::Nullable => MarkerKind::Nullable,
            Marker::RestController => MarkerKind::RestController,
            Marker::RequestMapping { .. } => MarkerKind::RequestMapping,
            Marker::RequestBody => MarkerKind::RequestBody,
            Marker::PathVariable { .. } => MarkerKind::PathVariable,
            Marker::RequestParam { .. } => MarkerKind::RequestParam,
            Marker::JsonIgnore => MarkerKind::JsonIgnore,
            Marker::Other { name } => MarkerKind::Other(name.clone()),
        }
    }
}

/// Query helpers shared by every element that carries markers.
pub trait HasMarkers {
    fn markers(&self) -> &[Marker];

    fn has_marker(&self, kind: &MarkerKind) -> bool {
        self.markers().iter().any(|m| &m.kind() == kind)
    }

    fn request_mapping(&self) -> Option<(&str, Option<HttpMethod>)> {
        self.markers().iter().find_map(|m| match m {
            Marker::RequestMapping { path, method } => Some((path.as_str(), *method)),
            _ => None,
        })
    }
}

/// A data member of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeRef,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeRef,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,
}

/// A method of a type; only endpoint methods matter to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,

    #[serde(default)]
    pub params: Vec<Parameter>,

    #[serde(default = "void_ref")]
    pub returns: TypeRef,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,
}

fn void_ref() -> TypeRef {
    TypeRef::primitive(PrimitiveType::Void)
}

impl HasMarkers for Field {
    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl HasMarkers for Parameter {
    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl HasMarkers for Method {
    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

/// A discovered source type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully-qualified name, e.g. `app.model.User`
    pub name: String,

    pub kind: TypeKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<TypeRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<Method>,

    /// Enum constants, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,

    /// Declared nested types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<TypeDescriptor>,
}

impl HasMarkers for TypeDescriptor {
    fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            constants: Vec::new(),
            markers: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn enumeration(name: impl Into<String>, constants: &[&str]) -> Self {
        let mut descriptor = Self::new(name, TypeKind::Enum);
        descriptor.constants = constants.iter().map(|c| c.to_string()).collect();
        descriptor
    }

    pub fn with_type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    pub fn with_superclass(mut self, ty: TypeRef) -> Self {
        self.superclass = Some(ty);
        self
    }

    pub fn with_interface(mut self, ty: TypeRef) -> Self {
        self.interfaces.push(ty);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            markers: Vec::new(),
        });
        self
    }

    pub fn with_marked_field(
        mut self,
        name: impl Into<String>,
        ty: TypeRef,
        markers: Vec<Marker>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            ty,
            markers,
        });
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn with_nested(mut self, nested: TypeDescriptor) -> Self {
        self.nested.push(nested);
        self
    }

    /// Namespace part of the identity (`app.model` for `app.model.User`).
    pub fn namespace(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }

    /// Unqualified name (`User` for `app.model.User`).
    pub fn simple_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
            || self.superclass.as_ref().and_then(TypeRef::raw_name) == Some(well_known::ENUM)
    }

    /// Superclass (when not the root object type) followed by interfaces.
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.superclass
            .iter()
            .filter(|s| {
                let raw = s.raw_name();
                raw != Some(well_known::OBJECT) && raw != Some(well_known::ENUM)
            })
            .chain(self.interfaces.iter())
    }

    /// Whether any direct supertype has the given identity.
    pub fn directly_extends(&self, identity: &str) -> bool {
        self.supertypes().any(|s| s.raw_name() == Some(identity))
    }

    /// Methods exposed as endpoints.
    pub fn endpoints(&self) -> impl Iterator<Item = &Method> {
        self.methods
            .iter()
            .filter(|m| m.has_marker(&MarkerKind::RequestMapping))
    }

    /// Every named identity referenced by fields and supertypes.
    pub fn model_references(&self) -> Vec<&str> {
        self.supertypes()
            .chain(self.fields.iter().map(|f| &f.ty))
            .flat_map(TypeRef::named_identities)
            .collect()
    }

    /// Every named identity referenced by endpoint parameters and results.
    pub fn endpoint_references(&self) -> Vec<&str> {
        self.endpoints()
            .flat_map(|m| m.params.iter().map(|p| &p.ty).chain(std::iter::once(&m.returns)))
            .flat_map(TypeRef::named_identities)
            .collect()
    }
}
