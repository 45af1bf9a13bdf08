//! Declaration tree model.
//!
//! These types represent the structure of a generated source artifact. The
//! previous version (parsed from disk, possibly hand-edited) and the next
//! version (freshly generated from the schema) share this representation,
//! which is what the merge engine consumes and produces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Explicit tag for every node kind in the declaration taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Module,
    Import,
    Service,
    Class,
    TypeDef,
    Enum,
    Function,
    Parameter,
    Field,
    EnumMember,
    UnionMember,
    TypeRef,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Import => "import",
            NodeKind::Service => "service",
            NodeKind::Class => "class",
            NodeKind::TypeDef => "type definition",
            NodeKind::Enum => "enum",
            NodeKind::Function => "function",
            NodeKind::Parameter => "parameter",
            NodeKind::Field => "field",
            NodeKind::EnumMember => "enum member",
            NodeKind::UnionMember => "union member",
            NodeKind::TypeRef => "type reference",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Type expressions
// ============================================================================

/// A type expression as written in a signature or field declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    /// A named type, e.g. `string` or `Author`.
    Named(String),
    /// Optional wrapper, printed `T?`.
    Optional(Box<TypeExpr>),
    /// List wrapper, printed `T[]`.
    List(Box<TypeExpr>),
    /// Stream wrapper with an optional completion type, printed `stream<T, C>`.
    Stream {
        item: Box<TypeExpr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        completion: Option<Box<TypeExpr>>,
    },
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    pub fn optional(self) -> Self {
        TypeExpr::Optional(Box::new(self))
    }

    pub fn list(self) -> Self {
        TypeExpr::List(Box::new(self))
    }

    pub fn stream(item: TypeExpr, completion: Option<TypeExpr>) -> Self {
        TypeExpr::Stream {
            item: Box::new(item),
            completion: completion.map(Box::new),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Optional(inner) => write!(f, "{}?", inner),
            TypeExpr::List(inner) => write!(f, "{}[]", inner),
            TypeExpr::Stream { item, completion } => match completion {
                Some(completion) => write!(f, "stream<{}, {}>", item, completion),
                None => write!(f, "stream<{}>", item),
            },
        }
    }
}

// ============================================================================
// Qualifiers and metadata
// ============================================================================

/// A declaration modifier keyword.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    Public,
    Private,
    Isolated,
    Readonly,
    Final,
    Transactional,
    Client,
    Service,
    /// Field-resolver category (path-addressed resource accessor).
    Resource,
    /// Action-resolver category.
    Remote,
    Other(String),
}

impl Qualifier {
    pub fn as_str(&self) -> &str {
        match self {
            Qualifier::Public => "public",
            Qualifier::Private => "private",
            Qualifier::Isolated => "isolated",
            Qualifier::Readonly => "readonly",
            Qualifier::Final => "final",
            Qualifier::Transactional => "transactional",
            Qualifier::Client => "client",
            Qualifier::Service => "service",
            Qualifier::Resource => "resource",
            Qualifier::Remote => "remote",
            Qualifier::Other(word) => word,
        }
    }

    /// The resolver category this qualifier selects, if any.
    pub fn resolver_category(&self) -> Option<ResolverCategory> {
        match self {
            Qualifier::Resource => Some(ResolverCategory::Field),
            Qualifier::Remote => Some(ResolverCategory::Action),
            _ => None,
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a qualifier list the way it appears in source, space separated.
pub fn qualifiers_to_string(qualifiers: &[Qualifier]) -> String {
    qualifiers
        .iter()
        .map(Qualifier::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The two mutually exclusive ways a function can be exposed by the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverCategory {
    /// Query-style single value resolution.
    Field,
    /// Mutation or subscription style resolution.
    Action,
}

impl ResolverCategory {
    /// The qualifier keyword that carries this category.
    pub fn qualifier(&self) -> Qualifier {
        match self {
            ResolverCategory::Field => Qualifier::Resource,
            ResolverCategory::Action => Qualifier::Remote,
        }
    }
}

/// Documentation and annotations attached to a declaration.
///
/// Opaque to the merge beyond precedence: the next tree's documentation wins
/// when present, otherwise the previous tree's is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
}

impl Metadata {
    pub fn documented(doc: impl Into<String>) -> Self {
        Self {
            documentation: Some(doc.into()),
            annotations: Vec::new(),
        }
    }

    /// Combine previous and next metadata: next's documentation and
    /// annotations take precedence, prev fills whatever next leaves empty.
    pub fn overlay(prev: Option<&Metadata>, next: Option<&Metadata>) -> Option<Metadata> {
        match (prev, next) {
            (None, None) => None,
            (Some(prev), None) => Some(prev.clone()),
            (None, Some(next)) => Some(next.clone()),
            (Some(prev), Some(next)) => Some(Metadata {
                documentation: next
                    .documentation
                    .clone()
                    .or_else(|| prev.documentation.clone()),
                annotations: if next.annotations.is_empty() {
                    prev.annotations.clone()
                } else {
                    next.annotations.clone()
                },
            }),
        }
    }
}

// ============================================================================
// Member-level nodes
// ============================================================================

/// A function parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_expr: TypeExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub readonly: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_expr: TypeExpr) -> Self {
        Self {
            name: name.into(),
            type_expr,
            default_value: None,
            readonly: false,
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}

/// A record field, or a plain field of a class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub type_expr: TypeExpr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Field {
    pub fn new(name: impl Into<String>, type_expr: TypeExpr) -> Self {
        Self {
            name: name.into(),
            type_expr,
            default_value: None,
            readonly: false,
            metadata: None,
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

/// A function or method declaration.
///
/// Path-addressed functions (resource accessors) carry their accessor in
/// `name` (e.g. `get`) and the schema field in `path`; their identity is the
/// first path segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeExpr>,
    /// Developer-authored implementation, never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            qualifiers: Vec::new(),
            name: name.into(),
            path: Vec::new(),
            parameters: Vec::new(),
            return_type: None,
            body: None,
            metadata: None,
        }
    }

    /// A path-addressed `resource` accessor, e.g. `resource function get name()`.
    pub fn resource(accessor: impl Into<String>, path: impl Into<String>) -> Self {
        let mut function = Self::new(accessor);
        function.qualifiers.push(Qualifier::Resource);
        function.path.push(path.into());
        function
    }

    /// A `remote` function.
    pub fn remote(name: impl Into<String>) -> Self {
        let mut function = Self::new(name);
        function.qualifiers.push(Qualifier::Remote);
        function
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returning(mut self, return_type: TypeExpr) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// Name used to pair this function with its counterpart in the other tree.
    pub fn identity(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or(&self.name)
    }

    pub fn resolver_category(&self) -> Option<ResolverCategory> {
        self.qualifiers.iter().find_map(Qualifier::resolver_category)
    }

    /// Whether the schema exposes this function (as opposed to a helper).
    pub fn is_resolver(&self) -> bool {
        self.resolver_category().is_some()
    }
}

/// Marks that an object or class includes another named shape (`*Node;`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A member of a service, class, or object shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    TypeRef(TypeRef),
    Function(FunctionDecl),
    /// Plain field; only classes may declare these.
    Field(Field),
}

impl Member {
    pub fn kind(&self) -> NodeKind {
        match self {
            Member::TypeRef(_) => NodeKind::TypeRef,
            Member::Function(_) => NodeKind::Function,
            Member::Field(_) => NodeKind::Field,
        }
    }

    pub fn identity(&self) -> &str {
        match self {
            Member::TypeRef(type_ref) => &type_ref.name,
            Member::Function(function) => function.identity(),
            Member::Field(field) => &field.name,
        }
    }
}

/// Opening and closing tokens of a record or enum body, e.g. `{|` and `|}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    pub fn braces() -> Self {
        Self {
            open: "{".to_string(),
            close: "}".to_string(),
        }
    }

    /// Closed record delimiters.
    pub fn exclusive() -> Self {
        Self {
            open: "{|".to_string(),
            close: "|}".to_string(),
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::braces()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl EnumMember {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            metadata: None,
        }
    }
}

// ============================================================================
// Top-level declarations
// ============================================================================

/// Object-like body shared by object type definitions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectShape {
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordShape {
    #[serde(default)]
    pub delimiters: Delimiters,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionShape {
    /// Flattened member type names.
    pub members: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeShape {
    Object(ObjectShape),
    DistinctObject(ObjectShape),
    Record(RecordShape),
    Union(UnionShape),
}

impl TypeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeShape::Object(_) => "object",
            TypeShape::DistinctObject(_) => "distinct object",
            TypeShape::Record(_) => "record",
            TypeShape::Union(_) => "union",
        }
    }
}

/// A named type definition: `type Name <shape>;`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    pub shape: TypeShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            qualifiers: Vec::new(),
            shape,
            metadata: None,
        }
    }

    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self::new(
            name,
            TypeShape::Record(RecordShape {
                delimiters: Delimiters::default(),
                fields,
            }),
        )
    }

    pub fn union(name: impl Into<String>, members: &[&str]) -> Self {
        Self::new(
            name,
            TypeShape::Union(UnionShape {
                members: members.iter().map(|m| m.to_string()).collect(),
            }),
        )
    }

    pub fn object(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self::new(
            name,
            TypeShape::Object(ObjectShape {
                qualifiers: Vec::new(),
                members,
            }),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub delimiters: Delimiters,
    pub members: Vec<EnumMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl EnumDecl {
    pub fn new(name: impl Into<String>, members: &[&str]) -> Self {
        Self {
            name: name.into(),
            qualifiers: Vec::new(),
            delimiters: Delimiters::default(),
            members: members.iter().map(|m| EnumMember::new(*m)).collect(),
            metadata: None,
        }
    }
}

/// A service declaration. Services may be anonymous.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub distinct: bool,
    /// Attach point and listener expression, developer-configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attach_point: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            qualifiers: Vec::new(),
            distinct: false,
            members,
            metadata: None,
        }
    }
}

/// A top-level declaration of a module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "declaration", rename_all = "snake_case")]
pub enum Declaration {
    Service(ServiceDecl),
    Class(ClassDecl),
    TypeDef(TypeDefinition),
    Enum(EnumDecl),
    Function(FunctionDecl),
}

impl Declaration {
    pub fn kind(&self) -> NodeKind {
        match self {
            Declaration::Service(_) => NodeKind::Service,
            Declaration::Class(_) => NodeKind::Class,
            Declaration::TypeDef(_) => NodeKind::TypeDef,
            Declaration::Enum(_) => NodeKind::Enum,
            Declaration::Function(_) => NodeKind::Function,
        }
    }

    /// Declared name; anonymous services have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            Declaration::Service(service) => service.name.as_deref(),
            Declaration::Class(class) => Some(&class.name),
            Declaration::TypeDef(type_def) => Some(&type_def.name),
            Declaration::Enum(enum_decl) => Some(&enum_decl.name),
            Declaration::Function(function) => Some(function.identity()),
        }
    }
}

/// An import directive, e.g. `import ballerina/graphql as gql;`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl Import {
    pub fn new(org: Option<&str>, module: impl Into<String>) -> Self {
        Self {
            org: org.map(str::to_string),
            module: module.into(),
            prefix: None,
        }
    }

    /// Fully qualified module reference, `org/module`.
    pub fn qualified_name(&self) -> String {
        match &self.org {
            Some(org) => format!("{}/{}", org, self.module),
            None => self.module.clone(),
        }
    }
}

/// Root of a declaration tree: one source file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl Module {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Self {
            imports: Vec::new(),
            declarations,
        }
    }
}
