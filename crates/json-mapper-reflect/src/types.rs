//! Type vocabulary: builtin kinds, runtime value kinds, and declared type shapes.

use std::fmt;

use crate::error::ReflectError;

/// The builtin (native) types a property can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Int,
    Bool,
    Float,
    String,
    Array,
    Object,
}

impl BuiltinType {
    /// Parses either spelling of a builtin name (`int` or `integer`, etc.).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" | "integer" => Some(Self::Int),
            "bool" | "boolean" => Some(Self::Bool),
            "float" | "double" => Some(Self::Float),
            "string" => Some(Self::String),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            _ => None,
        }
    }

    /// The short spelling used in type declarations.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// The long spelling reported by runtime type inspection.
    pub fn long_name(self) -> &'static str {
        match self {
            Self::Int => "integer",
            Self::Bool => "boolean",
            Self::Float => "double",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Runtime kind of a JSON node or a bound field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Kind of a parsed JSON node. Numbers that fit `i64` are integers.
    pub fn of_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_i64() => Self::Int,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Dynamic runtime spelling of the kind (`integer`, `double`, `NULL`, ...).
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float => "double",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One acceptable shape for a property value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    name: String,
    builtin: bool,
}

impl TypeRef {
    /// Builtin-ness is inferred from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let builtin = BuiltinType::from_name(&name).is_some();
        Self { name, builtin }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            builtin: false,
        }
    }

    pub fn builtin(ty: BuiltinType) -> Self {
        Self {
            name: ty.short_name().to_string(),
            builtin: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub fn as_builtin(&self) -> Option<BuiltinType> {
        if self.builtin {
            BuiltinType::from_name(&self.name)
        } else {
            None
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The statically declared type surface of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Single(TypeRef),
    Union(Vec<TypeRef>),
    Intersection(Vec<TypeRef>),
}

impl TypeShape {
    pub fn types(&self) -> &[TypeRef] {
        match self {
            Self::Single(ty) => std::slice::from_ref(ty),
            Self::Union(types) | Self::Intersection(types) => types,
        }
    }

    pub fn is_intersection(&self) -> bool {
        matches!(self, Self::Intersection(_))
    }
}

/// A declared type plus its nullability flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    pub shape: TypeShape,
    pub nullable: bool,
}

impl DeclaredType {
    pub fn single(name: impl Into<String>) -> Result<Self, ReflectError> {
        let name = name.into();
        single_of(&name, &name)
    }

    /// A union of named types. A `null` member sets the nullable flag; a
    /// union left with one member collapses to a single type.
    pub fn union<I, S>(names: I) -> Result<Self, ReflectError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let members: Vec<&str> = names.iter().map(String::as_str).collect();
        union_of(&names.join("|"), &members)
    }

    pub fn intersection<I, S>(names: I) -> Result<Self, ReflectError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let members: Vec<&str> = names.iter().map(String::as_str).collect();
        intersection_of(&names.join("&"), &members)
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Parses a declaration such as `int`, `?Foo`, `int|string|null` or `A&B`.
    ///
    /// # Example
    ///
    /// ```
    /// use json_mapper_reflect::{DeclaredType, TypeShape};
    ///
    /// let ty = DeclaredType::parse("int|null").unwrap();
    /// assert!(ty.nullable);
    /// assert!(matches!(ty.shape, TypeShape::Single(_)));
    /// ```
    pub fn parse(declaration: &str) -> Result<Self, ReflectError> {
        let trimmed = declaration.trim();
        if trimmed.is_empty() {
            return Err(invalid(declaration, "empty declaration"));
        }

        if let Some(inner) = trimmed.strip_prefix('?') {
            if inner.contains(['|', '&', '?']) {
                return Err(invalid(declaration, "'?' only applies to a single type"));
            }
            return single_of(declaration, inner).map(Self::nullable);
        }

        let has_union = trimmed.contains('|');
        let has_intersection = trimmed.contains('&');
        if has_union && has_intersection {
            return Err(invalid(declaration, "cannot mix '|' and '&'"));
        }

        if has_intersection {
            let members: Vec<&str> = trimmed.split('&').collect();
            return intersection_of(declaration, &members);
        }
        let members: Vec<&str> = trimmed.split('|').collect();
        union_of(declaration, &members)
    }
}

fn invalid(declaration: &str, reason: &'static str) -> ReflectError {
    ReflectError::InvalidTypeDeclaration {
        declaration: declaration.to_string(),
        reason,
    }
}

fn checked_member(member: &str) -> Option<&str> {
    let member = member.trim();
    if member.is_empty() {
        None
    } else {
        Some(member)
    }
}

fn single_of(declaration: &str, name: &str) -> Result<DeclaredType, ReflectError> {
    let name = checked_member(name).ok_or_else(|| invalid(declaration, "empty type name"))?;
    if name == "null" {
        return Err(invalid(declaration, "null is not a standalone type"));
    }
    Ok(DeclaredType {
        shape: TypeShape::Single(TypeRef::new(name)),
        nullable: false,
    })
}

fn union_of(declaration: &str, members: &[&str]) -> Result<DeclaredType, ReflectError> {
    if members.is_empty() {
        return Err(invalid(declaration, "empty declaration"));
    }
    let mut nullable = false;
    let mut types = Vec::with_capacity(members.len());
    for member in members {
        let member =
            checked_member(member).ok_or_else(|| invalid(declaration, "empty union member"))?;
        if member == "null" {
            nullable = true;
        } else {
            types.push(TypeRef::new(member));
        }
    }
    if types.is_empty() {
        return Err(invalid(declaration, "null is not a standalone type"));
    }
    Ok(DeclaredType {
        shape: collapse_union(types),
        nullable,
    })
}

fn intersection_of(declaration: &str, members: &[&str]) -> Result<DeclaredType, ReflectError> {
    let members = members
        .iter()
        .map(|m| checked_member(m))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| invalid(declaration, "empty intersection member"))?;
    if members.contains(&"null") {
        return Err(invalid(declaration, "null cannot be part of an intersection"));
    }
    if members.len() < 2 {
        return Err(invalid(declaration, "an intersection needs at least two members"));
    }
    Ok(DeclaredType {
        shape: TypeShape::Intersection(members.into_iter().map(TypeRef::new).collect()),
        nullable: false,
    })
}

fn collapse_union(mut types: Vec<TypeRef>) -> TypeShape {
    if types.len() == 1 {
        TypeShape::Single(types.remove(0))
    } else {
        TypeShape::Union(types)
    }
}
