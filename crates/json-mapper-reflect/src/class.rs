//! Class shapes: the reflective view of a type's declared fields.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ReflectError;
use crate::types::DeclaredType;

/// Declarative metadata attached to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    /// Use this key in JSON instead of the field name.
    MappedPropertyName(String),
    Required(bool),
    Omit(bool),
    /// Concrete class to bind, for untyped or loosely typed fields.
    MappedPropertyClass(String),
}

/// One declared field of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub declared: Option<DeclaredType>,
    pub is_static: bool,
    pub attributes: Vec<Attribute>,
}

impl FieldInfo {
    /// An untyped instance field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared: None,
            is_static: false,
            attributes: Vec::new(),
        }
    }

    pub fn typed(mut self, declared: DeclaredType) -> Self {
        self.declared = Some(declared);
        self
    }

    /// Shorthand for `typed(DeclaredType::parse(declaration)?)`.
    pub fn declared(self, declaration: &str) -> Result<Self, ReflectError> {
        Ok(self.typed(DeclaredType::parse(declaration)?))
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn has_type(&self) -> bool {
        self.declared.is_some()
    }
}

/// The static shape of a class: its name, ancestors and fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    /// Direct parents: extended classes and implemented interfaces.
    pub parents: Vec<String>,
    pub fields: Vec<FieldInfo>,
}

impl ClassInfo {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            info: ClassInfo {
                name: name.into(),
                parents: Vec::new(),
                fields: Vec::new(),
            },
        }
    }

    /// Non-static fields, in declaration order.
    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| !f.is_static)
    }
}

#[derive(Debug, Clone)]
pub struct ClassBuilder {
    info: ClassInfo,
}

impl ClassBuilder {
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.info.parents.push(parent.into());
        self
    }

    pub fn field(mut self, field: FieldInfo) -> Self {
        self.info.fields.push(field);
        self
    }

    pub fn build(self) -> ClassInfo {
        self.info
    }
}

/// Lookup of class shapes by name.
///
/// Implementations are shared read-only between concurrent calls.
pub trait ClassProvider: Send + Sync {
    fn class(&self, name: &str) -> Option<Arc<ClassInfo>>;

    fn contains(&self, name: &str) -> bool {
        self.class(name).is_some()
    }

    /// Nominal compatibility: `class` equals `ancestor` or inherits from it.
    fn is_a(&self, class: &str, ancestor: &str) -> bool {
        let mut pending = vec![class.to_string()];
        let mut seen: Vec<String> = Vec::new();
        while let Some(name) = pending.pop() {
            if name == ancestor {
                return true;
            }
            if seen.contains(&name) {
                continue;
            }
            if let Some(info) = self.class(&name) {
                pending.extend(info.parents.iter().cloned());
            }
            seen.push(name);
        }
        false
    }
}

/// In-memory [`ClassProvider`] keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, Arc<ClassInfo>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class, replacing any previous class of the same name.
    pub fn register(&mut self, class: ClassInfo) -> Arc<ClassInfo> {
        let class = Arc::new(class);
        self.classes.insert(class.name.clone(), Arc::clone(&class));
        class
    }

    pub fn with(mut self, class: ClassInfo) -> Self {
        self.register(class);
        self
    }
}

impl ClassProvider for ClassRegistry {
    fn class(&self, name: &str) -> Option<Arc<ClassInfo>> {
        self.classes.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ClassRegistry {
        ClassRegistry::new()
            .with(ClassInfo::builder("Animal").build())
            .with(ClassInfo::builder("Named").build())
            .with(ClassInfo::builder("Dog").extends("Animal").extends("Named").build())
            .with(ClassInfo::builder("Puppy").extends("Dog").build())
            .with(ClassInfo::builder("Loop").extends("Loop").build())
    }

    #[test]
    fn is_a_follows_parents_transitively() {
        let reg = registry();
        assert!(reg.is_a("Puppy", "Puppy"));
        assert!(reg.is_a("Puppy", "Dog"));
        assert!(reg.is_a("Puppy", "Animal"));
        assert!(reg.is_a("Puppy", "Named"));
        assert!(!reg.is_a("Animal", "Dog"));
        assert!(!reg.is_a("Unknown", "Animal"));
    }

    #[test]
    fn is_a_terminates_on_cyclic_parents() {
        assert!(!registry().is_a("Loop", "Animal"));
    }

    #[test]
    fn instance_fields_skip_static() {
        let class = ClassInfo::builder("Foo")
            .field(FieldInfo::new("a"))
            .field(FieldInfo::new("counter").with_static())
            .field(FieldInfo::new("b"))
            .build();
        let names: Vec<_> = class.instance_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
