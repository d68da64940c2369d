//! Property metadata: renames, required/omit overrides and explicit classes.
//!
//! The engines see one [`MetadataProvider`] no matter where the metadata was
//! declared. [`AttributeMetadata`] reads attributes attached to the fields;
//! [`MetadataTable`] holds the same information outside the types, e.g. loaded
//! from a configuration document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::class::{Attribute, ClassInfo, FieldInfo};
use crate::error::ReflectError;

/// Read-only metadata lookup, one method per concern.
///
/// `None` means "not declared": the engines fall back to the default derived
/// from the declared type.
pub trait MetadataProvider: Send + Sync {
    fn mapped_name(&self, class: &ClassInfo, field: &FieldInfo) -> Option<String>;

    fn required(&self, class: &ClassInfo, field: &FieldInfo) -> Option<bool>;

    fn omit(&self, class: &ClassInfo, field: &FieldInfo) -> Option<bool>;

    fn mapped_class(&self, class: &ClassInfo, field: &FieldInfo) -> Option<String>;
}

/// Metadata declared as [`Attribute`]s on the fields. The last attribute of a
/// kind wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeMetadata;

impl AttributeMetadata {
    fn last<T>(field: &FieldInfo, pick: impl Fn(&Attribute) -> Option<T>) -> Option<T> {
        field.attributes.iter().rev().find_map(pick)
    }
}

impl MetadataProvider for AttributeMetadata {
    fn mapped_name(&self, _class: &ClassInfo, field: &FieldInfo) -> Option<String> {
        Self::last(field, |a| match a {
            Attribute::MappedPropertyName(name) => Some(name.clone()),
            _ => None,
        })
    }

    fn required(&self, _class: &ClassInfo, field: &FieldInfo) -> Option<bool> {
        Self::last(field, |a| match a {
            Attribute::Required(required) => Some(*required),
            _ => None,
        })
    }

    fn omit(&self, _class: &ClassInfo, field: &FieldInfo) -> Option<bool> {
        Self::last(field, |a| match a {
            Attribute::Omit(omit) => Some(*omit),
            _ => None,
        })
    }

    fn mapped_class(&self, _class: &ClassInfo, field: &FieldInfo) -> Option<String> {
        Self::last(field, |a| match a {
            Attribute::MappedPropertyClass(class) => Some(class.clone()),
            _ => None,
        })
    }
}

/// Metadata for one property in a [`MetadataTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyMetadata {
    pub name: Option<String>,
    pub required: Option<bool>,
    pub omit: Option<bool>,
    pub class: Option<String>,
}

/// Metadata kept outside the types, keyed by class name then field name.
///
/// # Example
///
/// ```
/// use json_mapper_reflect::MetadataTable;
///
/// let table = MetadataTable::from_json_str(
///     r#"{"User": {"email": {"name": "e-mail", "required": false}}}"#,
/// ).unwrap();
/// assert_eq!(table.get("User", "email").unwrap().name.as_deref(), Some("e-mail"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataTable {
    classes: HashMap<String, HashMap<String, PropertyMetadata>>,
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ReflectError> {
        serde_json::from_str(json).map_err(|e| ReflectError::InvalidMetadata(e.to_string()))
    }

    pub fn insert(
        &mut self,
        class: impl Into<String>,
        field: impl Into<String>,
        metadata: PropertyMetadata,
    ) {
        self.classes
            .entry(class.into())
            .or_default()
            .insert(field.into(), metadata);
    }

    pub fn get(&self, class: &str, field: &str) -> Option<&PropertyMetadata> {
        self.classes.get(class)?.get(field)
    }

    fn lookup(&self, class: &ClassInfo, field: &FieldInfo) -> Option<&PropertyMetadata> {
        self.get(&class.name, &field.name)
    }
}

impl MetadataProvider for MetadataTable {
    fn mapped_name(&self, class: &ClassInfo, field: &FieldInfo) -> Option<String> {
        self.lookup(class, field)?.name.clone()
    }

    fn required(&self, class: &ClassInfo, field: &FieldInfo) -> Option<bool> {
        self.lookup(class, field)?.required
    }

    fn omit(&self, class: &ClassInfo, field: &FieldInfo) -> Option<bool> {
        self.lookup(class, field)?.omit
    }

    fn mapped_class(&self, class: &ClassInfo, field: &FieldInfo) -> Option<String> {
        self.lookup(class, field)?.class.clone()
    }
}
