//! Reflective substrate for `json-mapper`: classes, instances and property metadata.
//!
//! Rust has no runtime reflection, so class shapes are described explicitly:
//! a [`ClassInfo`] lists the declared fields (with their [`DeclaredType`] and
//! [`Attribute`]s), a [`ClassProvider`] looks classes up by name, and an
//! [`ObjectRef`] is an instance whose fields are set and read by name.
//! Property metadata is served through a single [`MetadataProvider`].
//!
//! # Example
//!
//! ```
//! use json_mapper_reflect::{ClassInfo, ClassProvider, ClassRegistry, FieldInfo, ObjectRef};
//!
//! let registry = ClassRegistry::new().with(
//!     ClassInfo::builder("Point")
//!         .field(FieldInfo::new("x").declared("int").unwrap())
//!         .field(FieldInfo::new("y").declared("int").unwrap())
//!         .build(),
//! );
//!
//! let point = ObjectRef::instantiate(registry.class("Point").unwrap());
//! assert!(!point.is_initialized("x"));
//! point.set("x", 3i64);
//! assert!(point.is_initialized("x"));
//! ```

pub mod class;
pub mod error;
pub mod metadata;
pub mod object;
pub mod types;
pub mod value;

pub use class::{Attribute, ClassBuilder, ClassInfo, ClassProvider, ClassRegistry, FieldInfo};
pub use error::ReflectError;
pub use metadata::{AttributeMetadata, MetadataProvider, MetadataTable, PropertyMetadata};
pub use object::ObjectRef;
pub use types::{BuiltinType, DeclaredType, TypeRef, TypeShape, ValueKind};
pub use value::FieldValue;
