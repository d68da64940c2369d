//! Metadata-driven binding between JSON and typed object graphs.
//!
//! # Overview
//!
//! A [`JsonDecoder`] takes a JSON document and a class registered with a
//! [`ClassProvider`](json_mapper_reflect::ClassProvider) and produces a
//! populated [`ObjectRef`](json_mapper_reflect::ObjectRef). A [`JsonEncoder`]
//! flattens an object graph back into JSON text. Both consult a
//! [`MetadataProvider`](json_mapper_reflect::MetadataProvider) per property for
//! the JSON key, the required/omit overrides and an explicit class.
//!
//! Decoding checks every JSON value's runtime kind against the property's
//! candidate types (single, union or intersection, optionally pinned by a
//! mapped class) and recurses into nested objects. A document either decodes
//! completely or the target is left untouched.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use json_mapper::{JsonDecoder, JsonEncoder};
//! use json_mapper_reflect::{Attribute, ClassInfo, ClassRegistry, FieldInfo, FieldValue};
//!
//! let registry = ClassRegistry::new().with(
//!     ClassInfo::builder("User")
//!         .field(FieldInfo::new("id").declared("int").unwrap())
//!         .field(
//!             FieldInfo::new("email")
//!                 .declared("?string")
//!                 .unwrap()
//!                 .attribute(Attribute::MappedPropertyName("e-mail".into())),
//!         )
//!         .build(),
//! );
//!
//! let decoder = JsonDecoder::with_attributes(Arc::new(registry));
//! let user = decoder
//!     .decode_by_class_name(r#"{"id": 7, "e-mail": null}"#, "User")
//!     .unwrap();
//! assert_eq!(user.get("id"), Some(FieldValue::Int(7)));
//!
//! let json = JsonEncoder::default().encode_object(&user).unwrap();
//! assert_eq!(json, r#"{"id":7,"e-mail":null}"#);
//! ```

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod matcher;
pub mod resolver;

pub use decoder::JsonDecoder;
pub use encoder::{EncoderOptions, JsonEncoder, DEFAULT_MAX_DEPTH};
pub use error::{MapperError, MismatchReason, Result};
pub use matcher::{kind_matches, types_match};
pub use resolver::{describe, PropertyDescriptor, PropertyResolver};

pub use json_mapper_reflect as reflect;
