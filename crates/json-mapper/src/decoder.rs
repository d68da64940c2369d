//! Decode engine: JSON text into class instances.
//!
//! Each object is decoded in three phases. Every property is resolved and its
//! JSON value checked and converted into a pending list; only when the whole
//! object validated are the pending values assigned. A failing decode leaves
//! the target without any field written by that call.

use std::collections::HashSet;
use std::sync::Arc;

use json_mapper_reflect::{
    AttributeMetadata, ClassProvider, FieldValue, MetadataProvider, ObjectRef, ValueKind,
};
use serde_json::Value;

use crate::error::{MapperError, MismatchReason, Result};
use crate::matcher::kind_matches;
use crate::resolver::{PropertyDescriptor, PropertyResolver};

/// Binds JSON documents to instances of registered classes.
#[derive(Clone)]
pub struct JsonDecoder {
    classes: Arc<dyn ClassProvider>,
    metadata: Arc<dyn MetadataProvider>,
}

impl JsonDecoder {
    pub fn new(classes: Arc<dyn ClassProvider>, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self { classes, metadata }
    }

    /// Decoder reading metadata from field attributes.
    pub fn with_attributes(classes: Arc<dyn ClassProvider>) -> Self {
        Self::new(classes, Arc::new(AttributeMetadata))
    }

    /// Decodes `json` into a new instance of `class_name`.
    pub fn decode_by_class_name(&self, json: &str, class_name: &str) -> Result<ObjectRef> {
        let target = self.instantiate(class_name)?;
        let document = parse(json)?;
        self.decode_into(&document, &target)?;
        Ok(target)
    }

    /// Decodes `json` into an existing instance and returns the same handle.
    pub fn decode_by_object(&self, json: &str, target: &ObjectRef) -> Result<ObjectRef> {
        let document = parse(json)?;
        self.decode_into(&document, target)?;
        Ok(target.clone())
    }

    /// Decodes an already parsed JSON node into a new instance of `class_name`.
    pub fn decode_value(&self, document: &Value, class_name: &str) -> Result<ObjectRef> {
        let target = self.instantiate(class_name)?;
        self.decode_into(document, &target)?;
        Ok(target)
    }

    fn instantiate(&self, class_name: &str) -> Result<ObjectRef> {
        let class = self
            .classes
            .class(class_name)
            .ok_or_else(|| MapperError::ClassNotFound(class_name.to_string()))?;
        Ok(ObjectRef::instantiate(class))
    }

    fn decode_into(&self, document: &Value, target: &ObjectRef) -> Result<()> {
        let Value::Object(json_fields) = document else {
            return Err(MapperError::InvalidJson(format!(
                "expected an object, found {}",
                ValueKind::of_json(document)
            )));
        };

        let class = target.class();
        tracing::debug!(class = %class.name, fields = class.fields.len(), "Decoding object");

        let resolver = PropertyResolver::new(self.classes.as_ref(), self.metadata.as_ref());
        let mut json_names: HashSet<String> = HashSet::new();
        let mut pending: Vec<(String, FieldValue)> = Vec::new();

        for field in class.instance_fields() {
            let mut descriptor = resolver.describe(&class, field);
            if descriptor.omit {
                continue;
            }
            resolver.resolve_candidates(&class, field, &mut descriptor)?;

            if !json_names.insert(descriptor.json_name.clone()) {
                return Err(MapperError::AmbiguousNameDefinition(descriptor.json_name));
            }

            let Some(json_value) = json_fields.get(&descriptor.json_name) else {
                if descriptor.required {
                    tracing::debug!(
                        class = %class.name,
                        json_name = %descriptor.json_name,
                        "Required property missing"
                    );
                    return Err(MapperError::RequiredPropertyNotFound(descriptor.json_name));
                }
                continue;
            };

            let value = self.convert(&descriptor, json_value)?;
            pending.push((descriptor.field_name, value));
        }

        tracing::debug!(class = %class.name, assigned = pending.len(), "Committing decoded fields");
        for (field, value) in pending {
            target.set(field, value);
        }
        Ok(())
    }

    /// Checks one JSON value against the descriptor and converts it.
    fn convert(&self, descriptor: &PropertyDescriptor, json_value: &Value) -> Result<FieldValue> {
        let kind = ValueKind::of_json(json_value);

        let value = if kind == ValueKind::Null {
            // Settled by the nullability check below.
            FieldValue::Null
        } else {
            match descriptor.candidate_types.as_slice() {
                [] => FieldValue::from_json(json_value),
                [candidate] => {
                    if kind_matches(kind, candidate) {
                        FieldValue::from_json(json_value)
                    } else if kind == ValueKind::Object && !candidate.is_builtin() {
                        FieldValue::Object(self.decode_value(json_value, candidate.name())?)
                    } else {
                        return Err(self.mismatch(descriptor, kind));
                    }
                }
                candidates => {
                    let class_candidate = descriptor.class_candidate();
                    if let (Some(class), ValueKind::Object) = (class_candidate, kind) {
                        // A JSON object always binds to the class member.
                        FieldValue::Object(self.decode_value(json_value, class.name())?)
                    } else {
                        let has_match = if descriptor.is_intersection {
                            candidates.iter().all(|c| kind_matches(kind, c))
                        } else {
                            candidates.iter().any(|c| kind_matches(kind, c))
                        };
                        if !has_match {
                            return Err(self.mismatch(descriptor, kind));
                        }
                        FieldValue::from_json(json_value)
                    }
                }
            }
        };

        if kind == ValueKind::Null && !descriptor.nullable {
            return Err(MapperError::no_match(
                &descriptor.json_name,
                MismatchReason::NullNotAllowed,
            ));
        }
        Ok(value)
    }

    fn mismatch(&self, descriptor: &PropertyDescriptor, kind: ValueKind) -> MapperError {
        tracing::debug!(
            json_name = %descriptor.json_name,
            found = %kind,
            "No candidate type accepts the value"
        );
        MapperError::no_match(
            &descriptor.json_name,
            MismatchReason::ValueKind {
                found: kind.type_name(),
            },
        )
    }
}

fn parse(json: &str) -> Result<Value> {
    serde_json::from_str(json).map_err(|e| MapperError::InvalidJson(e.to_string()))
}
