//! Encode engine: object graphs into JSON text.
//!
//! The walk keeps its own stack of open containers rather than recursing, so
//! thread stack use does not grow with nesting depth.

use std::collections::HashSet;
use std::sync::Arc;

use json_mapper_reflect::{AttributeMetadata, ClassInfo, FieldValue, MetadataProvider, ObjectRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{MapperError, Result};
use crate::resolver::describe;

pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderOptions {
    /// Objects, maps and arrays nested deeper than this are written empty.
    /// The value passed to `encode` is at depth 1.
    pub max_depth: usize,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Flattens instances into JSON following their property metadata.
#[derive(Clone)]
pub struct JsonEncoder {
    metadata: Arc<dyn MetadataProvider>,
    options: EncoderOptions,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new(Arc::new(AttributeMetadata))
    }
}

impl JsonEncoder {
    pub fn new(metadata: Arc<dyn MetadataProvider>) -> Self {
        Self::with_options(metadata, EncoderOptions::default())
    }

    pub fn with_options(metadata: Arc<dyn MetadataProvider>, options: EncoderOptions) -> Self {
        Self { metadata, options }
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Encodes any field value: scalars, arrays, maps or instances.
    pub fn encode(&self, value: &FieldValue) -> Result<String> {
        let flattened = self.encode_to_value(value)?;
        serde_json::to_string(&flattened).map_err(|e| MapperError::InvalidJson(e.to_string()))
    }

    pub fn encode_object(&self, object: &ObjectRef) -> Result<String> {
        self.encode(&FieldValue::Object(object.clone()))
    }

    /// Flattens to a JSON tree instead of text.
    pub fn encode_to_value(&self, value: &FieldValue) -> Result<Value> {
        let mut stack = match self.open(value.clone(), 1) {
            Flattened::Leaf(leaf) => return Ok(leaf),
            Flattened::Open(container) => vec![container],
        };

        let mut encoded = Value::Null;
        while let Some(top) = stack.last_mut() {
            match self.step(top)? {
                Step::Member(member) => match self.open(member, top.depth + 1) {
                    Flattened::Leaf(leaf) => top.members.accept(leaf),
                    Flattened::Open(container) => stack.push(container),
                },
                Step::Closed(closed) => {
                    stack.pop();
                    match stack.last_mut() {
                        Some(parent) => parent.members.accept(closed),
                        None => encoded = closed,
                    }
                }
            }
        }
        Ok(encoded)
    }

    /// Converts a scalar, or opens a container at `depth`.
    fn open(&self, value: FieldValue, depth: usize) -> Flattened {
        let truncated = depth > self.options.max_depth;
        let members = match value {
            FieldValue::Null => return Flattened::Leaf(Value::Null),
            FieldValue::Bool(b) => return Flattened::Leaf(Value::Bool(b)),
            FieldValue::Int(i) => return Flattened::Leaf(Value::Number(i.into())),
            // JSON has no NaN or infinities.
            FieldValue::Float(f) => {
                return Flattened::Leaf(Number::from_f64(f).map_or(Value::Null, Value::Number))
            }
            FieldValue::String(s) => return Flattened::Leaf(Value::String(s)),
            FieldValue::Array(_) if truncated => {
                self.log_truncation(depth);
                return Flattened::Leaf(Value::Array(Vec::new()));
            }
            FieldValue::Map(_) | FieldValue::Object(_) if truncated => {
                self.log_truncation(depth);
                return Flattened::Leaf(Value::Object(Map::new()));
            }
            FieldValue::Array(items) => Members::Array {
                out: Vec::with_capacity(items.len()),
                items: items.into_iter(),
            },
            FieldValue::Map(entries) => Members::Map {
                entries: entries.into_iter(),
                key: String::new(),
                out: Map::new(),
            },
            FieldValue::Object(object) => {
                let class = object.class();
                tracing::trace!(class = %class.name, depth, "Encoding object");
                Members::Object {
                    object,
                    class,
                    next: 0,
                    json_names: HashSet::new(),
                    key: String::new(),
                    out: Map::new(),
                }
            }
        };
        Flattened::Open(Open { depth, members })
    }

    /// Yields the next member of `open`, or the finished container.
    fn step(&self, open: &mut Open) -> Result<Step> {
        match &mut open.members {
            Members::Array { items, out } => Ok(match items.next() {
                Some(item) => Step::Member(item),
                None => Step::Closed(Value::Array(std::mem::take(out))),
            }),
            Members::Map { entries, key, out } => Ok(match entries.next() {
                Some((name, item)) => {
                    *key = name;
                    Step::Member(item)
                }
                None => Step::Closed(Value::Object(std::mem::take(out))),
            }),
            Members::Object {
                object,
                class,
                next,
                json_names,
                key,
                out,
            } => {
                let class: &ClassInfo = class;
                while let Some(field) = class.fields.get(*next) {
                    *next += 1;
                    if field.is_static {
                        continue;
                    }
                    let descriptor = describe(self.metadata.as_ref(), class, field);
                    if descriptor.omit {
                        continue;
                    }
                    if !json_names.insert(descriptor.json_name.clone()) {
                        return Err(MapperError::AmbiguousNameDefinition(descriptor.json_name));
                    }

                    match object.get(&field.name) {
                        Some(value) => {
                            *key = descriptor.json_name;
                            return Ok(Step::Member(value));
                        }
                        None if descriptor.required => {
                            tracing::debug!(
                                class = %class.name,
                                field = %field.name,
                                "Required property is uninitialized"
                            );
                            return Err(MapperError::RequiredPropertyNotFound(
                                descriptor.json_name,
                            ));
                        }
                        None => {}
                    }
                }
                Ok(Step::Closed(Value::Object(std::mem::take(out))))
            }
        }
    }

    fn log_truncation(&self, depth: usize) {
        tracing::warn!(
            depth,
            max_depth = self.options.max_depth,
            "Maximum encoding depth exceeded, truncating nested value"
        );
    }
}

/// A container whose members are still being flattened.
struct Open {
    depth: usize,
    members: Members,
}

enum Members {
    Array {
        items: std::vec::IntoIter<FieldValue>,
        out: Vec<Value>,
    },
    Map {
        entries: indexmap::map::IntoIter<String, FieldValue>,
        key: String,
        out: Map<String, Value>,
    },
    Object {
        object: ObjectRef,
        class: Arc<ClassInfo>,
        /// Index into `class.fields` of the next field to visit.
        next: usize,
        json_names: HashSet<String>,
        key: String,
        out: Map<String, Value>,
    },
}

impl Members {
    /// Stores a flattened member under the key recorded by the last step.
    fn accept(&mut self, value: Value) {
        match self {
            Self::Array { out, .. } => out.push(value),
            Self::Map { key, out, .. } | Self::Object { key, out, .. } => {
                out.insert(std::mem::take(key), value);
            }
        }
    }
}

enum Flattened {
    Leaf(Value),
    Open(Open),
}

enum Step {
    Member(FieldValue),
    Closed(Value),
}
