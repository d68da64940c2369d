//! Values held by instance fields.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::object::ObjectRef;
use crate::types::ValueKind;

/// A value assigned to an instance field.
///
/// `Map` is a generic structure (a JSON object bound without a target class);
/// `Object` is an instance of a known class.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),
    Object(ObjectRef),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Array(_) => ValueKind::Array,
            Self::Map(_) | Self::Object(_) => ValueKind::Object,
        }
    }

    /// Converts a parsed JSON node. Objects become generic maps.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                // Every non-i64 number has an f64 form without `arbitrary_precision`.
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts a scalar, array or map back to JSON.
    ///
    /// Returns `None` if the value contains a class instance; those are
    /// flattened by the encoder, which knows their property metadata.
    /// Non-finite floats become `null`.
    pub fn to_json(&self) -> Option<Value> {
        Some(match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Number((*i).into()),
            Self::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::Array(items) => Value::Array(
                items
                    .iter()
                    .map(Self::to_json)
                    .collect::<Option<Vec<_>>>()?,
            ),
            Self::Map(map) => {
                let mut out = Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json()?);
                }
                Value::Object(out)
            }
            Self::Object(_) => return None,
        })
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<ObjectRef> for FieldValue {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_become_maps() {
        let value = FieldValue::from_json(&json!({"a": 1, "b": [true, 1.5]}));
        let mut expected = IndexMap::new();
        expected.insert("a".to_string(), FieldValue::Int(1));
        expected.insert(
            "b".to_string(),
            FieldValue::Array(vec![FieldValue::Bool(true), FieldValue::Float(1.5)]),
        );
        assert_eq!(value, FieldValue::Map(expected));
        assert_eq!(value.kind(), ValueKind::Object);
    }

    #[test]
    fn to_json_preserves_key_order() {
        let doc = json!({"z": 1, "a": {"y": null, "b": "s"}});
        let value = FieldValue::from_json(&doc);
        let back = value.to_json().unwrap();
        assert_eq!(serde_json::to_string(&back).unwrap(), r#"{"z":1,"a":{"y":null,"b":"s"}}"#);
    }

    #[test]
    fn float_stays_float() {
        assert_eq!(FieldValue::from_json(&json!(17.0)), FieldValue::Float(17.0));
        assert_eq!(FieldValue::from_json(&json!(17)), FieldValue::Int(17));
    }
}
