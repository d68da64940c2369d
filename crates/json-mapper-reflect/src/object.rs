//! Class instances: constructed without a constructor, fields set by name.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;

use crate::class::ClassInfo;
use crate::value::FieldValue;

#[derive(Debug)]
struct Instance {
    class: Arc<ClassInfo>,
    /// Assigned fields only; an absent entry is an uninitialized field.
    fields: IndexMap<String, FieldValue>,
}

/// Shared handle to a class instance.
///
/// Cloning the handle aliases the same instance, so object graphs may share
/// nodes or form cycles. Reads clone the field value out and release the lock
/// before returning.
#[derive(Clone)]
pub struct ObjectRef {
    inner: Arc<RwLock<Instance>>,
}

impl ObjectRef {
    /// Allocates an instance with every field uninitialized.
    pub fn instantiate(class: Arc<ClassInfo>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Instance {
                class,
                fields: IndexMap::new(),
            })),
        }
    }

    pub fn class(&self) -> Arc<ClassInfo> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&inner.class)
    }

    pub fn class_name(&self) -> String {
        self.class().name.clone()
    }

    /// Returns `None` for an uninitialized field.
    pub fn get(&self, field: &str) -> Option<FieldValue> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.fields.get(field).cloned()
    }

    pub fn set(&self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.fields.insert(field.into(), value.into());
    }

    pub fn is_initialized(&self, field: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.fields.contains_key(field)
    }

    /// Names of the assigned fields, in assignment order.
    pub fn initialized_fields(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.fields.keys().cloned().collect()
    }

    /// True when both handles point at the same instance.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only field names: values may point back at this instance.
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ObjectRef")
            .field("class", &inner.class.name)
            .field("initialized", &inner.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Structural equality: same class name and equal assigned fields.
///
/// Do not compare cyclic graphs; use [`ObjectRef::ptr_eq`] for identity.
impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let (a, b) = (self.snapshot(), other.snapshot());
        a == b
    }
}

impl ObjectRef {
    fn snapshot(&self) -> (String, IndexMap<String, FieldValue>) {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        (inner.class.name.clone(), inner.fields.clone())
    }
}
