use std::fmt;

use thiserror::Error;

/// Why a value or an override did not fit a property's declared types.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchReason {
    /// The JSON value's runtime kind matches none of the candidate types.
    ValueKind { found: &'static str },
    /// `null` for a property that is not nullable.
    NullNotAllowed,
    /// Explicit class differs from the single declared type.
    Override { declared: String, class: String },
    /// Explicit class is compatible with no member of the union.
    UnionOverride { class: String },
    /// Explicit class is not compatible with every member of the intersection.
    IntersectionOverride { class: String },
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValueKind { found } => write!(f, "value of type {} is not accepted", found),
            Self::NullNotAllowed => f.write_str("null is not allowed"),
            Self::Override { declared, class } => {
                write!(f, "mapped class {} does not match declared type {}", class, declared)
            }
            Self::UnionOverride { class } => {
                write!(f, "mapped class {} matches no member of the union type", class)
            }
            Self::IntersectionOverride { class } => write!(
                f,
                "mapped class {} does not satisfy every member of the intersection type",
                class
            ),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapperError {
    #[error("Class '{0}' not found.")]
    ClassNotFound(String),

    #[error("There is a duplicate of the property name definition for '{0}'")]
    AmbiguousNameDefinition(String),

    #[error("Ambiguous type definition for property '{0}'")]
    AmbiguousTypeDefinition(String),

    #[error("No matching type found for json property '{property}': {reason}")]
    NoMatchingTypeDefinition {
        property: String,
        reason: MismatchReason,
    },

    #[error("Required property '{0}' not found")]
    RequiredPropertyNotFound(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
}

impl MapperError {
    pub(crate) fn no_match(property: &str, reason: MismatchReason) -> Self {
        Self::NoMatchingTypeDefinition {
            property: property.to_string(),
            reason,
        }
    }

    /// The property or JSON key the error refers to, if any.
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::AmbiguousNameDefinition(p)
            | Self::AmbiguousTypeDefinition(p)
            | Self::RequiredPropertyNotFound(p)
            | Self::NoMatchingTypeDefinition { property: p, .. } => Some(p),
            Self::ClassNotFound(_) | Self::InvalidJson(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;
