//! Type matching between runtime value kinds and declared type names.
//!
//! Runtime inspection spells primitives `integer`/`boolean`/`double`, type
//! declarations spell them `int`/`bool`/`float`. Both sides are normalized to
//! the long spelling before comparing; nothing else is coerced.

use json_mapper_reflect::{TypeRef, ValueKind};

const SHORT_TO_LONG: [(&str, &str); 3] = [("int", "integer"), ("bool", "boolean"), ("float", "double")];

fn normalize(name: &str) -> &str {
    SHORT_TO_LONG
        .iter()
        .find(|(short, _)| *short == name)
        .map_or(name, |(_, long)| *long)
}

/// Whether two type names denote the same type, under short/long aliasing.
///
/// # Example
///
/// ```
/// use json_mapper::types_match;
///
/// assert!(types_match("integer", "int"));
/// assert!(types_match("double", "float"));
/// assert!(!types_match("integer", "string"));
/// ```
pub fn types_match(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Whether a value of `kind` directly satisfies the candidate type.
///
/// Class candidates never match directly; they are reached by recursion.
pub fn kind_matches(kind: ValueKind, candidate: &TypeRef) -> bool {
    types_match(kind.type_name(), candidate.name())
}
