//! Per-property resolution: JSON key, flags and the candidate type set.

use json_mapper_reflect::{
    BuiltinType, ClassInfo, ClassProvider, FieldInfo, MetadataProvider, TypeRef, TypeShape,
};

use crate::error::{MapperError, MismatchReason, Result};
use crate::matcher::types_match;

/// Working description of one property for a single decode or encode call.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub field_name: String,
    pub json_name: String,
    pub required: bool,
    pub nullable: bool,
    pub omit: bool,
    /// Empty only for an untyped property without a mapped class.
    pub candidate_types: Vec<TypeRef>,
    pub is_intersection: bool,
}

impl PropertyDescriptor {
    /// The only non-builtin candidate, if any.
    pub fn class_candidate(&self) -> Option<&TypeRef> {
        self.candidate_types.iter().find(|t| !t.is_builtin())
    }
}

/// Name and flag derivation, without candidate checks.
///
/// Candidates are the declared types verbatim; the mapped class is not
/// applied. This is all the encoder needs.
pub fn describe(
    metadata: &dyn MetadataProvider,
    class: &ClassInfo,
    field: &FieldInfo,
) -> PropertyDescriptor {
    let (candidate_types, is_intersection, nullable) = match &field.declared {
        Some(declared) => (
            declared.shape.types().to_vec(),
            declared.shape.is_intersection(),
            declared.nullable,
        ),
        None => (Vec::new(), false, true),
    };

    PropertyDescriptor {
        field_name: field.name.clone(),
        json_name: metadata
            .mapped_name(class, field)
            .unwrap_or_else(|| field.name.clone()),
        required: metadata
            .required(class, field)
            .unwrap_or_else(|| field.has_type()),
        nullable,
        omit: metadata.omit(class, field).unwrap_or(false),
        candidate_types,
        is_intersection,
    }
}

/// Resolves properties against the class hierarchy and the metadata.
pub struct PropertyResolver<'a> {
    classes: &'a dyn ClassProvider,
    metadata: &'a dyn MetadataProvider,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(classes: &'a dyn ClassProvider, metadata: &'a dyn MetadataProvider) -> Self {
        Self { classes, metadata }
    }

    pub fn describe(&self, class: &ClassInfo, field: &FieldInfo) -> PropertyDescriptor {
        describe(self.metadata, class, field)
    }

    /// Full resolution: flags plus a checked candidate set.
    pub fn resolve(&self, class: &ClassInfo, field: &FieldInfo) -> Result<PropertyDescriptor> {
        let mut descriptor = self.describe(class, field);
        self.resolve_candidates(class, field, &mut descriptor)?;
        Ok(descriptor)
    }

    /// Applies the mapped class to the declared candidates and rejects
    /// candidate sets with more than one class type.
    pub fn resolve_candidates(
        &self,
        class: &ClassInfo,
        field: &FieldInfo,
        descriptor: &mut PropertyDescriptor,
    ) -> Result<()> {
        if let Some(mapped) = self.metadata.mapped_class(class, field) {
            self.apply_mapped_class(field, &mapped, descriptor)?;
        }

        let classes = descriptor
            .candidate_types
            .iter()
            .filter(|t| !t.is_builtin())
            .count();
        if classes > 1 {
            return Err(MapperError::AmbiguousTypeDefinition(
                descriptor.json_name.clone(),
            ));
        }

        tracing::trace!(
            field = %descriptor.field_name,
            json_name = %descriptor.json_name,
            required = descriptor.required,
            nullable = descriptor.nullable,
            candidates = descriptor.candidate_types.len(),
            "Resolved property"
        );
        Ok(())
    }

    fn apply_mapped_class(
        &self,
        field: &FieldInfo,
        mapped: &str,
        descriptor: &mut PropertyDescriptor,
    ) -> Result<()> {
        let property = descriptor.json_name.as_str();
        let Some(declared) = &field.declared else {
            descriptor.candidate_types = vec![TypeRef::class(mapped)];
            descriptor.is_intersection = false;
            return Ok(());
        };

        match &declared.shape {
            TypeShape::Single(ty) => {
                if !types_match(ty.name(), mapped) {
                    return Err(MapperError::no_match(
                        property,
                        MismatchReason::Override {
                            declared: ty.name().to_string(),
                            class: mapped.to_string(),
                        },
                    ));
                }
            }
            TypeShape::Union(members) => {
                if !members.iter().any(|m| self.compatible(mapped, m)) {
                    return Err(MapperError::no_match(
                        property,
                        MismatchReason::UnionOverride {
                            class: mapped.to_string(),
                        },
                    ));
                }
                // Builtin members stay; the mapped class stands in for the class members.
                let mapped_ref = TypeRef::new(mapped);
                let mut candidates: Vec<TypeRef> =
                    members.iter().filter(|m| m.is_builtin()).cloned().collect();
                if !candidates.iter().any(|c| types_match(c.name(), mapped)) {
                    candidates.push(mapped_ref);
                }
                descriptor.candidate_types = candidates;
            }
            TypeShape::Intersection(members) => {
                if !members.iter().all(|m| self.compatible(mapped, m)) {
                    return Err(MapperError::no_match(
                        property,
                        MismatchReason::IntersectionOverride {
                            class: mapped.to_string(),
                        },
                    ));
                }
                descriptor.candidate_types = vec![TypeRef::new(mapped)];
                descriptor.is_intersection = false;
            }
        }
        Ok(())
    }

    /// Whether the mapped type can stand in for `member`.
    fn compatible(&self, mapped: &str, member: &TypeRef) -> bool {
        match member.as_builtin() {
            Some(BuiltinType::Object) => {
                types_match(mapped, member.name()) || BuiltinType::from_name(mapped).is_none()
            }
            Some(_) => types_match(mapped, member.name()),
            None => self.classes.is_a(mapped, member.name()),
        }
    }
}
