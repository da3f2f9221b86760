//! Structural validation for validated instances
//!
//! Each validated instance owns one [`InstanceValidator`]. It is consulted on
//! every field write and by `validate()`.

use crate::error::ValidationError;
use crate::instance::Typed;
use crate::value::FieldValue;
use indexmap::IndexMap;
use modelkit_schema::{ClassDeclaration, FieldDeclaration, FieldType, ModelManager, PrimitiveType, TypeRef};
use std::sync::Arc;

/// Checks field values against one declaration
#[derive(Debug, Clone)]
pub struct InstanceValidator {
    registry: Arc<ModelManager>,
    declaration: Arc<ClassDeclaration>,
}

impl InstanceValidator {
    /// Create validator for a declaration
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<ModelManager>, declaration: Arc<ClassDeclaration>) -> Self {
        Self {
            registry,
            declaration,
        }
    }

    /// Declaration being enforced
    #[inline]
    #[must_use]
    pub fn declaration(&self) -> &ClassDeclaration {
        &self.declaration
    }

    /// Check a single field write
    ///
    /// # Errors
    /// Returns error if the field is undeclared or the value does not fit it
    pub fn check_write(&self, name: &str, value: &FieldValue) -> Result<(), ValidationError> {
        let field = self.declared(name)?;

        if field.is_array() {
            let FieldValue::Array(items) = value else {
                return Err(self.mismatch(field, format!("{}[]", field.field_type()), value));
            };
            items.iter().try_for_each(|item| self.check_scalar(field, item))
        } else {
            if matches!(value, FieldValue::Array(_)) {
                return Err(self.mismatch(field, field.field_type().to_string(), value));
            }
            self.check_scalar(field, value)
        }
    }

    /// Check removal of a field value
    ///
    /// # Errors
    /// Returns error if the field is undeclared or required
    pub fn check_clear(&self, name: &str) -> Result<(), ValidationError> {
        let field = self.declared(name)?;
        if field.is_optional() {
            Ok(())
        } else {
            Err(ValidationError::MissingRequiredField {
                type_name: self.declaration.fully_qualified_name(),
                field: name.to_string(),
            })
        }
    }

    /// Check a complete set of field values
    ///
    /// # Errors
    /// Returns the first invalid value, or the first required field missing
    pub fn check_instance(&self, fields: &IndexMap<String, FieldValue>) -> Result<(), ValidationError> {
        for (name, value) in fields {
            self.check_write(name, value)?;
        }

        match self
            .declaration
            .fields()
            .find(|f| !f.is_optional() && !fields.contains_key(f.name()))
        {
            Some(missing) => Err(ValidationError::MissingRequiredField {
                type_name: self.declaration.fully_qualified_name(),
                field: missing.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    fn declared(&self, name: &str) -> Result<&FieldDeclaration, ValidationError> {
        self.declaration
            .field(name)
            .ok_or_else(|| ValidationError::UnknownField {
                type_name: self.declaration.fully_qualified_name(),
                field: name.to_string(),
            })
    }

    fn check_scalar(&self, field: &FieldDeclaration, value: &FieldValue) -> Result<(), ValidationError> {
        match (field.field_type(), value) {
            (FieldType::Primitive(PrimitiveType::String), FieldValue::String(s)) => {
                if self.declaration.identifier_field_name() == Some(field.name()) && s.trim().is_empty() {
                    return Err(ValidationError::BlankIdentifier {
                        type_name: self.declaration.fully_qualified_name(),
                        field: field.name().to_string(),
                    });
                }
                Ok(())
            }
            (FieldType::Primitive(PrimitiveType::Boolean), FieldValue::Boolean(_))
            | (FieldType::Primitive(PrimitiveType::Integer), FieldValue::Integer(_))
            | (FieldType::Primitive(PrimitiveType::Long), FieldValue::Long(_))
            | (FieldType::Primitive(PrimitiveType::Double), FieldValue::Double(_))
            | (FieldType::Primitive(PrimitiveType::DateTime), FieldValue::DateTime(_)) => Ok(()),
            (FieldType::Enum(values), FieldValue::Enum(v)) => {
                if values.iter().any(|e| e == v) {
                    Ok(())
                } else {
                    Err(ValidationError::UnknownEnumValue {
                        type_name: self.declaration.fully_qualified_name(),
                        field: field.name().to_string(),
                        value: v.clone(),
                    })
                }
            }
            (FieldType::Object(target), FieldValue::Concept(c)) => {
                self.check_assignable(field, c.declaration().type_ref(), target)
            }
            (FieldType::Object(target), FieldValue::Resource(r)) => {
                self.check_assignable(field, r.declaration().type_ref(), target)
            }
            (FieldType::Relationship(target), FieldValue::Relationship(rel)) => {
                self.check_assignable(field, &rel.type_ref(), target)
            }
            (expected, actual) => Err(self.mismatch(field, expected.to_string(), actual)),
        }
    }

    fn check_assignable(&self, field: &FieldDeclaration, actual: &TypeRef, expected: &TypeRef) -> Result<(), ValidationError> {
        if self.registry.is_assignable(actual, expected) {
            Ok(())
        } else {
            Err(ValidationError::NotAssignable {
                type_name: self.declaration.fully_qualified_name(),
                field: field.name().to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        }
    }

    fn mismatch(&self, field: &FieldDeclaration, expected: String, actual: &FieldValue) -> ValidationError {
        ValidationError::TypeMismatch {
            type_name: self.declaration.fully_qualified_name(),
            field: field.name().to_string(),
            expected,
            actual: actual.kind_name(),
        }
    }
}
