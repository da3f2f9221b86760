//! Authored model definitions
//!
//! [`ModelFile`], [`ClassDefinition`] and [`FieldDeclaration`] are the
//! unresolved input to [`ModelManager`](crate::ModelManager). They can be
//! built in code or deserialized from JSON.

use crate::error::SchemaError;
use crate::types::{FieldType, PrimitiveType, TypeRef};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Declared field of a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    name: String,

    #[serde(rename = "type")]
    field_type: FieldType,

    #[serde(default)]
    array: bool,

    #[serde(default)]
    optional: bool,

    /// Default literal, only for scalar primitive and enum fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<JsonValue>,
}

impl FieldDeclaration {
    /// Create required scalar field
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            array: false,
            optional: false,
            default: None,
        }
    }

    /// Create required primitive field
    #[inline]
    #[must_use]
    pub fn primitive(name: impl Into<String>, primitive: PrimitiveType) -> Self {
        Self::new(name, FieldType::Primitive(primitive))
    }

    /// Create required enum field
    #[must_use]
    pub fn enumeration<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            FieldType::Enum(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Create required embedded-object field
    #[inline]
    #[must_use]
    pub fn object(name: impl Into<String>, target: TypeRef) -> Self {
        Self::new(name, FieldType::Object(target))
    }

    /// Create required relationship field
    #[inline]
    #[must_use]
    pub fn relationship(name: impl Into<String>, target: TypeRef) -> Self {
        Self::new(name, FieldType::Relationship(target))
    }

    /// Mark as array
    #[inline]
    #[must_use]
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Mark as optional
    #[inline]
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Attach default literal
    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: JsonValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type
    #[inline]
    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Whether the field holds a list
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.array
    }

    /// Whether the field may be absent
    #[inline]
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Default literal
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&JsonValue> {
        self.default.as_ref()
    }

    /// Check the default literal against the declared type
    pub(crate) fn check_default(&self) -> Result<(), String> {
        let Some(value) = &self.default else {
            return Ok(());
        };
        if self.array {
            return Err("defaults are not supported on array fields".to_string());
        }

        let ok = match &self.field_type {
            FieldType::Primitive(PrimitiveType::String) => value.is_string(),
            FieldType::Primitive(PrimitiveType::Boolean) => value.is_boolean(),
            FieldType::Primitive(PrimitiveType::Integer) => value
                .as_i64()
                .is_some_and(|v| i32::try_from(v).is_ok()),
            FieldType::Primitive(PrimitiveType::Long) => value.is_i64(),
            FieldType::Primitive(PrimitiveType::Double) => value.is_number(),
            FieldType::Primitive(PrimitiveType::DateTime) => value
                .as_str()
                .is_some_and(|v| DateTime::parse_from_rfc3339(v).is_ok()),
            FieldType::Enum(values) => value
                .as_str()
                .is_some_and(|v| values.iter().any(|e| e == v)),
            FieldType::Object(_) | FieldType::Relationship(_) => {
                return Err("defaults are only supported on primitive and enum fields".to_string())
            }
        };

        if ok {
            Ok(())
        } else {
            Err(format!("{value} is not a valid {}", self.field_type))
        }
    }
}

/// Broad category of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationCategory {
    /// Structured value without identity
    Concept,
    /// Identified business object
    Resource,
    /// Identified, timestamped resource
    Transaction,
}

/// Authored class declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    /// Short type name
    pub name: String,

    /// Whether instances may be created directly
    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,

    /// Concept, resource or transaction
    pub category: DeclarationCategory,

    /// Parent declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_type: Option<TypeRef>,

    /// Name of the identifying field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified_by: Option<String>,

    /// Own fields (inherited ones are added at resolution)
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
}

impl ClassDefinition {
    /// Create definition of the given category
    #[must_use]
    pub fn new(name: impl Into<String>, category: DeclarationCategory) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
            category,
            super_type: None,
            identified_by: None,
            fields: Vec::new(),
        }
    }

    /// Create concept definition
    #[inline]
    #[must_use]
    pub fn concept(name: impl Into<String>) -> Self {
        Self::new(name, DeclarationCategory::Concept)
    }

    /// Create resource definition
    #[inline]
    #[must_use]
    pub fn resource(name: impl Into<String>) -> Self {
        Self::new(name, DeclarationCategory::Resource)
    }

    /// Create transaction definition
    #[inline]
    #[must_use]
    pub fn transaction(name: impl Into<String>) -> Self {
        Self::new(name, DeclarationCategory::Transaction)
    }

    /// Mark as abstract
    #[inline]
    #[must_use]
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Set parent declaration
    #[inline]
    #[must_use]
    pub fn extends(mut self, super_type: TypeRef) -> Self {
        self.super_type = Some(super_type);
        self
    }

    /// Set identifying field
    #[inline]
    #[must_use]
    pub fn identified_by(mut self, field: impl Into<String>) -> Self {
        self.identified_by = Some(field.into());
        self
    }

    /// Append field
    #[inline]
    #[must_use]
    pub fn field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }
}

/// All declarations of one namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    /// Namespace shared by every declaration in the file
    pub namespace: String,

    /// Declarations in authoring order
    #[serde(default)]
    pub declarations: Vec<ClassDefinition>,
}

impl ModelFile {
    /// Create empty model file
    #[inline]
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            declarations: Vec::new(),
        }
    }

    /// Append declaration
    #[inline]
    #[must_use]
    pub fn declare(mut self, definition: ClassDefinition) -> Self {
        self.declarations.push(definition);
        self
    }

    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or does not describe a model file
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|e| SchemaError::InvalidModelFile(e.to_string()))
    }

    /// Type reference for a declaration in this file
    #[inline]
    #[must_use]
    pub fn type_ref(&self, name: impl Into<String>) -> TypeRef {
        TypeRef::new(self.namespace.clone(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_builder_flags() {
        let f = FieldDeclaration::primitive("tags", PrimitiveType::String)
            .array()
            .optional();
        assert!(f.is_array());
        assert!(f.is_optional());
        assert!(f.default_value().is_none());
    }

    #[test]
    fn default_matches_primitive() {
        let f = FieldDeclaration::primitive("count", PrimitiveType::Integer).with_default(json!(3));
        assert!(f.check_default().is_ok());

        let f = FieldDeclaration::primitive("count", PrimitiveType::Integer)
            .with_default(json!(i64::MAX));
        assert!(f.check_default().is_err());

        let f = FieldDeclaration::primitive("ratio", PrimitiveType::Double).with_default(json!(1));
        assert!(f.check_default().is_ok());
    }

    #[test]
    fn default_datetime_must_be_rfc3339() {
        let f = FieldDeclaration::primitive("at", PrimitiveType::DateTime)
            .with_default(json!("2024-01-01T00:00:00Z"));
        assert!(f.check_default().is_ok());

        let f = FieldDeclaration::primitive("at", PrimitiveType::DateTime).with_default(json!("yesterday"));
        assert!(f.check_default().is_err());
    }

    #[test]
    fn default_matches_enum_member() {
        let f = FieldDeclaration::enumeration("color", ["RED", "GREEN"]).with_default(json!("GREEN"));
        assert!(f.check_default().is_ok());

        let f = FieldDeclaration::enumeration("color", ["RED", "GREEN"]).with_default(json!("BLUE"));
        assert!(f.check_default().is_err());
    }

    #[test]
    fn default_rejected_on_arrays_and_objects() {
        let f = FieldDeclaration::primitive("tags", PrimitiveType::String)
            .array()
            .with_default(json!("x"));
        assert!(f.check_default().is_err());

        let f = FieldDeclaration::object("address", TypeRef::new("org.acme", "Address"))
            .with_default(json!({}));
        assert!(f.check_default().is_err());
    }

    #[test]
    fn model_file_from_json() {
        let file = ModelFile::from_json(
            r#"{
                "namespace": "org.acme",
                "declarations": [
                    {
                        "name": "Driver",
                        "category": "resource",
                        "identified_by": "licence",
                        "fields": [
                            { "name": "licence", "type": { "primitive": "String" } },
                            { "name": "age", "type": { "primitive": "Integer" }, "optional": true }
                        ]
                    },
                    { "name": "Base", "category": "concept", "abstract": true }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(file.namespace, "org.acme");
        assert_eq!(file.declarations.len(), 2);
        assert_eq!(file.declarations[0].identified_by.as_deref(), Some("licence"));
        assert!(file.declarations[0].fields[1].is_optional());
        assert!(file.declarations[1].is_abstract);
    }

    #[test]
    fn model_file_from_bad_json() {
        let result = ModelFile::from_json(r#"{ "declarations": [] }"#);
        assert!(matches!(result, Err(SchemaError::InvalidModelFile(_))));
    }
}
