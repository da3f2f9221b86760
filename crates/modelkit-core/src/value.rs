//! Field values held by instances

use crate::instance::{Concept, Relationship, Resource};
use chrono::{DateTime, Utc};
use modelkit_schema::{FieldDeclaration, FieldType, PrimitiveType};

/// Value stored in an instance field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Boolean(bool),
    Integer(i32),
    Long(i64),
    Double(f64),
    DateTime(DateTime<Utc>),
    Enum(String),
    Concept(Box<Concept>),
    Resource(Box<Resource>),
    Relationship(Relationship),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Short name of the value's kind, for diagnostics
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::DateTime(_) => "datetime",
            Self::Enum(_) => "enum",
            Self::Concept(_) => "concept",
            Self::Resource(_) => "resource",
            Self::Relationship(_) => "relationship",
            Self::Array(_) => "array",
        }
    }

    /// Text of a `String` or `Enum` value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of an `Array` value
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Convert a declared default literal
    ///
    /// Returns `None` when the field has no default. Literals are checked
    /// against the field type when the registry is built, so any literal that
    /// reaches here converts.
    #[must_use]
    pub fn from_default(field: &FieldDeclaration) -> Option<Self> {
        let literal = field.default_value()?;
        match field.field_type() {
            FieldType::Primitive(PrimitiveType::String) => literal.as_str().map(|s| Self::String(s.to_string())),
            FieldType::Primitive(PrimitiveType::Boolean) => literal.as_bool().map(Self::Boolean),
            FieldType::Primitive(PrimitiveType::Integer) => literal
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Self::Integer),
            FieldType::Primitive(PrimitiveType::Long) => literal.as_i64().map(Self::Long),
            FieldType::Primitive(PrimitiveType::Double) => literal.as_f64().map(Self::Double),
            FieldType::Primitive(PrimitiveType::DateTime) => literal
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| Self::DateTime(dt.with_timezone(&Utc))),
            FieldType::Enum(_) => literal.as_str().map(|s| Self::Enum(s.to_string())),
            FieldType::Object(_) | FieldType::Relationship(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Concept> for FieldValue {
    fn from(value: Concept) -> Self {
        Self::Concept(Box::new(value))
    }
}

impl From<Resource> for FieldValue {
    fn from(value: Resource) -> Self {
        Self::Resource(Box::new(value))
    }
}

impl From<Relationship> for FieldValue {
    fn from(value: Relationship) -> Self {
        Self::Relationship(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        Self::Array(value)
    }
}
