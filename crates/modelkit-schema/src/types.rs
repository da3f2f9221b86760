//! Type references and field types
//!
//! Provides [`TypeRef`] for naming declared types across namespaces and
//! [`FieldType`] for describing what a field may hold.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Reference to a declared type
///
/// # Examples
/// - `TypeRef::new("org.acme", "Vehicle")` → `org.acme.Vehicle`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    namespace: String,
    name: String,
}

impl TypeRef {
    /// Create new type reference
    #[inline]
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Owning namespace
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Short type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified name (`namespace.Name`)
    #[inline]
    #[must_use]
    pub fn fully_qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for TypeRef {
    type Err = TypeRefError;

    /// Parse `namespace.Name`, splitting at the last dot
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, name) = s
            .rsplit_once('.')
            .ok_or_else(|| TypeRefError::MissingNamespace(s.to_string()))?;

        if namespace.is_empty() || namespace.split('.').any(str::is_empty) {
            return Err(TypeRefError::InvalidNamespace(s.to_string()));
        }
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(TypeRefError::InvalidName(s.to_string()));
        }

        Ok(Self::new(namespace, name))
    }
}

/// Errors parsing a [`TypeRef`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeRefError {
    /// No namespace separator
    #[error("type reference has no namespace: '{0}'")]
    MissingNamespace(String),

    /// Empty namespace segment
    #[error("invalid namespace in type reference: '{0}'")]
    InvalidNamespace(String),

    /// Empty or malformed type name
    #[error("invalid type name in type reference: '{0}'")]
    InvalidName(String),
}

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    /// UTF-8 text
    String,
    /// true / false
    Boolean,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    /// 64-bit float
    Double,
    /// UTC timestamp
    DateTime,
}

impl PrimitiveType {
    /// Lowercase name used in diagnostics
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Double => "double",
            Self::DateTime => "datetime",
        }
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a field may hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Scalar value
    Primitive(PrimitiveType),

    /// One of a fixed set of symbols
    Enum(Vec<String>),

    /// Embedded concept or resource (by value)
    Object(TypeRef),

    /// Typed pointer to a resource (by identifier)
    Relationship(TypeRef),
}

impl FieldType {
    /// Referenced declaration, if any
    #[inline]
    #[must_use]
    pub fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            Self::Object(r) | Self::Relationship(r) => Some(r),
            Self::Primitive(_) | Self::Enum(_) => None,
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Enum(values) => write!(f, "enum[{}]", values.join("|")),
            Self::Object(r) => write!(f, "{r}"),
            Self::Relationship(r) => write!(f, "--> {r}"),
        }
    }
}
