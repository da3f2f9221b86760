//! Error types for modelkit Core
//!
//! Provides error handling for:
//! - Field writes on validated instances
//! - Field population (generation) failures
//! - Factory request failures

use modelkit_schema::DeclarationKind;

/// Structural violations detected by a validated instance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Field is not declared by the type
    #[error("{type_name} has no field '{field}'")]
    UnknownField { type_name: String, field: String },

    /// Value kind does not fit the declared type
    #[error("{type_name}.{field}: expected {expected}, got {actual}")]
    TypeMismatch {
        type_name: String,
        field: String,
        expected: String,
        actual: &'static str,
    },

    /// Enum value outside the declared set
    #[error("{type_name}.{field}: '{value}' is not a declared enum value")]
    UnknownEnumValue {
        type_name: String,
        field: String,
        value: String,
    },

    /// Nested object or pointer of an incompatible type
    #[error("{type_name}.{field}: {actual} is not assignable to {expected}")]
    NotAssignable {
        type_name: String,
        field: String,
        expected: String,
        actual: String,
    },

    /// Required field is absent
    #[error("{type_name}.{field} is required")]
    MissingRequiredField { type_name: String, field: String },

    /// Field fixed at creation
    #[error("{type_name}.{field} is read-only")]
    ReadOnlyField { type_name: String, field: String },

    /// Identifying field set to empty or whitespace text
    #[error("{type_name}.{field}: identifier must be non-empty text")]
    BlankIdentifier { type_name: String, field: String },
}

/// Failures raised while populating fields
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// Generated value rejected by the instance
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Referenced type is not registered
    #[error("unresolved type {0}")]
    UnresolvedType(String),

    /// Abstract field type without concrete subtype
    #[error("no concrete subtype of {0} to instantiate")]
    NoConcreteSubtype(String),

    /// Nesting too deep (usually a recursive model)
    #[error("recursion limit {limit} reached while populating {type_name}")]
    RecursionLimit { type_name: String, limit: usize },

    /// Nested factory call failed
    #[error("nested construction failed: {0}")]
    Nested(Box<FactoryError>),

    /// Failure reported by a custom populator
    #[error("population strategy failed: {0}")]
    Strategy(String),
}

impl From<FactoryError> for PopulationError {
    fn from(err: FactoryError) -> Self {
        Self::Nested(Box::new(err))
    }
}

/// Main factory error type
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// Identifier absent, empty or whitespace only
    #[error("invalid identifier {identifier:?} for {type_name}")]
    InvalidIdentifier {
        type_name: String,
        identifier: Option<String>,
    },

    /// Namespace not known to the registry
    #[error("namespace is not registered: {0}")]
    UnregisteredNamespace(String),

    /// Type not declared in the namespace
    #[error("type {type_name} is not declared in namespace {namespace}")]
    UndeclaredType { namespace: String, type_name: String },

    /// Abstract declarations cannot be instantiated
    #[error("cannot instantiate abstract type {0}")]
    AbstractType(String),

    /// Declaration kind does not match the requested operation
    #[error("{type_name} is declared as {actual}, not {expected}; use Factory::{suggestion}")]
    WrongKind {
        type_name: String,
        expected: DeclarationKind,
        actual: DeclarationKind,
        suggestion: &'static str,
    },

    /// Transaction requested without namespace
    #[error("transaction namespace is missing")]
    MissingNamespace,

    /// Transaction requested without type
    #[error("transaction type is missing")]
    MissingType,

    /// Field population failed
    #[error(transparent)]
    Population(#[from] PopulationError),
}

impl FactoryError {
    /// Check if the request itself contradicts the registry
    ///
    /// Population failures are not request errors.
    #[inline]
    #[must_use]
    pub fn is_schema_violation(&self) -> bool {
        !matches!(self, Self::Population(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_kind_points_to_other_operation() {
        let err = FactoryError::WrongKind {
            type_name: "org.acme.Address".to_string(),
            expected: DeclarationKind::Resource,
            actual: DeclarationKind::Concept,
            suggestion: "create_concept",
        };
        let msg = err.to_string();
        assert!(msg.contains("declared as concept"));
        assert!(msg.contains("create_concept"));
    }

    #[test]
    fn population_errors_are_transparent() {
        let inner = ValidationError::MissingRequiredField {
            type_name: "org.acme.Car".to_string(),
            field: "vin".to_string(),
        };
        let err = FactoryError::from(PopulationError::from(inner.clone()));
        assert_eq!(err.to_string(), inner.to_string());
        assert!(!err.is_schema_violation());
        assert!(FactoryError::MissingType.is_schema_violation());
    }

    #[test]
    fn nested_factory_error_boxes() {
        let err = PopulationError::from(FactoryError::AbstractType("org.acme.Asset".to_string()));
        assert!(matches!(err, PopulationError::Nested(_)));
        assert!(err.to_string().contains("org.acme.Asset"));
    }
}
