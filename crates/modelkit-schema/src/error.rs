//! Error types for schema resolution

/// Errors raised while loading or resolving model files
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Model file could not be decoded
    #[error("invalid model file: {0}")]
    InvalidModelFile(String),

    /// Two model files claim the same namespace
    #[error("namespace already registered: {0}")]
    DuplicateNamespace(String),

    /// A namespace declares a type twice
    #[error("type declared twice: {0}")]
    DuplicateDeclaration(String),

    /// Super type or field type does not resolve
    #[error("{declaration}: unresolved type reference {reference}")]
    UnresolvedType {
        declaration: String,
        reference: String,
    },

    /// Inheritance loops back on itself
    #[error("cyclic inheritance through {0}")]
    CyclicInheritance(String),

    /// Declaration extends one of a different category
    #[error("{declaration} cannot extend {super_type}: {reason}")]
    IncompatibleSuperType {
        declaration: String,
        super_type: String,
        reason: &'static str,
    },

    /// Field repeats along the inheritance chain
    #[error("{declaration}: field '{field}' declared more than once")]
    DuplicateField { declaration: String, field: String },

    /// Concept declares or inherits an identifier
    #[error("concept {0} cannot declare an identifying field")]
    IdentifiedConcept(String),

    /// Concrete resource without identifying field
    #[error("{0} has no identifying field")]
    MissingIdentifier(String),

    /// Identifying field is not a required scalar string
    #[error("{declaration}: identifying field '{field}' {reason}")]
    InvalidIdentifierField {
        declaration: String,
        field: String,
        reason: &'static str,
    },

    /// Relationship field points at a concept
    #[error("{declaration}: relationship '{field}' must point to an identified type, {target} is a concept")]
    ConceptRelationship {
        declaration: String,
        field: String,
        target: String,
    },

    /// Enum field without any value
    #[error("{declaration}: enum field '{field}' has no values")]
    EmptyEnum { declaration: String, field: String },

    /// Default literal does not fit the field
    #[error("{declaration}: invalid default for '{field}': {reason}")]
    InvalidDefault {
        declaration: String,
        field: String,
        reason: String,
    },
}
