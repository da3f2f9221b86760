//! Resolved class declarations
//!
//! A [`ClassDeclaration`] is produced by [`ModelManager`](crate::ModelManager)
//! from a [`ClassDefinition`](crate::ClassDefinition) once inheritance has been
//! flattened. Its [`DeclarationKind`] is computed at that point and never
//! changes afterwards.

use crate::definition::{DeclarationCategory, FieldDeclaration};
use crate::types::TypeRef;
use indexmap::IndexMap;
use std::fmt::{self, Display, Formatter};

/// What the factory may build from a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// Concrete identified business object
    Resource,
    /// Concrete value object without identity
    Concept,
    /// Concrete timestamped resource
    Transaction,
    /// Cannot be instantiated
    Abstract,
}

impl DeclarationKind {
    /// Kind for a concrete declaration of the given category
    #[inline]
    #[must_use]
    pub fn concrete(category: DeclarationCategory) -> Self {
        match category {
            DeclarationCategory::Concept => Self::Concept,
            DeclarationCategory::Resource => Self::Resource,
            DeclarationCategory::Transaction => Self::Transaction,
        }
    }

    /// Lowercase name used in diagnostics
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Concept => "concept",
            Self::Transaction => "transaction",
            Self::Abstract => "abstract",
        }
    }
}

impl Display for DeclarationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved declaration
///
/// # Invariants
/// - `fields` holds inherited fields first, in ancestor order, then own fields
/// - `identifier` is `None` for concepts and always names a field in `fields`
/// - `kind` is `Abstract` iff the declaration was authored abstract
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    type_ref: TypeRef,
    kind: DeclarationKind,
    category: DeclarationCategory,
    super_type: Option<TypeRef>,
    identifier: Option<String>,
    fields: IndexMap<String, FieldDeclaration>,
}

impl ClassDeclaration {
    pub(crate) fn new(
        type_ref: TypeRef,
        kind: DeclarationKind,
        category: DeclarationCategory,
        super_type: Option<TypeRef>,
        identifier: Option<String>,
        fields: IndexMap<String, FieldDeclaration>,
    ) -> Self {
        Self {
            type_ref,
            kind,
            category,
            super_type,
            identifier,
            fields,
        }
    }

    /// Reference to this declaration
    #[inline]
    #[must_use]
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Fully-qualified name (`namespace.Name`)
    #[inline]
    #[must_use]
    pub fn fully_qualified_name(&self) -> String {
        self.type_ref.fully_qualified_name()
    }

    /// Owning namespace
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.type_ref.namespace()
    }

    /// Short type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.type_ref.name()
    }

    /// Kind resolved at load time
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    /// Authored category (also known for abstract declarations)
    #[inline]
    #[must_use]
    pub fn category(&self) -> DeclarationCategory {
        self.category
    }

    #[inline]
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.kind == DeclarationKind::Abstract
    }

    #[inline]
    #[must_use]
    pub fn is_concept(&self) -> bool {
        self.category == DeclarationCategory::Concept
    }

    #[inline]
    #[must_use]
    pub fn is_transaction(&self) -> bool {
        self.category == DeclarationCategory::Transaction
    }

    /// Parent declaration
    #[inline]
    #[must_use]
    pub fn super_type(&self) -> Option<&TypeRef> {
        self.super_type.as_ref()
    }

    /// Name of the identifying field (`None` for concepts)
    #[inline]
    #[must_use]
    pub fn identifier_field_name(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Identifying field declaration
    #[inline]
    #[must_use]
    pub fn identifier_field(&self) -> Option<&FieldDeclaration> {
        self.identifier.as_deref().and_then(|name| self.fields.get(name))
    }

    /// All fields, inherited first
    pub fn fields(&self) -> impl Iterator<Item = &FieldDeclaration> {
        self.fields.values()
    }

    /// Field by name (own or inherited)
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.get(name)
    }

    /// Number of fields, inherited included
    #[inline]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl Display for ClassDeclaration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.type_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveType;

    fn vehicle() -> ClassDeclaration {
        let mut fields = IndexMap::new();
        fields.insert(
            "vin".to_string(),
            FieldDeclaration::primitive("vin", PrimitiveType::String),
        );
        fields.insert(
            "year".to_string(),
            FieldDeclaration::primitive("year", PrimitiveType::Integer),
        );
        ClassDeclaration::new(
            TypeRef::new("org.acme", "Vehicle"),
            DeclarationKind::Resource,
            DeclarationCategory::Resource,
            None,
            Some("vin".to_string()),
            fields,
        )
    }

    #[test]
    fn declaration_accessors() {
        let decl = vehicle();
        assert_eq!(decl.fully_qualified_name(), "org.acme.Vehicle");
        assert_eq!(decl.identifier_field_name(), Some("vin"));
        assert_eq!(decl.identifier_field().map(FieldDeclaration::name), Some("vin"));
        assert_eq!(decl.field_count(), 2);
        assert!(!decl.is_abstract());
        assert!(!decl.is_concept());
        assert!(!decl.is_transaction());
    }

    #[test]
    fn fields_keep_order() {
        let decl = vehicle();
        let names: Vec<_> = decl.fields().map(FieldDeclaration::name).collect();
        assert_eq!(names, ["vin", "year"]);
    }

    #[test]
    fn kind_for_category() {
        assert_eq!(
            DeclarationKind::concrete(DeclarationCategory::Transaction),
            DeclarationKind::Transaction
        );
        assert_eq!(DeclarationKind::Abstract.to_string(), "abstract");
    }
}
