//! Schema registry
//!
//! Provides [`ModelManager`], the read-only registry the instance factory
//! consults, and [`ModelManagerBuilder`] which resolves authored model files
//! into [`ClassDeclaration`]s in one pass.

use crate::declaration::{ClassDeclaration, DeclarationKind};
use crate::definition::{ClassDefinition, DeclarationCategory, FieldDeclaration, ModelFile};
use crate::error::SchemaError;
use crate::types::{FieldType, PrimitiveType, TypeRef};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolved declarations of one namespace
#[derive(Debug, Clone, Default)]
pub struct Schema {
    namespace: String,
    declarations: IndexMap<String, Arc<ClassDeclaration>>,
}

impl Schema {
    /// Namespace name
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Check whether `name` is declared here
    #[inline]
    #[must_use]
    pub fn is_type_declared(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    /// Declaration by short name
    #[inline]
    #[must_use]
    pub fn get_declaration(&self, name: &str) -> Option<&Arc<ClassDeclaration>> {
        self.declarations.get(name)
    }

    /// Declarations in authoring order
    pub fn declarations(&self) -> impl Iterator<Item = &Arc<ClassDeclaration>> {
        self.declarations.values()
    }

    /// Number of declarations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Check if namespace declares nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Registry mapping namespaces to resolved schemas
///
/// Immutable once built; share it as `Arc<ModelManager>`.
#[derive(Debug, Clone, Default)]
pub struct ModelManager {
    schemas: IndexMap<String, Schema>,
}

impl ModelManager {
    /// Start building a registry
    #[inline]
    #[must_use]
    pub fn builder() -> ModelManagerBuilder {
        ModelManagerBuilder::default()
    }

    /// Schema registered for `namespace`
    #[inline]
    #[must_use]
    pub fn resolve_namespace(&self, namespace: &str) -> Option<&Schema> {
        self.schemas.get(namespace)
    }

    /// Declaration for a type reference
    #[inline]
    #[must_use]
    pub fn get_declaration(&self, type_ref: &TypeRef) -> Option<&Arc<ClassDeclaration>> {
        self.resolve_namespace(type_ref.namespace())
            .and_then(|schema| schema.get_declaration(type_ref.name()))
    }

    /// Registered namespace names
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Every declaration across namespaces, in registration order
    pub fn declarations(&self) -> impl Iterator<Item = &Arc<ClassDeclaration>> {
        self.schemas.values().flat_map(Schema::declarations)
    }

    /// Check whether `sub` is `sup` or inherits from it
    #[must_use]
    pub fn is_assignable(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        let mut current = Some(sub);
        while let Some(type_ref) = current {
            if type_ref == sup {
                return true;
            }
            current = self
                .get_declaration(type_ref)
                .and_then(|decl| decl.super_type());
        }
        false
    }

    /// Concrete declarations assignable to `target`, in registration order
    ///
    /// Includes `target` itself when it is concrete.
    #[must_use]
    pub fn concrete_subtypes(&self, target: &TypeRef) -> Vec<&Arc<ClassDeclaration>> {
        self.declarations()
            .filter(|decl| !decl.is_abstract() && self.is_assignable(decl.type_ref(), target))
            .collect()
    }
}

/// Collects model files and resolves them into a [`ModelManager`]
#[derive(Debug, Default)]
pub struct ModelManagerBuilder {
    files: Vec<ModelFile>,
}

impl ModelManagerBuilder {
    /// Add a model file
    #[inline]
    #[must_use]
    pub fn add_model_file(mut self, file: ModelFile) -> Self {
        self.files.push(file);
        self
    }

    /// Resolve every file together
    ///
    /// # Errors
    /// Returns the first structural problem found, see [`SchemaError`]
    pub fn build(self) -> Result<ModelManager, SchemaError> {
        let mut definitions: HashMap<TypeRef, &ClassDefinition> = HashMap::new();
        let mut namespaces: IndexSet<&str> = IndexSet::new();

        for file in &self.files {
            if !namespaces.insert(file.namespace.as_str()) {
                return Err(SchemaError::DuplicateNamespace(file.namespace.clone()));
            }
            for def in &file.declarations {
                let type_ref = file.type_ref(def.name.clone());
                if definitions.insert(type_ref.clone(), def).is_some() {
                    return Err(SchemaError::DuplicateDeclaration(type_ref.to_string()));
                }
            }
        }

        let resolver = Resolver { definitions };
        let mut schemas = IndexMap::new();

        for file in &self.files {
            let mut declarations = IndexMap::new();
            for def in &file.declarations {
                let type_ref = file.type_ref(def.name.clone());
                let declaration = resolver.resolve(&type_ref, def)?;
                declarations.insert(def.name.clone(), Arc::new(declaration));
            }

            tracing::debug!(
                "Resolved namespace {} ({} declarations)",
                file.namespace,
                declarations.len()
            );
            schemas.insert(
                file.namespace.clone(),
                Schema {
                    namespace: file.namespace.clone(),
                    declarations,
                },
            );
        }

        tracing::info!("Model manager built with {} namespaces", schemas.len());
        Ok(ModelManager { schemas })
    }
}

/// Resolution over the full set of authored definitions
struct Resolver<'a> {
    definitions: HashMap<TypeRef, &'a ClassDefinition>,
}

impl<'a> Resolver<'a> {
    fn resolve(&self, type_ref: &TypeRef, def: &'a ClassDefinition) -> Result<ClassDeclaration, SchemaError> {
        let fqn = type_ref.to_string();
        let chain = self.ancestry(type_ref, def)?;

        // Root ancestor first so inherited fields come before own fields.
        let mut fields: IndexMap<String, FieldDeclaration> = IndexMap::new();
        let mut identifier: Option<&str> = None;
        for ancestor in chain.iter().rev() {
            for field in &ancestor.fields {
                if fields.insert(field.name().to_string(), field.clone()).is_some() {
                    return Err(SchemaError::DuplicateField {
                        declaration: fqn,
                        field: field.name().to_string(),
                    });
                }
            }
            if let Some(id) = ancestor.identified_by.as_deref() {
                identifier = Some(id);
            }
        }

        self.check_identifier(&fqn, def, identifier, &fields)?;
        self.check_fields(&fqn, &fields)?;

        let kind = if def.is_abstract {
            DeclarationKind::Abstract
        } else {
            DeclarationKind::concrete(def.category)
        };

        Ok(ClassDeclaration::new(
            type_ref.clone(),
            kind,
            def.category,
            def.super_type.clone(),
            identifier.map(str::to_string),
            fields,
        ))
    }

    /// Definition followed by its ancestors, most-derived first
    fn ancestry(&self, type_ref: &TypeRef, def: &'a ClassDefinition) -> Result<Vec<&'a ClassDefinition>, SchemaError> {
        let mut chain = vec![def];
        let mut seen = IndexSet::new();
        seen.insert(type_ref.clone());

        let mut current = def;
        while let Some(super_ref) = &current.super_type {
            let parent = self.definitions.get(super_ref).copied().ok_or_else(|| {
                SchemaError::UnresolvedType {
                    declaration: type_ref.to_string(),
                    reference: super_ref.to_string(),
                }
            })?;

            if !seen.insert(super_ref.clone()) {
                return Err(SchemaError::CyclicInheritance(type_ref.to_string()));
            }
            if parent.category != current.category {
                return Err(SchemaError::IncompatibleSuperType {
                    declaration: type_ref.to_string(),
                    super_type: super_ref.to_string(),
                    reason: category_mismatch(current.category),
                });
            }

            chain.push(parent);
            current = parent;
        }

        Ok(chain)
    }

    fn check_identifier(
        &self,
        fqn: &str,
        def: &ClassDefinition,
        identifier: Option<&str>,
        fields: &IndexMap<String, FieldDeclaration>,
    ) -> Result<(), SchemaError> {
        match (def.category, identifier) {
            (DeclarationCategory::Concept, Some(_)) => {
                Err(SchemaError::IdentifiedConcept(fqn.to_string()))
            }
            (DeclarationCategory::Concept, None) => Ok(()),
            (_, None) if def.is_abstract => Ok(()),
            (_, None) => Err(SchemaError::MissingIdentifier(fqn.to_string())),
            (_, Some(name)) => {
                let invalid = |reason| SchemaError::InvalidIdentifierField {
                    declaration: fqn.to_string(),
                    field: name.to_string(),
                    reason,
                };
                let field = fields.get(name).ok_or_else(|| invalid("is not declared"))?;
                if field.field_type() != &FieldType::Primitive(PrimitiveType::String) {
                    return Err(invalid("must be a String"));
                }
                if field.is_array() {
                    return Err(invalid("must not be an array"));
                }
                if field.is_optional() {
                    return Err(invalid("must not be optional"));
                }
                if field.default_value().is_some() {
                    return Err(invalid("must not have a default"));
                }
                Ok(())
            }
        }
    }

    fn check_fields(&self, fqn: &str, fields: &IndexMap<String, FieldDeclaration>) -> Result<(), SchemaError> {
        for field in fields.values() {
            field.check_default().map_err(|reason| SchemaError::InvalidDefault {
                declaration: fqn.to_string(),
                field: field.name().to_string(),
                reason,
            })?;

            if matches!(field.field_type(), FieldType::Enum(values) if values.is_empty()) {
                return Err(SchemaError::EmptyEnum {
                    declaration: fqn.to_string(),
                    field: field.name().to_string(),
                });
            }

            let Some(target) = field.field_type().type_ref() else {
                continue;
            };
            let target_def = self.definitions.get(target).ok_or_else(|| SchemaError::UnresolvedType {
                declaration: fqn.to_string(),
                reference: target.to_string(),
            })?;

            if matches!(field.field_type(), FieldType::Relationship(_))
                && target_def.category == DeclarationCategory::Concept
            {
                return Err(SchemaError::ConceptRelationship {
                    declaration: fqn.to_string(),
                    field: field.name().to_string(),
                    target: target.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn category_mismatch(category: DeclarationCategory) -> &'static str {
    match category {
        DeclarationCategory::Concept => "concepts may only extend concepts",
        DeclarationCategory::Resource => "resources may only extend resources",
        DeclarationCategory::Transaction => "transactions may only extend transactions",
    }
}
