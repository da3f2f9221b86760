//! Instance factory
//!
//! The single entry point that turns a `(namespace, type, identifier)`
//! request into a typed instance.
//!
//! # Workflow
//! 1. Check the request against the registry
//! 2. Create a validated or plain instance
//! 3. Assign declared default literals
//! 4. Populate fields when generation is requested
//! 5. Force the identifier (resources and transactions)

use crate::error::{FactoryError, PopulationError, ValidationError};
use crate::generator::{DefaultValueGenerator, SampleValueGenerator, ValueGenerator};
use crate::identifier::{IdentifierSource, UuidV4Source};
use crate::instance::{Concept, InstanceData, Relationship, Resource, Transaction, Typed};
use crate::options::{FactoryOptions, GenerationStrategy};
use crate::populate::{InstanceGenerator, PopulationContext, Populator};
use crate::value::FieldValue;
use chrono::Utc;
use modelkit_schema::{ClassDeclaration, DeclarationKind, ModelManager};
use std::sync::Arc;

/// Creates instances of registered types
///
/// Cheap to clone and safe to share across threads. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct Factory {
    registry: Arc<ModelManager>,
    identifiers: Arc<dyn IdentifierSource>,
    populator: Arc<dyn Populator>,
}

impl Factory {
    /// Create factory with UUID identifiers and the stock populator
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<ModelManager>) -> Self {
        Self::builder(registry).build()
    }

    /// Start a builder with the stock identifier source and populator
    #[inline]
    #[must_use]
    pub fn builder(registry: Arc<ModelManager>) -> FactoryBuilder {
        FactoryBuilder {
            registry,
            identifiers: Arc::new(UuidV4Source),
            populator: Arc::new(InstanceGenerator),
        }
    }

    /// Registry consulted by every request
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &ModelManager {
        &self.registry
    }

    /// Create a resource
    ///
    /// The identifying field always holds `identifier` on return, whatever
    /// population wrote into it.
    ///
    /// # Errors
    /// - [`FactoryError::InvalidIdentifier`] if `identifier` is absent or blank
    /// - [`FactoryError::UnregisteredNamespace`] / [`FactoryError::UndeclaredType`]
    /// - [`FactoryError::AbstractType`] for abstract declarations
    /// - [`FactoryError::WrongKind`] for concepts
    /// - [`FactoryError::Population`] if field population fails
    pub fn create_resource(
        &self,
        namespace: &str,
        type_name: &str,
        identifier: Option<&str>,
        options: &FactoryOptions,
    ) -> Result<Resource, FactoryError> {
        tracing::debug!("Creating resource {}.{} ({:?})", namespace, type_name, identifier);

        let Some(identifier) = identifier.filter(|id| !id.trim().is_empty()) else {
            tracing::debug!("Rejected {}.{}: invalid identifier {:?}", namespace, type_name, identifier);
            return Err(FactoryError::InvalidIdentifier {
                type_name: format!("{namespace}.{type_name}"),
                identifier: identifier.map(str::to_string),
            });
        };

        let declaration = self.lookup(namespace, type_name)?;
        match declaration.kind() {
            DeclarationKind::Abstract => return Err(reject(FactoryError::AbstractType(declaration.fully_qualified_name()))),
            DeclarationKind::Concept => {
                return Err(reject(FactoryError::WrongKind {
                    type_name: declaration.fully_qualified_name(),
                    expected: DeclarationKind::Resource,
                    actual: DeclarationKind::Concept,
                    suggestion: "create_concept",
                }))
            }
            DeclarationKind::Resource | DeclarationKind::Transaction => {}
        }

        let mut resource = Resource::new(self.instance_data(declaration, options));
        Self::assign_field_defaults(&mut resource).map_err(PopulationError::from)?;
        self.populate(&mut resource, options)?;
        resource.force_identifier(identifier);

        Ok(resource)
    }

    /// Create a concept
    ///
    /// # Errors
    /// - [`FactoryError::UnregisteredNamespace`] / [`FactoryError::UndeclaredType`]
    /// - [`FactoryError::AbstractType`] for abstract declarations
    /// - [`FactoryError::WrongKind`] for resources and transactions
    /// - [`FactoryError::Population`] if field population fails
    pub fn create_concept(
        &self,
        namespace: &str,
        type_name: &str,
        options: &FactoryOptions,
    ) -> Result<Concept, FactoryError> {
        tracing::debug!("Creating concept {}.{}", namespace, type_name);

        let declaration = self.lookup(namespace, type_name)?;
        match declaration.kind() {
            DeclarationKind::Abstract => return Err(reject(FactoryError::AbstractType(declaration.fully_qualified_name()))),
            kind @ (DeclarationKind::Resource | DeclarationKind::Transaction) => {
                return Err(reject(FactoryError::WrongKind {
                    type_name: declaration.fully_qualified_name(),
                    expected: DeclarationKind::Concept,
                    actual: kind,
                    suggestion: "create_resource",
                }))
            }
            DeclarationKind::Concept => {}
        }

        let mut concept = Concept::new(self.instance_data(declaration, options));
        Self::assign_field_defaults(&mut concept).map_err(PopulationError::from)?;
        self.populate(&mut concept, options)?;

        Ok(concept)
    }

    /// Create a pointer to a resource
    ///
    /// Only the type is checked. The identifier is kept verbatim and the
    /// target is not required to exist.
    ///
    /// # Errors
    /// - [`FactoryError::UnregisteredNamespace`] / [`FactoryError::UndeclaredType`]
    pub fn create_relationship(
        &self,
        namespace: &str,
        type_name: &str,
        identifier: &str,
    ) -> Result<Relationship, FactoryError> {
        tracing::debug!("Creating relationship {}.{}#{}", namespace, type_name, identifier);

        let declaration = self.lookup(namespace, type_name)?;
        Ok(Relationship::new(declaration.namespace(), declaration.name(), identifier))
    }

    /// Create a timestamped transaction
    ///
    /// A fresh identifier is drawn from the identifier source when none is
    /// given. The timestamp is taken after the identifier is assigned.
    ///
    /// # Errors
    /// - [`FactoryError::MissingNamespace`] / [`FactoryError::MissingType`] for blank input
    /// - everything [`create_resource`](Self::create_resource) returns
    /// - [`FactoryError::WrongKind`] if the type is not a transaction
    pub fn create_transaction(
        &self,
        namespace: &str,
        type_name: &str,
        identifier: Option<&str>,
        options: &FactoryOptions,
    ) -> Result<Transaction, FactoryError> {
        if namespace.trim().is_empty() {
            return Err(reject(FactoryError::MissingNamespace));
        }
        if type_name.trim().is_empty() {
            return Err(reject(FactoryError::MissingType));
        }

        let identifier = identifier.map_or_else(|| self.identifiers.next_identifier(), str::to_string);
        let resource = self.create_resource(namespace, type_name, Some(&identifier), options)?;

        let kind = resource.declaration().kind();
        if kind != DeclarationKind::Transaction {
            return Err(reject(FactoryError::WrongKind {
                type_name: resource.fully_qualified_type(),
                expected: DeclarationKind::Transaction,
                actual: kind,
                suggestion: "create_resource",
            }));
        }

        Ok(Transaction::new(resource, Utc::now()))
    }

    /// Set every field that declares a default literal
    ///
    /// Fields without a default and read-only fields are left untouched.
    /// Running it twice gives the same field values as running it once.
    ///
    /// # Errors
    /// Returns error if a validated instance rejects a default
    pub fn assign_field_defaults(target: &mut dyn Typed) -> Result<(), ValidationError> {
        let declaration = Arc::clone(target.declaration());
        for field in declaration.fields() {
            if target.is_read_only(field.name()) {
                continue;
            }
            if let Some(value) = FieldValue::from_default(field) {
                target.set_field(field.name(), value)?;
            }
        }
        Ok(())
    }

    fn lookup(&self, namespace: &str, type_name: &str) -> Result<Arc<ClassDeclaration>, FactoryError> {
        let schema = self
            .registry
            .resolve_namespace(namespace)
            .ok_or_else(|| reject(FactoryError::UnregisteredNamespace(namespace.to_string())))?;
        schema.get_declaration(type_name).map(Arc::clone).ok_or_else(|| {
            reject(FactoryError::UndeclaredType {
                namespace: namespace.to_string(),
                type_name: type_name.to_string(),
            })
        })
    }

    fn instance_data(&self, declaration: Arc<ClassDeclaration>, options: &FactoryOptions) -> InstanceData {
        if options.disable_validation {
            InstanceData::plain(declaration)
        } else {
            InstanceData::validated(Arc::clone(&self.registry), declaration)
        }
    }

    fn populate(&self, target: &mut dyn Typed, options: &FactoryOptions) -> Result<(), FactoryError> {
        let Some(strategy) = options.strategy() else {
            return Ok(());
        };

        let mut generator: Box<dyn ValueGenerator> = match strategy {
            GenerationStrategy::Default => Box::new(DefaultValueGenerator),
            GenerationStrategy::Sample => Box::new(
                options
                    .sample_seed
                    .map_or_else(SampleValueGenerator::new, SampleValueGenerator::seeded),
            ),
        };
        let mut ctx = PopulationContext::new(self, generator.as_mut(), options);
        self.populator.populate(target, &mut ctx)?;
        Ok(())
    }
}

fn reject(err: FactoryError) -> FactoryError {
    tracing::debug!("Rejected request: {}", err);
    err
}

/// Builder for [`Factory`]
#[derive(Debug)]
pub struct FactoryBuilder {
    registry: Arc<ModelManager>,
    identifiers: Arc<dyn IdentifierSource>,
    populator: Arc<dyn Populator>,
}

impl FactoryBuilder {
    /// With identifier source for transactions
    #[inline]
    #[must_use]
    pub fn identifier_source(mut self, source: impl IdentifierSource + 'static) -> Self {
        self.identifiers = Arc::new(source);
        self
    }

    /// With custom populator
    #[inline]
    #[must_use]
    pub fn populator(mut self, populator: impl Populator + 'static) -> Self {
        self.populator = Arc::new(populator);
        self
    }

    /// Finish the factory
    #[inline]
    #[must_use]
    pub fn build(self) -> Factory {
        Factory {
            registry: self.registry,
            identifiers: self.identifiers,
            populator: self.populator,
        }
    }
}
