//! Field population
//!
//! The factory hands a freshly created instance to a [`Populator`] when
//! generation is requested. [`InstanceGenerator`] is the stock populator: it
//! walks the declared fields and fills them from a [`ValueGenerator`],
//! building nested objects and relationships through the owning [`Factory`].

use crate::error::PopulationError;
use crate::factory::Factory;
use crate::generator::ValueGenerator;
use crate::instance::Typed;
use crate::options::FactoryOptions;
use crate::value::FieldValue;
use modelkit_schema::{ClassDeclaration, DeclarationCategory, FieldDeclaration, FieldType, ModelManager, PrimitiveType, TypeRef};
use std::sync::Arc;

/// Default nesting limit for object fields
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Fills the fields of a new instance
///
/// Errors are returned to the factory caller unchanged.
pub trait Populator: Send + Sync + std::fmt::Debug {
    /// Populate `target` in place
    ///
    /// # Errors
    /// Any failure aborts the factory call
    fn populate(&self, target: &mut dyn Typed, ctx: &mut PopulationContext<'_>) -> Result<(), PopulationError>;
}

/// Traversal state for one population run
pub struct PopulationContext<'a> {
    factory: &'a Factory,
    generator: &'a mut dyn ValueGenerator,
    options: &'a FactoryOptions,
    depth: usize,
    max_depth: usize,
}

impl<'a> PopulationContext<'a> {
    /// Create context at depth zero
    #[must_use]
    pub fn new(factory: &'a Factory, generator: &'a mut dyn ValueGenerator, options: &'a FactoryOptions) -> Self {
        Self {
            factory,
            generator,
            options,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// With a different nesting limit
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Factory building nested objects
    #[inline]
    #[must_use]
    pub fn factory(&self) -> &'a Factory {
        self.factory
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &'a ModelManager {
        self.factory.registry()
    }

    /// Value source for this run
    #[inline]
    pub fn generator(&mut self) -> &mut dyn ValueGenerator {
        &mut *self.generator
    }

    /// Options of the originating request
    #[inline]
    #[must_use]
    pub fn options(&self) -> &'a FactoryOptions {
        self.options
    }

    /// Current nesting depth (0 for the requested instance)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Check if nested objects may still be built
    #[inline]
    #[must_use]
    pub fn can_descend(&self) -> bool {
        self.depth < self.max_depth
    }

    /// Run `f` one level deeper
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

/// Stock populator filling every declared field
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceGenerator;

impl InstanceGenerator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn field_value(
        &self,
        owner: &ClassDeclaration,
        field: &FieldDeclaration,
        ctx: &mut PopulationContext<'_>,
    ) -> Result<Option<FieldValue>, PopulationError> {
        if owner.identifier_field_name() == Some(field.name()) {
            return Ok(Some(FieldValue::String(ctx.generator().identifier(owner.name()))));
        }
        if let Some(value) = FieldValue::from_default(field) {
            return Ok(Some(value));
        }

        if field.is_array() {
            // Empty is a valid required array, so recursion ends here.
            if matches!(field.field_type(), FieldType::Object(_)) && !ctx.can_descend() {
                return Ok(Some(FieldValue::Array(Vec::new())));
            }
            let len = ctx.generator().array_len();
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                match self.scalar(owner, field, ctx)? {
                    Some(item) => items.push(item),
                    None => return Ok(None),
                }
            }
            return Ok(Some(FieldValue::Array(items)));
        }

        self.scalar(owner, field, ctx)
    }

    fn scalar(
        &self,
        owner: &ClassDeclaration,
        field: &FieldDeclaration,
        ctx: &mut PopulationContext<'_>,
    ) -> Result<Option<FieldValue>, PopulationError> {
        let generator = ctx.generator();
        let value = match field.field_type() {
            FieldType::Primitive(PrimitiveType::String) => FieldValue::String(generator.string(field.name())),
            FieldType::Primitive(PrimitiveType::Boolean) => FieldValue::Boolean(generator.boolean()),
            FieldType::Primitive(PrimitiveType::Integer) => FieldValue::Integer(generator.integer()),
            FieldType::Primitive(PrimitiveType::Long) => FieldValue::Long(generator.long()),
            FieldType::Primitive(PrimitiveType::Double) => FieldValue::Double(generator.double()),
            FieldType::Primitive(PrimitiveType::DateTime) => FieldValue::DateTime(generator.date_time()),
            FieldType::Enum(values) => match generator.enum_value(values) {
                Some(v) => FieldValue::Enum(v.to_string()),
                None => return Ok(None),
            },
            FieldType::Relationship(target) => {
                let identifier = generator.identifier(target.name());
                let pointer = ctx
                    .factory()
                    .create_relationship(target.namespace(), target.name(), &identifier)?;
                FieldValue::Relationship(pointer)
            }
            FieldType::Object(target) => {
                if !ctx.can_descend() {
                    return Err(PopulationError::RecursionLimit {
                        type_name: owner.fully_qualified_name(),
                        limit: ctx.max_depth(),
                    });
                }
                self.nested_object(target, ctx)?
            }
        };
        Ok(Some(value))
    }

    /// Build and populate an embedded object one level down
    fn nested_object(&self, target: &TypeRef, ctx: &mut PopulationContext<'_>) -> Result<FieldValue, PopulationError> {
        let declaration = concrete_declaration(ctx.registry(), target)?;
        let shell = FactoryOptions {
            generate: false,
            ..ctx.options().clone()
        };
        let factory = ctx.factory();

        if declaration.category() == DeclarationCategory::Concept {
            let mut concept = factory.create_concept(declaration.namespace(), declaration.name(), &shell)?;
            ctx.nested(|ctx| self.populate(&mut concept, ctx))?;
            Ok(concept.into())
        } else {
            let identifier = ctx.generator().identifier(declaration.name());
            let mut resource =
                factory.create_resource(declaration.namespace(), declaration.name(), Some(&identifier), &shell)?;
            ctx.nested(|ctx| self.populate(&mut resource, ctx))?;
            resource.force_identifier(&identifier);
            Ok(resource.into())
        }
    }
}

/// Declared type, or its first concrete subtype when abstract
fn concrete_declaration(registry: &ModelManager, target: &TypeRef) -> Result<Arc<ClassDeclaration>, PopulationError> {
    let declaration = registry
        .get_declaration(target)
        .ok_or_else(|| PopulationError::UnresolvedType(target.to_string()))?;
    if !declaration.is_abstract() {
        return Ok(Arc::clone(declaration));
    }
    registry
        .concrete_subtypes(target)
        .first()
        .copied()
        .map(Arc::clone)
        .ok_or_else(|| PopulationError::NoConcreteSubtype(target.to_string()))
}

impl Populator for InstanceGenerator {
    fn populate(&self, target: &mut dyn Typed, ctx: &mut PopulationContext<'_>) -> Result<(), PopulationError> {
        let declaration = Arc::clone(target.declaration());
        let include_optional = ctx.options().include_optional_fields;

        for field in declaration.fields() {
            if field.is_optional() && !include_optional {
                continue;
            }
            // Optional objects are dropped at the limit, required ones fail below.
            if field.is_optional() && matches!(field.field_type(), FieldType::Object(_)) && !ctx.can_descend() {
                continue;
            }

            if let Some(value) = self.field_value(&declaration, field, ctx)? {
                tracing::trace!(
                    "Populated {}.{} at depth {}",
                    declaration.fully_qualified_name(),
                    field.name(),
                    ctx.depth()
                );
                target.set_field(field.name(), value)?;
            }
        }
        Ok(())
    }
}
