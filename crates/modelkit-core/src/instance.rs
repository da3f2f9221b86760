//! Object variants produced by the factory
//!
//! Provides [`Resource`], [`Concept`], [`Relationship`] and [`Transaction`].
//! Resources, concepts and transactions come in a validated and a plain
//! form, fixed at construction; see [`Typed::is_validated`].
//!
//! # Serialization
//! Every instance implements [`serde::Serialize`] as an empty map. Generic
//! serialization is deliberately opaque: instances are written out by a
//! dedicated serializer that understands the schema, never field-by-field
//! through serde.

use crate::error::ValidationError;
use crate::validation::InstanceValidator;
use crate::value::FieldValue;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use modelkit_schema::{ClassDeclaration, FieldType, ModelManager, PrimitiveType, TypeRef};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Name of the field a transaction's creation time is mirrored into
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Common access to resource, concept and transaction fields
pub trait Typed {
    /// Declaration this instance conforms to
    fn declaration(&self) -> &Arc<ClassDeclaration>;

    /// Owning namespace
    fn namespace(&self) -> &str {
        self.declaration().namespace()
    }

    /// Short type name
    fn type_name(&self) -> &str {
        self.declaration().name()
    }

    /// Fully-qualified type name
    fn fully_qualified_type(&self) -> String {
        self.declaration().fully_qualified_name()
    }

    /// Current value of a field
    fn field(&self, name: &str) -> Option<&FieldValue>;

    /// Set fields in assignment order
    fn fields(&self) -> Box<dyn Iterator<Item = (&str, &FieldValue)> + '_>;

    /// Write a field
    ///
    /// # Errors
    /// Validated instances reject writes that violate the declaration. The
    /// identifying field of a resource only ever accepts non-blank text.
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ValidationError>;

    /// Remove a field value, returning the previous one
    ///
    /// # Errors
    /// Validated instances reject clearing required fields. The identifying
    /// field of a resource can never be cleared.
    fn clear_field(&mut self, name: &str) -> Result<Option<FieldValue>, ValidationError>;

    /// Whether the field rejects every write
    fn is_read_only(&self, _name: &str) -> bool {
        false
    }

    /// Whether writes are checked against the declaration
    fn is_validated(&self) -> bool;

    /// Check the whole instance
    ///
    /// Plain instances are unchecked and always pass.
    ///
    /// # Errors
    /// Returns the first structural violation found
    fn validate(&self) -> Result<(), ValidationError>;
}

#[derive(Debug, Clone)]
enum Mode {
    Plain,
    Validated(InstanceValidator),
}

/// Field storage shared by the typed variants
#[derive(Debug, Clone)]
pub(crate) struct InstanceData {
    declaration: Arc<ClassDeclaration>,
    fields: IndexMap<String, FieldValue>,
    mode: Mode,
}

impl InstanceData {
    pub(crate) fn plain(declaration: Arc<ClassDeclaration>) -> Self {
        Self {
            declaration,
            fields: IndexMap::new(),
            mode: Mode::Plain,
        }
    }

    pub(crate) fn validated(registry: Arc<ModelManager>, declaration: Arc<ClassDeclaration>) -> Self {
        let validator = InstanceValidator::new(registry, Arc::clone(&declaration));
        Self {
            declaration,
            fields: IndexMap::new(),
            mode: Mode::Validated(validator),
        }
    }

    fn set(&mut self, name: &str, value: FieldValue) -> Result<(), ValidationError> {
        match &self.mode {
            Mode::Validated(validator) => validator.check_write(name, &value)?,
            Mode::Plain => self.check_identity(name, &value)?,
        }
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    fn clear(&mut self, name: &str) -> Result<Option<FieldValue>, ValidationError> {
        match &self.mode {
            Mode::Validated(validator) => validator.check_clear(name)?,
            Mode::Plain if self.is_identifier(name) => {
                return Err(ValidationError::MissingRequiredField {
                    type_name: self.declaration.fully_qualified_name(),
                    field: name.to_string(),
                })
            }
            Mode::Plain => {}
        }
        Ok(self.fields.shift_remove(name))
    }

    /// Plain instances still keep the identity intact
    fn check_identity(&self, name: &str, value: &FieldValue) -> Result<(), ValidationError> {
        if !self.is_identifier(name) {
            return Ok(());
        }
        match value {
            FieldValue::String(s) if !s.trim().is_empty() => Ok(()),
            FieldValue::String(_) => Err(ValidationError::BlankIdentifier {
                type_name: self.declaration.fully_qualified_name(),
                field: name.to_string(),
            }),
            other => Err(ValidationError::TypeMismatch {
                type_name: self.declaration.fully_qualified_name(),
                field: name.to_string(),
                expected: PrimitiveType::String.to_string(),
                actual: other.kind_name(),
            }),
        }
    }

    fn is_identifier(&self, name: &str) -> bool {
        self.declaration.identifier_field_name() == Some(name)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match &self.mode {
            Mode::Validated(validator) => validator.check_instance(&self.fields),
            Mode::Plain => Ok(()),
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &FieldValue)> + '_> {
        Box::new(self.fields.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

impl PartialEq for InstanceData {
    /// Equal when of the same type with the same field values
    fn eq(&self, other: &Self) -> bool {
        self.declaration.type_ref() == other.declaration.type_ref() && self.fields == other.fields
    }
}

macro_rules! impl_typed {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Typed for $ty {
                fn declaration(&self) -> &Arc<ClassDeclaration> {
                    &self.data.declaration
                }

                fn field(&self, name: &str) -> Option<&FieldValue> {
                    self.data.fields.get(name)
                }

                fn fields(&self) -> Box<dyn Iterator<Item = (&str, &FieldValue)> + '_> {
                    self.data.iter()
                }

                fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ValidationError> {
                    self.data.set(name, value)
                }

                fn clear_field(&mut self, name: &str) -> Result<Option<FieldValue>, ValidationError> {
                    self.data.clear(name)
                }

                fn is_validated(&self) -> bool {
                    matches!(self.data.mode, Mode::Validated(_))
                }

                fn validate(&self) -> Result<(), ValidationError> {
                    self.data.validate()
                }
            }

            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    opaque(serializer)
                }
            }
        )+
    };
}

impl_typed!(Resource, Concept);

/// Generic serialization of any instance yields `{}`
fn opaque<S: Serializer>(serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_map(Some(0))?.end()
}

/// Identified business object
///
/// # Invariants
/// - The identifying field holds non-blank text once the factory returns
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    data: InstanceData,
}

impl Resource {
    pub(crate) fn new(data: InstanceData) -> Self {
        Self { data }
    }

    /// Identifier value
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.data
            .fields
            .get(self.identifier_field())
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
    }

    /// Name of the identifying field
    #[inline]
    #[must_use]
    pub fn identifier_field(&self) -> &str {
        self.data
            .declaration
            .identifier_field_name()
            .unwrap_or_default()
    }

    /// Pointer to this resource
    #[must_use]
    pub fn to_relationship(&self) -> Relationship {
        Relationship::new(self.namespace(), self.type_name(), self.identifier())
    }

    /// Overwrite the identifier, bypassing validation
    pub(crate) fn force_identifier(&mut self, identifier: &str) {
        let field = self.identifier_field().to_string();
        self.data
            .fields
            .insert(field, FieldValue::String(identifier.to_string()));
    }
}

/// Structured value without identity
#[derive(Debug, Clone, PartialEq)]
pub struct Concept {
    data: InstanceData,
}

impl Concept {
    pub(crate) fn new(data: InstanceData) -> Self {
        Self { data }
    }
}

/// Unvalidated typed pointer to a resource
///
/// Never embeds or checks the referenced object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relationship {
    namespace: String,
    type_name: String,
    identifier: String,
}

impl Relationship {
    pub(crate) fn new(
        namespace: impl Into<String>,
        type_name: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            type_name: type_name.into(),
            identifier: identifier.into(),
        }
    }

    /// Namespace of the referenced type
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Short name of the referenced type
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Identifier of the referenced resource
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Referenced type
    #[inline]
    #[must_use]
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::new(self.namespace.clone(), self.type_name.clone())
    }

    /// `resource:<namespace>.<Type>#<identifier>`
    #[must_use]
    pub fn to_uri(&self) -> String {
        self.to_string()
    }
}

impl Display for Relationship {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "resource:{}.{}#{}",
            self.namespace, self.type_name, self.identifier
        )
    }
}

impl Serialize for Relationship {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        opaque(serializer)
    }
}

/// Resource with a creation timestamp
///
/// # Invariants
/// - `timestamp` is set once, by the factory, and has no setter
/// - a declared `timestamp` DateTime field mirrors it and is read-only
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    resource: Resource,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn new(mut resource: Resource, timestamp: DateTime<Utc>) -> Self {
        if Self::mirrors_timestamp(resource.declaration()) {
            resource
                .data
                .fields
                .insert(TIMESTAMP_FIELD.to_string(), FieldValue::DateTime(timestamp));
        }
        Self {
            resource,
            timestamp,
        }
    }

    fn mirrors_timestamp(declaration: &ClassDeclaration) -> bool {
        declaration.field(TIMESTAMP_FIELD).is_some_and(|f| {
            !f.is_array() && f.field_type() == &FieldType::Primitive(PrimitiveType::DateTime)
        })
    }

    /// Identifier value
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.resource.identifier()
    }

    /// Creation time
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[inline]
    #[must_use]
    pub fn as_resource(&self) -> &Resource {
        &self.resource
    }

    #[inline]
    #[must_use]
    pub fn into_resource(self) -> Resource {
        self.resource
    }

    fn check_writable(&self, name: &str) -> Result<(), ValidationError> {
        if self.is_read_only(name) {
            Err(ValidationError::ReadOnlyField {
                type_name: self.fully_qualified_type(),
                field: name.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl Typed for Transaction {
    fn declaration(&self) -> &Arc<ClassDeclaration> {
        self.resource.declaration()
    }

    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.resource.field(name)
    }

    fn fields(&self) -> Box<dyn Iterator<Item = (&str, &FieldValue)> + '_> {
        self.resource.fields()
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), ValidationError> {
        self.check_writable(name)?;
        self.resource.set_field(name, value)
    }

    fn clear_field(&mut self, name: &str) -> Result<Option<FieldValue>, ValidationError> {
        self.check_writable(name)?;
        self.resource.clear_field(name)
    }

    fn is_read_only(&self, name: &str) -> bool {
        name == TIMESTAMP_FIELD && Self::mirrors_timestamp(self.resource.declaration())
    }

    fn is_validated(&self) -> bool {
        self.resource.is_validated()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.resource.validate()
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        opaque(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelkit_schema::{ClassDefinition, FieldDeclaration, ModelFile};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NS: &str = "org.acme";

    fn registry() -> Arc<ModelManager> {
        let file = ModelFile::new(NS)
            .declare(
                ClassDefinition::resource("Car")
                    .identified_by("vin")
                    .field(FieldDeclaration::primitive("vin", PrimitiveType::String))
                    .field(FieldDeclaration::primitive("seats", PrimitiveType::Integer))
                    .field(FieldDeclaration::enumeration("color", ["RED", "BLUE"]).optional())
                    .field(FieldDeclaration::object("engine", TypeRef::new(NS, "Engine")).optional())
                    .field(FieldDeclaration::relationship("owner", TypeRef::new(NS, "Person")).optional())
                    .field(FieldDeclaration::primitive("tags", PrimitiveType::String).array().optional()),
            )
            .declare(
                ClassDefinition::resource("Person")
                    .identified_by("email")
                    .field(FieldDeclaration::primitive("email", PrimitiveType::String)),
            )
            .declare(ClassDefinition::concept("Engine").field(FieldDeclaration::primitive("hp", PrimitiveType::Long)))
            .declare(ClassDefinition::concept("Wheel"))
            .declare(
                ClassDefinition::transaction("Sale")
                    .identified_by("saleId")
                    .field(FieldDeclaration::primitive("saleId", PrimitiveType::String))
                    .field(FieldDeclaration::primitive(TIMESTAMP_FIELD, PrimitiveType::DateTime)),
            );
        Arc::new(ModelManager::builder().add_model_file(file).build().unwrap())
    }

    fn declaration(mm: &ModelManager, name: &str) -> Arc<ClassDeclaration> {
        Arc::clone(mm.get_declaration(&TypeRef::new(NS, name)).unwrap())
    }

    fn validated_car(mm: &Arc<ModelManager>) -> Resource {
        let mut car = Resource::new(InstanceData::validated(Arc::clone(mm), declaration(mm, "Car")));
        car.force_identifier("VIN-1");
        car
    }

    fn plain_car(mm: &Arc<ModelManager>) -> Resource {
        let mut car = Resource::new(InstanceData::plain(declaration(mm, "Car")));
        car.force_identifier("VIN-1");
        car
    }

    #[test]
    fn resource_identifier_accessors() {
        let mm = registry();
        let car = validated_car(&mm);
        assert_eq!(car.identifier(), "VIN-1");
        assert_eq!(car.identifier_field(), "vin");
        assert_eq!(car.fully_qualified_type(), "org.acme.Car");
        assert!(car.is_validated());
    }

    #[test]
    fn validated_accepts_declared_values() {
        let mm = registry();
        let mut car = validated_car(&mm);
        car.set_field("seats", FieldValue::Integer(4)).unwrap();
        car.set_field("color", FieldValue::Enum("RED".into())).unwrap();
        car.set_field("tags", vec![FieldValue::from("fast")].into()).unwrap();
        assert_eq!(car.field("seats"), Some(&FieldValue::Integer(4)));
        assert!(car.validate().is_ok());
    }

    #[test]
    fn validated_rejects_unknown_field() {
        let mm = registry();
        let mut car = validated_car(&mm);
        let err = car.set_field("wings", FieldValue::Integer(2)).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownField { .. }));
        assert!(car.field("wings").is_none());
    }

    #[test]
    fn validated_rejects_wrong_primitive() {
        let mm = registry();
        let mut car = validated_car(&mm);
        let err = car.set_field("seats", FieldValue::Long(4)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                type_name: "org.acme.Car".to_string(),
                field: "seats".to_string(),
                expected: "integer".to_string(),
                actual: "long",
            }
        );
    }

    #[test]
    fn validated_rejects_scalar_for_array() {
        let mm = registry();
        let mut car = validated_car(&mm);
        assert!(matches!(
            car.set_field("tags", FieldValue::from("fast")),
            Err(ValidationError::TypeMismatch { .. })
        ));
        assert!(matches!(
            car.set_field("seats", vec![FieldValue::Integer(1)].into()),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn validated_rejects_unknown_enum_value() {
        let mm = registry();
        let mut car = validated_car(&mm);
        assert!(matches!(
            car.set_field("color", FieldValue::Enum("GREEN".into())),
            Err(ValidationError::UnknownEnumValue { .. })
        ));
    }

    #[test]
    fn validated_checks_nested_assignability() {
        let mm = registry();
        let mut car = validated_car(&mm);

        let engine = Concept::new(InstanceData::plain(declaration(&mm, "Engine")));
        car.set_field("engine", engine.into()).unwrap();

        let wheel = Concept::new(InstanceData::plain(declaration(&mm, "Wheel")));
        assert!(matches!(
            car.set_field("engine", wheel.into()),
            Err(ValidationError::NotAssignable { .. })
        ));

        let owner = Relationship::new(NS, "Person", "a@b.c");
        car.set_field("owner", owner.into()).unwrap();

        let wrong = Relationship::new(NS, "Car", "VIN-2");
        assert!(matches!(
            car.set_field("owner", wrong.into()),
            Err(ValidationError::NotAssignable { .. })
        ));
    }

    #[test]
    fn relationship_field_rejects_embedded_resource() {
        let mm = registry();
        let mut car = validated_car(&mm);
        let mut person = Resource::new(InstanceData::plain(declaration(&mm, "Person")));
        person.force_identifier("a@b.c");
        assert!(matches!(
            car.set_field("owner", person.into()),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn validate_reports_missing_required() {
        let mm = registry();
        let car = validated_car(&mm);
        assert_eq!(
            car.validate(),
            Err(ValidationError::MissingRequiredField {
                type_name: "org.acme.Car".to_string(),
                field: "seats".to_string(),
            })
        );
    }

    #[test]
    fn clear_required_field_rejected_when_validated() {
        let mm = registry();
        let mut car = validated_car(&mm);
        car.set_field("seats", FieldValue::Integer(2)).unwrap();
        assert!(car.clear_field("seats").is_err());

        car.set_field("color", FieldValue::Enum("BLUE".into())).unwrap();
        assert_eq!(
            car.clear_field("color").unwrap(),
            Some(FieldValue::Enum("BLUE".into()))
        );
    }

    #[test]
    fn plain_accepts_anything_but_identity_changes() {
        let mm = registry();
        let mut car = plain_car(&mm);
        assert!(!car.is_validated());

        car.set_field("wings", FieldValue::Integer(2)).unwrap();
        car.set_field("seats", FieldValue::from("many")).unwrap();
        assert!(car.validate().is_ok());

        assert!(matches!(
            car.set_field("vin", FieldValue::from("  ")),
            Err(ValidationError::BlankIdentifier { .. })
        ));
        assert!(matches!(
            car.set_field("vin", FieldValue::Integer(1)),
            Err(ValidationError::TypeMismatch { .. })
        ));
        assert!(car.clear_field("vin").is_err());

        car.set_field("vin", FieldValue::from("VIN-9")).unwrap();
        assert_eq!(car.identifier(), "VIN-9");
    }

    #[test]
    fn validated_rejects_blank_identifier() {
        let mm = registry();
        let mut car = validated_car(&mm);
        assert!(matches!(
            car.set_field("vin", FieldValue::from("")),
            Err(ValidationError::BlankIdentifier { .. })
        ));
        assert_eq!(car.identifier(), "VIN-1");
    }

    #[test]
    fn clones_own_their_validator() {
        let mm = registry();
        let car = validated_car(&mm);
        let mut copy = car.clone();
        copy.set_field("seats", FieldValue::Integer(5)).unwrap();

        assert!(copy.is_validated());
        assert!(car.field("seats").is_none());
        assert_ne!(car, copy);
    }

    #[test]
    fn relationship_uri() {
        let rel = Relationship::new(NS, "Person", "a@b.c");
        assert_eq!(rel.to_uri(), "resource:org.acme.Person#a@b.c");
        assert_eq!(rel.type_ref(), TypeRef::new(NS, "Person"));
    }

    #[test]
    fn resource_to_relationship() {
        let mm = registry();
        let rel = validated_car(&mm).to_relationship();
        assert_eq!(rel, Relationship::new(NS, "Car", "VIN-1"));
    }

    #[test]
    fn transaction_timestamp_is_mirrored_and_read_only() {
        let mm = registry();
        let mut sale = Resource::new(InstanceData::validated(Arc::clone(&mm), declaration(&mm, "Sale")));
        sale.force_identifier("S-1");
        let now = Utc::now();
        let mut tx = Transaction::new(sale, now);

        assert_eq!(tx.timestamp(), now);
        assert_eq!(tx.field(TIMESTAMP_FIELD), Some(&FieldValue::DateTime(now)));
        assert!(matches!(
            tx.set_field(TIMESTAMP_FIELD, FieldValue::DateTime(Utc::now())),
            Err(ValidationError::ReadOnlyField { .. })
        ));
        assert!(tx.clear_field(TIMESTAMP_FIELD).is_err());
        assert!(tx.is_read_only(TIMESTAMP_FIELD));
        assert!(!tx.is_read_only("saleId"));
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn generic_serialization_is_opaque() {
        let mm = registry();
        let mut car = validated_car(&mm);
        car.set_field("seats", FieldValue::Integer(4)).unwrap();

        assert_eq!(serde_json::to_value(&car).unwrap(), json!({}));
        assert_eq!(
            serde_json::to_value(Relationship::new(NS, "Person", "x")).unwrap(),
            json!({})
        );
        let engine = Concept::new(InstanceData::plain(declaration(&mm, "Engine")));
        assert_eq!(serde_json::to_string(&engine).unwrap(), "{}");
    }
}
