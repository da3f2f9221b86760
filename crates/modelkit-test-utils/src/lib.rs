//! Testing utilities for modelkit workspace
//!
//! Shared fixtures: a two-namespace fleet model, a deterministic identifier
//! source and tracing setup.

#![allow(missing_docs)]

use modelkit_core::{Factory, IdentifierSource};
use modelkit_schema::{ClassDefinition, FieldDeclaration, ModelFile, ModelManager, PrimitiveType, TypeRef};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const BASE_NS: &str = "org.acme.base";
pub const FLEET_NS: &str = "org.acme.fleet";

pub fn base_ref(name: &str) -> TypeRef {
    TypeRef::new(BASE_NS, name)
}

pub fn fleet_ref(name: &str) -> TypeRef {
    TypeRef::new(FLEET_NS, name)
}

/// Shared declarations: an address concept and an abstract participant
pub fn base_model() -> ModelFile {
    ModelFile::new(BASE_NS)
        .declare(
            ClassDefinition::concept("Address")
                .field(FieldDeclaration::primitive("street", PrimitiveType::String))
                .field(FieldDeclaration::primitive("city", PrimitiveType::String))
                .field(FieldDeclaration::primitive("zip", PrimitiveType::String).optional()),
        )
        .declare(
            ClassDefinition::resource("Participant")
                .as_abstract()
                .identified_by("participantId")
                .field(FieldDeclaration::primitive("participantId", PrimitiveType::String)),
        )
}

/// Fleet declarations covering every declaration kind and field type
pub fn sample_model() -> ModelFile {
    ModelFile::new(FLEET_NS)
        .declare(
            ClassDefinition::resource("Driver")
                .extends(base_ref("Participant"))
                .field(FieldDeclaration::primitive("name", PrimitiveType::String))
                .field(FieldDeclaration::primitive("licensed", PrimitiveType::Boolean))
                .field(FieldDeclaration::primitive("rating", PrimitiveType::Double).optional())
                .field(FieldDeclaration::object("address", base_ref("Address"))),
        )
        .declare(
            ClassDefinition::concept("Engine")
                .field(FieldDeclaration::primitive("cylinders", PrimitiveType::Integer))
                .field(FieldDeclaration::primitive("serial", PrimitiveType::Long))
                .field(FieldDeclaration::enumeration("fuel", ["PETROL", "DIESEL", "ELECTRIC"])),
        )
        .declare(ClassDefinition::concept("Part").as_abstract())
        .declare(
            ClassDefinition::concept("Wheel")
                .extends(fleet_ref("Part"))
                .field(FieldDeclaration::primitive("size", PrimitiveType::Integer).with_default(json!(17))),
        )
        .declare(
            ClassDefinition::resource("Vehicle")
                .identified_by("vin")
                .field(FieldDeclaration::primitive("vin", PrimitiveType::String))
                .field(FieldDeclaration::primitive("make", PrimitiveType::String))
                .field(FieldDeclaration::primitive("wheels", PrimitiveType::Integer).with_default(json!(4)))
                .field(
                    FieldDeclaration::enumeration("colour", ["RED", "BLUE", "SILVER"])
                        .with_default(json!("SILVER")),
                )
                .field(FieldDeclaration::object("engine", fleet_ref("Engine")))
                .field(FieldDeclaration::object("parts", fleet_ref("Part")).array())
                .field(FieldDeclaration::relationship("owner", fleet_ref("Driver")))
                .field(FieldDeclaration::relationship("previousOwners", fleet_ref("Driver")).array().optional())
                .field(FieldDeclaration::primitive("registeredAt", PrimitiveType::DateTime))
                .field(FieldDeclaration::primitive("notes", PrimitiveType::String).optional()),
        )
        .declare(
            ClassDefinition::transaction("FleetTransaction")
                .as_abstract()
                .identified_by("transactionId")
                .field(FieldDeclaration::primitive("transactionId", PrimitiveType::String))
                .field(FieldDeclaration::primitive("timestamp", PrimitiveType::DateTime)),
        )
        .declare(
            ClassDefinition::transaction("Sale")
                .extends(fleet_ref("FleetTransaction"))
                .field(FieldDeclaration::relationship("vehicle", fleet_ref("Vehicle")))
                .field(FieldDeclaration::primitive("price", PrimitiveType::Double)),
        )
        .declare(
            ClassDefinition::transaction("Inspection")
                .identified_by("inspectionId")
                .field(FieldDeclaration::primitive("inspectionId", PrimitiveType::String))
                .field(FieldDeclaration::primitive("passed", PrimitiveType::Boolean))
                .field(FieldDeclaration::relationship("inspector", base_ref("Participant")).optional()),
        )
}

/// Registry holding [`base_model`] and [`sample_model`]
pub fn sample_registry() -> Arc<ModelManager> {
    let registry = ModelManager::builder()
        .add_model_file(base_model())
        .add_model_file(sample_model())
        .build()
        .expect("sample model resolves");
    Arc::new(registry)
}

/// Factory over [`sample_registry`] with default collaborators
pub fn sample_factory() -> Factory {
    Factory::new(sample_registry())
}

/// Deterministic identifiers `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicUsize,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicUsize::new(1),
        }
    }

    /// Number of identifiers handed out so far
    pub fn issued(&self) -> usize {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl IdentifierSource for SequentialIds {
    fn next_identifier(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}

/// Install a test subscriber honouring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
