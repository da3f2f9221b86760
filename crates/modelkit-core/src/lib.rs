//! modelkit Core - Schema-driven instance factory
//!
//! Creates typed instances of declarations held by a
//! [`ModelManager`](modelkit_schema::ModelManager):
//! - Resources and transactions, identified by a designated field
//! - Concepts, structured values without identity
//! - Relationships, unvalidated typed pointers to resources
//!
//! Instances are either validated (every write is checked against the
//! declaration) or plain, and may be populated with default or sample data.
//!
//! # Example
//!
//! ```rust
//! use modelkit_core::{Factory, FactoryOptions, Typed};
//! use modelkit_schema::{ClassDefinition, FieldDeclaration, ModelFile, ModelManager, PrimitiveType};
//! use std::sync::Arc;
//!
//! let file = ModelFile::new("org.acme").declare(
//!     ClassDefinition::resource("Driver")
//!         .identified_by("licence")
//!         .field(FieldDeclaration::primitive("licence", PrimitiveType::String))
//!         .field(FieldDeclaration::primitive("name", PrimitiveType::String)),
//! );
//! let registry = Arc::new(ModelManager::builder().add_model_file(file).build().unwrap());
//! let factory = Factory::new(registry);
//!
//! let options = FactoryOptions::new().with_sample_data().with_sample_seed(1);
//! let driver = factory
//!     .create_resource("org.acme", "Driver", Some("D-42"), &options)
//!     .unwrap();
//!
//! assert_eq!(driver.identifier(), "D-42");
//! assert!(driver.validate().is_ok());
//! assert_eq!(driver.to_relationship().to_uri(), "resource:org.acme.Driver#D-42");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod error;
pub mod factory;
pub mod generator;
pub mod identifier;
pub mod instance;
pub mod options;
pub mod populate;
pub mod validation;
pub mod value;

// Re-exports for convenience
pub use error::{FactoryError, PopulationError, ValidationError};
pub use factory::{Factory, FactoryBuilder};
pub use generator::{DefaultValueGenerator, SampleValueGenerator, ValueGenerator};
pub use identifier::{IdentifierSource, UuidV4Source};
pub use instance::{Concept, Relationship, Resource, Transaction, Typed, TIMESTAMP_FIELD};
pub use options::{FactoryOptions, GenerationStrategy};
pub use populate::{InstanceGenerator, PopulationContext, Populator, DEFAULT_MAX_DEPTH};
pub use validation::InstanceValidator;
pub use value::FieldValue;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with modelkit Core
    pub use crate::{
        Concept, Factory, FactoryError, FactoryOptions, FieldValue, Relationship, Resource,
        Transaction, Typed,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
