//! modelkit Schema Registry
//!
//! Namespaced class declarations resolved once at load time.
//!
//! # Core Concepts
//!
//! - [`ModelFile`]: Authored declarations of one namespace
//! - [`ModelManager`]: Read-only registry of resolved [`Schema`]s
//! - [`ClassDeclaration`]: Resolved declaration with flattened fields
//! - [`DeclarationKind`]: Closed set of what a declaration can become
//!
//! # Example
//!
//! ```rust
//! use modelkit_schema::{
//!     ClassDefinition, DeclarationKind, FieldDeclaration, ModelFile, ModelManager, PrimitiveType,
//! };
//!
//! let file = ModelFile::new("org.acme").declare(
//!     ClassDefinition::resource("Driver")
//!         .identified_by("licence")
//!         .field(FieldDeclaration::primitive("licence", PrimitiveType::String)),
//! );
//! let registry = ModelManager::builder().add_model_file(file).build().unwrap();
//!
//! let schema = registry.resolve_namespace("org.acme").unwrap();
//! let driver = schema.get_declaration("Driver").unwrap();
//! assert_eq!(driver.kind(), DeclarationKind::Resource);
//! assert_eq!(driver.identifier_field_name(), Some("licence"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod declaration;
mod definition;
mod error;
mod registry;
mod types;

// Re-exports
pub use declaration::{ClassDeclaration, DeclarationKind};
pub use definition::{ClassDefinition, DeclarationCategory, FieldDeclaration, ModelFile};
pub use error::SchemaError;
pub use registry::{ModelManager, ModelManagerBuilder, Schema};
pub use types::{FieldType, PrimitiveType, TypeRef, TypeRefError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
