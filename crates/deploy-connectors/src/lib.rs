//! Value connectors for content deployment.
//!
//! Content stored in one repository refers to other entities by local numeric
//! ids that mean nothing anywhere else. This crate converts property values
//! between that local form and a portable form built on UDIs (`umb://...`
//! identifiers), and reports the entities each value depends on so they can
//! be deployed first or verified at the destination.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use deploy_connectors::memory::{
//!     MemoryDataTypeService, MemoryEntityService, MemoryMacroService, MemoryMediaStore,
//! };
//! use deploy_connectors::{ConnectorRegistry, Content, ContentBase, EditorAlias, ObjectType, Property, Services};
//! use uuid::Uuid;
//!
//! let key = Uuid::from_u128(0x42);
//! let store = Arc::new(MemoryMediaStore::new());
//! let services = Services {
//!     entities: Arc::new(MemoryEntityService::new().with(ObjectType::Document, 1050, key)),
//!     media: store.clone(),
//!     files: store,
//!     macros: Arc::new(MemoryMacroService::new()),
//!     data_types: Arc::new(MemoryDataTypeService::new()),
//! };
//! let registry = ConnectorRegistry::standard(&services).unwrap();
//!
//! // Export: the numeric id becomes a UDI and a dependency is recorded.
//! let property = Property::new("link", EditorAlias::ContentPicker, 1050);
//! let mut dependencies = Vec::new();
//! let portable = registry.to_portable(&property, &mut dependencies).unwrap();
//! assert_eq!(portable.as_deref(), Some("umb://document/00000000000000000000000000000042"));
//! assert_eq!(dependencies.len(), 1);
//!
//! // Import: the UDI becomes the local id again.
//! let mut item = Content::new(7, Uuid::new_v4())
//!     .with_property(Property::new("link", EditorAlias::ContentPicker, 0));
//! registry.from_portable(&mut item, "link", portable.as_deref()).unwrap();
//! assert_eq!(item.value("link").and_then(|v| v.as_integer()), Some(1050));
//! ```
//!
//! # Modules
//!
//! - [`model`]: UDIs, dependencies, property values and content items
//! - [`connectors`]: the [`ValueConnector`] trait and its implementations
//! - [`registry`]: connector lookup by property editor
//! - [`markup`]: rewriters for references embedded in rich text
//! - [`codec`]: the scalar and grid wire formats
//! - [`services`]: interfaces to the repository the connectors consult
//! - [`memory`]: in-memory service implementations
//! - [`error`]: error types
//!
//! # Failure Model
//!
//! References that cannot be resolved are dropped from the converted value
//! and logged; they are not errors. Errors are reserved for values a
//! connector cannot represent, corrupt portable values, and configuration
//! mistakes.

pub mod codec;
pub mod connectors;
pub mod error;
pub mod markup;
pub mod memory;
pub mod model;
pub mod registry;
pub mod services;
pub mod util;

// Re-export commonly used types at crate root
pub use connectors::ValueConnector;
pub use error::{ConnectorError, ErrorCode, LookupError, RegistryError};
pub use model::{
    Content, ContentBase, Decimal, Dependency, DependencyMode, EditorAlias, EntityType, ObjectType,
    Property, PropertyValue, Udi,
};
pub use registry::{ConnectorRegistry, ConnectorRegistryBuilder};
pub use services::Services;
pub use util::Timestamp;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
