//! Data model types.
//!
//! This module contains the types shared by every connector:
//! - Portable identifiers (UDIs)
//! - Dependency records
//! - Raw property values
//! - Content items, properties and editor aliases

pub mod content;
pub mod dependency;
pub mod udi;
pub mod value;

pub use content::{Content, ContentBase, EditorAlias, Property};
pub use dependency::{Dependency, DependencyMode};
pub use udi::{join_udis, parse_udi_list, Addressing, EntityType, ObjectType, Udi, UDI_SCHEME};
pub use value::{Decimal, PropertyValue, ValueKind};
