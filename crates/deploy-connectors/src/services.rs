//! Interfaces to the repository services connectors depend on.
//!
//! None of these are implemented here against a real repository; the
//! [`memory`](crate::memory) module provides in-memory versions. Every lookup
//! may fail, and connectors treat a failure exactly like "not found".

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::LookupError;
use crate::model::{ObjectType, Udi};

/// Maps between local numeric ids and portable keys.
pub trait EntityService: Send + Sync {
    /// Returns the key of the entity with the given local id.
    fn key_for_id(&self, id: i32, object_type: ObjectType) -> Result<Option<Uuid>, LookupError>;

    /// Returns the local id of the entity with the given key.
    fn id_for_key(&self, key: Uuid, object_type: ObjectType) -> Result<Option<i32>, LookupError>;

    /// Returns whether an entity with the given key exists.
    fn exists(&self, key: Uuid, object_type: ObjectType) -> Result<bool, LookupError>;
}

/// Media library lookups and file deletion.
pub trait MediaService: Send + Sync {
    /// Finds the media item whose file lives at the given URL path.
    fn media_by_path(&self, path: &str) -> Result<Option<Udi>, LookupError>;

    /// Deletes a media file.
    fn delete_media_file(&self, path: &str) -> Result<(), LookupError>;
}

/// The file store holding uploaded media.
pub trait MediaFileSystem: Send + Sync {
    /// Converts a stored URL (`/media/1001/a.jpg`) to a path relative to the store root.
    fn relative_path(&self, url: &str) -> String;

    fn file_exists(&self, path: &str) -> bool;

    /// Reads a file's bytes, `Ok(None)` if the store cannot provide them.
    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, LookupError>;
}

/// Macro definitions referenced from rich text.
pub trait MacroService: Send + Sync {
    fn key_for_alias(&self, alias: &str) -> Result<Option<Uuid>, LookupError>;
}

/// Data type configuration.
pub trait DataTypeService: Send + Sync {
    /// Returns the raw pre-value stored under `key` for a data type.
    fn pre_value(&self, data_type_id: i32, key: &str) -> Result<Option<String>, LookupError>;
}

/// The collaborators needed to build the standard connector set.
#[derive(Clone)]
pub struct Services {
    pub entities: Arc<dyn EntityService>,
    pub media: Arc<dyn MediaService>,
    pub files: Arc<dyn MediaFileSystem>,
    pub macros: Arc<dyn MacroService>,
    pub data_types: Arc<dyn DataTypeService>,
}

/// Collapses a failed lookup into "not found", logging the failure.
pub(crate) fn found<T>(result: Result<Option<T>, LookupError>) -> Option<T> {
    result.unwrap_or_else(|err| {
        debug!(%err, "lookup failed, treating as not found");
        None
    })
}

/// Resolves a local id to its UDI.
pub(crate) fn udi_for_id(entities: &dyn EntityService, id: i32, object_type: ObjectType) -> Option<Udi> {
    found(entities.key_for_id(id, object_type)).map(|key| Udi::for_object(object_type, key))
}

/// Resolves a UDI back to a local id.
pub(crate) fn id_for_udi(entities: &dyn EntityService, udi: &Udi) -> Option<i32> {
    let object_type = udi.entity_type().object_type()?;
    let key = udi.key()?;
    found(entities.id_for_key(key, object_type))
}

/// Returns whether the entity a UDI points at exists.
pub(crate) fn udi_exists(entities: &dyn EntityService, udi: &Udi) -> bool {
    let (Some(object_type), Some(key)) = (udi.entity_type().object_type(), udi.key()) else {
        return false;
    };
    found(entities.exists(key, object_type).map(Some)).unwrap_or(false)
}
