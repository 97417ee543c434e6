//! In-memory implementations of the service interfaces.
//!
//! Useful for tests and for converting values outside a running repository.

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::error::LookupError;
use crate::model::{ObjectType, Udi};
use crate::services::{DataTypeService, EntityService, MacroService, MediaFileSystem, MediaService};

/// Prefix of media URLs relative to the site root.
const MEDIA_URL_PREFIX: &str = "/media/";

/// Entity id/key map.
#[derive(Debug, Default)]
pub struct MemoryEntityService {
    keys: FxHashMap<(ObjectType, i32), Uuid>,
    ids: FxHashMap<(ObjectType, Uuid), i32>,
    unavailable: bool,
}

impl MemoryEntityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity.
    pub fn insert(&mut self, object_type: ObjectType, id: i32, key: Uuid) {
        self.keys.insert((object_type, id), key);
        self.ids.insert((object_type, key), id);
    }

    /// Registers an entity with a fresh random key and returns the key.
    pub fn insert_new(&mut self, object_type: ObjectType, id: i32) -> Uuid {
        let key = Uuid::new_v4();
        self.insert(object_type, id, key);
        key
    }

    /// Builder form of [`MemoryEntityService::insert`].
    pub fn with(mut self, object_type: ObjectType, id: i32, key: Uuid) -> Self {
        self.insert(object_type, id, key);
        self
    }

    /// Makes every lookup fail, as an unreachable repository would.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    fn check(&self) -> Result<(), LookupError> {
        if self.unavailable {
            return Err(LookupError::new("entity", "service unavailable"));
        }
        Ok(())
    }
}

impl EntityService for MemoryEntityService {
    fn key_for_id(&self, id: i32, object_type: ObjectType) -> Result<Option<Uuid>, LookupError> {
        self.check()?;
        Ok(self.keys.get(&(object_type, id)).copied())
    }

    fn id_for_key(&self, key: Uuid, object_type: ObjectType) -> Result<Option<i32>, LookupError> {
        self.check()?;
        Ok(self.ids.get(&(object_type, key)).copied())
    }

    fn exists(&self, key: Uuid, object_type: ObjectType) -> Result<bool, LookupError> {
        self.check()?;
        Ok(self.ids.contains_key(&(object_type, key)))
    }
}

/// Media library plus file store.
#[derive(Debug, Default)]
pub struct MemoryMediaStore {
    files: Mutex<FxHashMap<String, Vec<u8>>>,
    media: FxHashMap<String, Udi>,
    deleted: Mutex<Vec<String>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file at a path relative to the store root.
    pub fn with_file(self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), contents.into());
        self
    }

    /// Adds a media item whose file is served from `url`.
    pub fn with_media(mut self, url: impl Into<String>, udi: Udi) -> Self {
        self.media.insert(url.into(), udi);
        self
    }

    /// Returns the paths passed to [`MediaService::delete_media_file`], in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MediaService for MemoryMediaStore {
    fn media_by_path(&self, path: &str) -> Result<Option<Udi>, LookupError> {
        Ok(self.media.get(path).cloned())
    }

    fn delete_media_file(&self, path: &str) -> Result<(), LookupError> {
        let relative = self.relative_path(path);
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&relative);
        self.deleted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
        Ok(())
    }
}

impl MediaFileSystem for MemoryMediaStore {
    fn relative_path(&self, url: &str) -> String {
        url.strip_prefix(MEDIA_URL_PREFIX)
            .unwrap_or(url)
            .trim_start_matches('/')
            .to_string()
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, LookupError> {
        Ok(self
            .files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned())
    }
}

/// Macro alias to key map.
#[derive(Debug, Default)]
pub struct MemoryMacroService {
    keys: FxHashMap<String, Uuid>,
}

impl MemoryMacroService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, alias: impl Into<String>, key: Uuid) -> Self {
        self.keys.insert(alias.into(), key);
        self
    }
}

impl MacroService for MemoryMacroService {
    fn key_for_alias(&self, alias: &str) -> Result<Option<Uuid>, LookupError> {
        Ok(self.keys.get(alias).copied())
    }
}

/// Pre-values keyed by data type id and pre-value alias.
#[derive(Debug, Default)]
pub struct MemoryDataTypeService {
    pre_values: FxHashMap<(i32, String), String>,
}

impl MemoryDataTypeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, data_type_id: i32, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pre_values.insert((data_type_id, key.into()), value.into());
        self
    }
}

impl DataTypeService for MemoryDataTypeService {
    fn pre_value(&self, data_type_id: i32, key: &str) -> Result<Option<String>, LookupError> {
        Ok(self.pre_values.get(&(data_type_id, key.to_string())).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_service_lookups() {
        let key = Uuid::from_u128(42);
        let entities = MemoryEntityService::new().with(ObjectType::Document, 1, key);

        assert_eq!(entities.key_for_id(1, ObjectType::Document), Ok(Some(key)));
        assert_eq!(entities.key_for_id(1, ObjectType::Media), Ok(None));
        assert_eq!(entities.id_for_key(key, ObjectType::Document), Ok(Some(1)));
        assert_eq!(entities.exists(key, ObjectType::Document), Ok(true));

        let down = MemoryEntityService::new().unavailable();
        assert!(down.key_for_id(1, ObjectType::Document).is_err());
    }

    #[test]
    fn test_media_store_paths() {
        let store = MemoryMediaStore::new().with_file("1001/a.jpg", b"jpeg".to_vec());
        assert_eq!(store.relative_path("/media/1001/a.jpg"), "1001/a.jpg");
        assert_eq!(store.relative_path("1001/a.jpg"), "1001/a.jpg");
        assert!(store.file_exists("1001/a.jpg"));

        store.delete_media_file("/media/1001/a.jpg").unwrap();
        assert!(!store.file_exists("1001/a.jpg"));
        assert_eq!(store.deleted(), vec!["/media/1001/a.jpg".to_string()]);
    }
}
