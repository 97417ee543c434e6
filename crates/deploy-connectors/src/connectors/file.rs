//! Connectors for values that point at an uploaded media file.
//!
//! The file itself travels with the deployment, so export records a
//! `media-file` dependency that must be deployed first and must match the
//! source byte for byte. Import removes the file the value pointed at before,
//! if it changed.

use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::connectors::ValueConnector;
use crate::error::ConnectorError;
use crate::model::{ContentBase, Dependency, EditorAlias, Property, Udi};
use crate::services::{MediaFileSystem, MediaService, found};

/// Hex-encoded SHA-256 digest.
fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Builds the dependency on the file behind `url`, if the store has it.
fn file_dependency(files: &dyn MediaFileSystem, url: &str) -> Option<Dependency> {
    let path = files.relative_path(url);
    if !files.file_exists(&path) {
        return None;
    }
    let checksum = found(files.read_file(&path)).map(|bytes| sha256_hex(&bytes));
    let dependency = Dependency::matches(Udi::media_file(path)).ordered();
    Some(match checksum {
        Some(checksum) => dependency.with_checksum(checksum),
        None => dependency,
    })
}

fn delete_replaced_file(media: &dyn MediaService, alias: &str, path: &str) {
    if let Err(err) = media.delete_media_file(path) {
        warn!(alias, path, %err, "failed to delete replaced media file");
    }
}

/// Upload field storing the URL of a single file.
pub struct FileUploadValueConnector {
    media: Arc<dyn MediaService>,
    files: Arc<dyn MediaFileSystem>,
}

impl FileUploadValueConnector {
    pub fn new(media: Arc<dyn MediaService>, files: Arc<dyn MediaFileSystem>) -> Self {
        Self { media, files }
    }
}

impl ValueConnector for FileUploadValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::UploadField]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(url) = property.value.as_text() else {
            return Ok(None);
        };
        if url.trim().is_empty() {
            return Ok(Some(url.to_string()));
        }
        if url.contains([',', ';']) {
            return Err(ConnectorError::MultipleFiles {
                alias: property.alias.clone(),
                value: url.to_string(),
            });
        }
        dependencies.extend(file_dependency(self.files.as_ref(), url));
        Ok(Some(url.to_string()))
    }

    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let current = content.text_value(alias).map(str::to_string);
        content.set_value(alias, value.into());

        if let Some(current) = current.filter(|c| !c.trim().is_empty()) {
            if Some(current.as_str()) != value {
                delete_replaced_file(self.media.as_ref(), alias, &current);
            }
        }
        Ok(())
    }
}

/// Image cropper storing a JSON document whose `src` member is the file URL.
pub struct ImageCropperValueConnector {
    media: Arc<dyn MediaService>,
    files: Arc<dyn MediaFileSystem>,
}

impl ImageCropperValueConnector {
    pub fn new(media: Arc<dyn MediaService>, files: Arc<dyn MediaFileSystem>) -> Self {
        Self { media, files }
    }
}

/// Extracts `src` from a cropper value. Unparseable documents have none.
fn cropper_source(json: &str) -> Option<String> {
    let document: Value = serde_json::from_str(json).ok()?;
    document.get("src")?.as_str().map(str::to_string)
}

impl ValueConnector for ImageCropperValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::ImageCropper]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(json) = property.value.as_text() else {
            return Ok(None);
        };
        if let Some(src) = cropper_source(json).filter(|src| !src.trim().is_empty()) {
            dependencies.extend(file_dependency(self.files.as_ref(), &src));
        }
        Ok(Some(json.to_string()))
    }

    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let current = content
            .text_value(alias)
            .filter(|v| !v.trim().is_empty())
            .map(cropper_source);
        content.set_value(alias, value.into());

        if let Some(Some(current_src)) = current {
            let new_src = value.and_then(cropper_source);
            if new_src.as_deref() != Some(current_src.as_str()) {
                delete_replaced_file(self.media.as_ref(), alias, &current_src);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::memory::MemoryMediaStore;
    use crate::model::{Content, DependencyMode, PropertyValue};

    fn store() -> Arc<MemoryMediaStore> {
        Arc::new(
            MemoryMediaStore::new()
                .with_file("1001/a.jpg", b"abc".to_vec())
                .with_file("1002/b.png", b"png".to_vec()),
        )
    }

    fn upload(store: &Arc<MemoryMediaStore>) -> FileUploadValueConnector {
        FileUploadValueConnector::new(store.clone(), store.clone())
    }

    fn cropper(store: &Arc<MemoryMediaStore>) -> ImageCropperValueConnector {
        ImageCropperValueConnector::new(store.clone(), store.clone())
    }

    #[test]
    fn test_checksum() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_upload_export() {
        let store = store();
        let property = Property::new("file", EditorAlias::UploadField, "/media/1001/a.jpg");
        let mut deps = Vec::new();

        let portable = upload(&store).to_portable(&property, &mut deps).unwrap();
        assert_eq!(portable.as_deref(), Some("/media/1001/a.jpg"));
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].udi, Udi::media_file("1001/a.jpg"));
        assert_eq!(deps[0].mode, DependencyMode::MustMatch);
        assert!(deps[0].ordering);
        assert_eq!(deps[0].checksum.as_deref(), Some(sha256_hex(b"abc").as_str()));
    }

    #[test]
    fn test_upload_export_missing_file_and_blank() {
        let store = store();
        let mut deps = Vec::new();

        let missing = Property::new("file", EditorAlias::UploadField, "/media/9/gone.jpg");
        assert_eq!(
            upload(&store).to_portable(&missing, &mut deps),
            Ok(Some("/media/9/gone.jpg".to_string()))
        );
        let blank = Property::new("file", EditorAlias::UploadField, " ");
        assert_eq!(upload(&store).to_portable(&blank, &mut deps), Ok(Some(" ".to_string())));
        assert!(deps.is_empty());
    }

    #[test]
    fn test_upload_rejects_multiple_files() {
        let store = store();
        for value in ["/media/1/a.jpg,/media/2/b.jpg", "/media/1/a.jpg;/media/2/b.jpg"] {
            let property = Property::new("file", EditorAlias::UploadField, value);
            let result = upload(&store).to_portable(&property, &mut Vec::new());
            assert!(matches!(result, Err(ConnectorError::MultipleFiles { .. })));
        }
    }

    #[test]
    fn test_upload_import_deletes_replaced_file() {
        let store = store();
        let mut item = Content::new(1, Uuid::nil())
            .with_property(Property::new("file", EditorAlias::UploadField, "/media/1001/a.jpg"));

        upload(&store)
            .from_portable(&mut item, "file", Some("/media/1002/b.png"))
            .unwrap();
        assert_eq!(item.text_value("file"), Some("/media/1002/b.png"));
        assert_eq!(store.deleted(), vec!["/media/1001/a.jpg".to_string()]);

        // same path again: nothing to delete
        upload(&store)
            .from_portable(&mut item, "file", Some("/media/1002/b.png"))
            .unwrap();
        assert_eq!(store.deleted().len(), 1);
    }

    #[test]
    fn test_upload_import_from_empty_deletes_nothing() {
        let store = store();
        let mut item = Content::new(1, Uuid::nil())
            .with_property(Property::new("file", EditorAlias::UploadField, ""));
        upload(&store)
            .from_portable(&mut item, "file", Some("/media/1001/a.jpg"))
            .unwrap();
        assert!(store.deleted().is_empty());

        upload(&store).from_portable(&mut item, "file", None).unwrap();
        assert_eq!(item.value("file"), Some(&PropertyValue::Null));
        assert_eq!(store.deleted(), vec!["/media/1001/a.jpg".to_string()]);
    }

    #[test]
    fn test_cropper() {
        let store = store();
        let json = r#"{"src":"/media/1001/a.jpg","crops":[]}"#;
        let property = Property::new("photo", EditorAlias::ImageCropper, json);
        let mut deps = Vec::new();

        let portable = cropper(&store).to_portable(&property, &mut deps).unwrap();
        assert_eq!(portable.as_deref(), Some(json));
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].udi, Udi::media_file("1001/a.jpg"));

        let mut item = Content::new(1, Uuid::nil())
            .with_property(Property::new("photo", EditorAlias::ImageCropper, json));
        cropper(&store)
            .from_portable(&mut item, "photo", Some(r#"{"src":"/media/1002/b.png"}"#))
            .unwrap();
        assert_eq!(store.deleted(), vec!["/media/1001/a.jpg".to_string()]);
    }

    #[test]
    fn test_cropper_tolerates_bad_json() {
        let store = store();
        let property = Property::new("photo", EditorAlias::ImageCropper, "not json");
        let mut deps = Vec::new();
        assert_eq!(
            cropper(&store).to_portable(&property, &mut deps),
            Ok(Some("not json".to_string()))
        );
        assert!(deps.is_empty());
    }
}
