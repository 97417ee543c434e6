//! Lookup of value connectors by property editor.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use deploy_connectors::connectors::{ContentPicker2ValueConnector, GridValueConnector};
//! use deploy_connectors::memory::{MemoryEntityService, MemoryMediaStore};
//! use deploy_connectors::model::EditorAlias;
//! use deploy_connectors::registry::ConnectorRegistry;
//!
//! let entities = Arc::new(MemoryEntityService::new());
//! let media = Arc::new(MemoryMediaStore::new());
//!
//! let registry = ConnectorRegistry::builder()
//!     .register(ContentPicker2ValueConnector::new(entities))
//!     .register_with(move |registry| GridValueConnector::new(registry, media))
//!     .build()
//!     .unwrap();
//!
//! assert!(registry.contains(&EditorAlias::Grid));
//! assert_eq!(registry.len(), 2);
//! ```

use std::sync::{Arc, Weak};

use rustc_hash::FxHashMap;

use crate::connectors::{
    ContentPicker2ValueConnector, ContentPickerValueConnector, DefaultValueConnector,
    FileUploadValueConnector, GridValueConnector, ImageCropperValueConnector,
    LegacyMediaPickerValueConnector, MediaPicker2ValueConnector, MultiNodeTreePicker2ValueConnector,
    MultiNodeTreePickerValueConnector, MultipleMediaPickerValueConnector, RichTextValueConnector,
    TagValueConnector, ValueConnector,
};
use crate::error::{ConnectorError, RegistryError};
use crate::markup::{ImageSourceRewriter, LocalLinkRewriter, MacroRewriter};
use crate::model::{ContentBase, Dependency, EditorAlias, Property};
use crate::services::Services;

type ConnectorFactory = Box<dyn FnOnce(Weak<ConnectorRegistry>) -> Arc<dyn ValueConnector>>;

/// Connectors keyed by the editor aliases they claim.
///
/// Editors nobody claims are handled by the fallback connector.
pub struct ConnectorRegistry {
    connectors: FxHashMap<EditorAlias, Arc<dyn ValueConnector>>,
    fallback: Arc<dyn ValueConnector>,
}

impl ConnectorRegistry {
    pub fn builder() -> ConnectorRegistryBuilder {
        ConnectorRegistryBuilder::new()
    }

    /// Builds the registry holding every built-in connector.
    pub fn standard(services: &Services) -> Result<Arc<ConnectorRegistry>, RegistryError> {
        let entities = &services.entities;
        let media = services.media.clone();
        ConnectorRegistry::builder()
            .register(ContentPickerValueConnector::new(entities.clone()))
            .register(ContentPicker2ValueConnector::new(entities.clone()))
            .register(LegacyMediaPickerValueConnector::new(entities.clone()))
            .register(MultipleMediaPickerValueConnector::new(entities.clone()))
            .register(MediaPicker2ValueConnector::new(entities.clone()))
            .register(MultiNodeTreePickerValueConnector::new(
                entities.clone(),
                services.data_types.clone(),
            ))
            .register(MultiNodeTreePicker2ValueConnector::new(
                entities.clone(),
                services.data_types.clone(),
            ))
            .register(FileUploadValueConnector::new(
                services.media.clone(),
                services.files.clone(),
            ))
            .register(ImageCropperValueConnector::new(
                services.media.clone(),
                services.files.clone(),
            ))
            .register(RichTextValueConnector::new(
                LocalLinkRewriter::new(entities.clone()),
                ImageSourceRewriter::new(entities.clone()),
                MacroRewriter::new(services.macros.clone()),
            ))
            .register(TagValueConnector::new())
            .register_with(move |registry| GridValueConnector::new(registry, media))
            .build()
    }

    /// Returns the connector for an editor, falling back to the default one.
    pub fn resolve(&self, editor: &EditorAlias) -> Arc<dyn ValueConnector> {
        self.connectors
            .get(editor)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Returns the connector used for editors nobody claims.
    pub fn default_connector(&self) -> Arc<dyn ValueConnector> {
        self.fallback.clone()
    }

    /// Whether a dedicated connector claims the editor.
    pub fn contains(&self, editor: &EditorAlias) -> bool {
        self.connectors.contains_key(editor)
    }

    /// Iterates over the claimed editor aliases, in no particular order.
    pub fn aliases(&self) -> impl Iterator<Item = &EditorAlias> {
        self.connectors.keys()
    }

    /// Number of claimed editor aliases.
    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    /// Converts a property with the connector for its editor.
    pub fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        self.resolve(&property.editor).to_portable(property, dependencies)
    }

    /// Imports a portable value into the property `alias` of `content`.
    ///
    /// The connector is chosen by the editor of the target property, which must exist.
    pub fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let editor = content
            .property(alias)
            .map(|p| p.editor.clone())
            .ok_or_else(|| ConnectorError::PropertyNotFound {
                alias: alias.to_string(),
            })?;
        self.resolve(&editor).from_portable(content, alias, value)
    }
}

/// Assembles a [`ConnectorRegistry`].
///
/// Two connectors claiming the same editor alias is a configuration mistake
/// and fails [`ConnectorRegistryBuilder::build`].
pub struct ConnectorRegistryBuilder {
    fallback: Option<Arc<dyn ValueConnector>>,
    factories: Vec<ConnectorFactory>,
}

impl ConnectorRegistryBuilder {
    pub fn new() -> Self {
        Self {
            fallback: None,
            factories: Vec::new(),
        }
    }

    /// Replaces [`DefaultValueConnector`] as the fallback.
    pub fn fallback<C: ValueConnector + 'static>(mut self, connector: C) -> Self {
        self.fallback = Some(Arc::new(connector));
        self
    }

    /// Adds a connector.
    pub fn register<C: ValueConnector + 'static>(mut self, connector: C) -> Self {
        let connector: Arc<dyn ValueConnector> = Arc::new(connector);
        self.factories
            .push(Box::new(move |_: Weak<ConnectorRegistry>| connector));
        self
    }

    /// Adds a connector that needs a handle to the registry being built.
    ///
    /// The handle cannot be upgraded until [`build`](Self::build) returns.
    pub fn register_with<C, F>(mut self, factory: F) -> Self
    where
        C: ValueConnector + 'static,
        F: FnOnce(Weak<ConnectorRegistry>) -> C + 'static,
    {
        self.factories.push(Box::new(
            move |registry: Weak<ConnectorRegistry>| -> Arc<dyn ValueConnector> {
                Arc::new(factory(registry))
            },
        ));
        self
    }

    pub fn build(self) -> Result<Arc<ConnectorRegistry>, RegistryError> {
        let fallback = self
            .fallback
            .unwrap_or_else(|| Arc::new(DefaultValueConnector::new()));
        let factories = self.factories;
        let mut duplicate = None;

        let registry = Arc::new_cyclic(|handle: &Weak<ConnectorRegistry>| {
            let mut connectors: FxHashMap<EditorAlias, Arc<dyn ValueConnector>> = FxHashMap::default();
            for factory in factories {
                let connector = factory(handle.clone());
                for alias in connector.editor_aliases() {
                    if connectors.contains_key(&alias) {
                        duplicate.get_or_insert(alias);
                        continue;
                    }
                    connectors.insert(alias, connector.clone());
                }
            }
            ConnectorRegistry {
                connectors,
                fallback,
            }
        });

        match duplicate {
            Some(alias) => Err(RegistryError::DuplicateEditorAlias { alias }),
            None => Ok(registry),
        }
    }
}

impl Default for ConnectorRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::connectors::CustomValueConnector;
    use crate::memory::{
        MemoryDataTypeService, MemoryEntityService, MemoryMacroService, MemoryMediaStore,
    };
    use crate::model::{Content, PropertyValue};

    fn services() -> Services {
        let store = Arc::new(MemoryMediaStore::new());
        Services {
            entities: Arc::new(MemoryEntityService::new()),
            media: store.clone(),
            files: store,
            macros: Arc::new(MemoryMacroService::new()),
            data_types: Arc::new(MemoryDataTypeService::new()),
        }
    }

    fn shout(alias: &str) -> CustomValueConnector {
        CustomValueConnector::new(
            [EditorAlias::from(alias)],
            |property, _| Ok(property.value.as_text().map(str::to_uppercase)),
            |content, alias, value| {
                content.set_value(alias, value.map(str::to_lowercase).into());
                Ok(())
            },
        )
    }

    #[test]
    fn test_standard_claims_builtin_editors() {
        let registry = ConnectorRegistry::standard(&services()).unwrap();
        for editor in [
            EditorAlias::ContentPicker,
            EditorAlias::ContentPicker2,
            EditorAlias::MediaPicker,
            EditorAlias::MultipleMediaPicker,
            EditorAlias::MediaPicker2,
            EditorAlias::MultiNodeTreePicker,
            EditorAlias::MultiNodeTreePicker2,
            EditorAlias::UploadField,
            EditorAlias::ImageCropper,
            EditorAlias::RichText,
            EditorAlias::Grid,
            EditorAlias::Tags,
        ] {
            assert!(registry.contains(&editor), "{editor} is not claimed");
        }
        assert_eq!(registry.len(), 12);
        assert!(!registry.contains(&EditorAlias::from("Umbraco.Textbox")));
    }

    #[test]
    fn test_unknown_editor_uses_fallback() {
        let registry = ConnectorRegistry::builder().build().unwrap();
        assert!(registry.is_empty());

        let property = Property::new("title", "Umbraco.Textbox", "hello");
        let mut deps = Vec::new();
        assert_eq!(
            registry.to_portable(&property, &mut deps),
            Ok(Some("shello".to_string()))
        );
    }

    #[test]
    fn test_duplicate_alias_fails_build() {
        let result = ConnectorRegistry::builder()
            .register(shout("My.Shout"))
            .register(shout("My.Shout"))
            .build();
        assert_eq!(
            result.err(),
            Some(RegistryError::DuplicateEditorAlias {
                alias: EditorAlias::from("My.Shout")
            })
        );
    }

    #[test]
    fn test_custom_connector_and_import_routing() {
        let registry = ConnectorRegistry::builder()
            .register(shout("My.Shout"))
            .build()
            .unwrap();
        assert_eq!(registry.aliases().collect::<Vec<_>>(), vec![&EditorAlias::from("My.Shout")]);

        let mut item = Content::new(1, Uuid::nil())
            .with_property(Property::new("a", "My.Shout", PropertyValue::Null))
            .with_property(Property::new("b", "Umbraco.Textbox", PropertyValue::Null));
        registry.from_portable(&mut item, "a", Some("LOUD")).unwrap();
        registry.from_portable(&mut item, "b", Some("i5")).unwrap();
        assert_eq!(item.text_value("a"), Some("loud"));
        assert_eq!(item.value("b"), Some(&PropertyValue::Integer(5)));

        assert_eq!(
            registry.from_portable(&mut item, "c", Some("x")),
            Err(ConnectorError::PropertyNotFound { alias: "c".to_string() })
        );
    }

    #[test]
    fn test_replacing_the_fallback() {
        let registry = ConnectorRegistry::builder()
            .fallback(shout("ignored"))
            .build()
            .unwrap();
        let property = Property::new("title", "Umbraco.Textbox", "hi");
        assert_eq!(
            registry.to_portable(&property, &mut Vec::new()),
            Ok(Some("HI".to_string()))
        );
    }
}
