//! Content items, their properties and the editors that own them.

use std::fmt;

use tracing::debug;
use uuid::Uuid;

use crate::model::PropertyValue;

/// Identifies the property editor that stores a value.
///
/// Built-in editors get their own variant; anything else is kept verbatim in
/// [`EditorAlias::Other`] so custom connectors can still claim it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditorAlias {
    ContentPicker,
    ContentPicker2,
    MediaPicker,
    MultipleMediaPicker,
    MediaPicker2,
    MultiNodeTreePicker,
    MultiNodeTreePicker2,
    UploadField,
    ImageCropper,
    RichText,
    Grid,
    Tags,
    Other(String),
}

/// Alias grid layouts use for rich text controls.
const GRID_RICH_TEXT_ALIAS: &str = "rte";

impl EditorAlias {
    /// Returns the repository's alias string for this editor.
    pub fn as_str(&self) -> &str {
        match self {
            EditorAlias::ContentPicker => "Umbraco.ContentPickerAlias",
            EditorAlias::ContentPicker2 => "Umbraco.ContentPicker2",
            EditorAlias::MediaPicker => "Umbraco.MediaPicker",
            EditorAlias::MultipleMediaPicker => "Umbraco.MultipleMediaPicker",
            EditorAlias::MediaPicker2 => "Umbraco.MediaPicker2",
            EditorAlias::MultiNodeTreePicker => "Umbraco.MultiNodeTreePicker",
            EditorAlias::MultiNodeTreePicker2 => "Umbraco.MultiNodeTreePicker2",
            EditorAlias::UploadField => "Umbraco.UploadField",
            EditorAlias::ImageCropper => "Umbraco.ImageCropper",
            EditorAlias::RichText => "Umbraco.TinyMCEv3",
            EditorAlias::Grid => "Umbraco.Grid",
            EditorAlias::Tags => "Umbraco.Tags",
            EditorAlias::Other(alias) => alias,
        }
    }

    /// Maps an alias string to its editor. Unknown aliases become [`EditorAlias::Other`].
    pub fn from_alias(alias: &str) -> EditorAlias {
        match alias {
            "Umbraco.ContentPickerAlias" => EditorAlias::ContentPicker,
            "Umbraco.ContentPicker2" => EditorAlias::ContentPicker2,
            "Umbraco.MediaPicker" => EditorAlias::MediaPicker,
            "Umbraco.MultipleMediaPicker" => EditorAlias::MultipleMediaPicker,
            "Umbraco.MediaPicker2" => EditorAlias::MediaPicker2,
            "Umbraco.MultiNodeTreePicker" => EditorAlias::MultiNodeTreePicker,
            "Umbraco.MultiNodeTreePicker2" => EditorAlias::MultiNodeTreePicker2,
            "Umbraco.UploadField" => EditorAlias::UploadField,
            "Umbraco.ImageCropper" => EditorAlias::ImageCropper,
            "Umbraco.TinyMCEv3" | GRID_RICH_TEXT_ALIAS => EditorAlias::RichText,
            "Umbraco.Grid" => EditorAlias::Grid,
            "Umbraco.Tags" => EditorAlias::Tags,
            other => EditorAlias::Other(other.to_string()),
        }
    }
}

impl From<&str> for EditorAlias {
    fn from(alias: &str) -> Self {
        EditorAlias::from_alias(alias)
    }
}

impl fmt::Display for EditorAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property of a content item together with its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub alias: String,
    pub editor: EditorAlias,
    /// Data type the property is configured with (pre-values hang off this).
    pub data_type_id: i32,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(
        alias: impl Into<String>,
        editor: impl Into<EditorAlias>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            alias: alias.into(),
            editor: editor.into(),
            data_type_id: 0,
            value: value.into(),
        }
    }

    /// Sets the data type id.
    pub fn with_data_type(mut self, data_type_id: i32) -> Self {
        self.data_type_id = data_type_id;
        self
    }
}

/// Read/write access to the properties of a content item.
pub trait ContentBase {
    /// Looks up a property by alias.
    fn property(&self, alias: &str) -> Option<&Property>;

    /// Stores a value on the property with the given alias.
    fn set_value(&mut self, alias: &str, value: PropertyValue);

    /// Returns the current value of a property.
    fn value(&self, alias: &str) -> Option<&PropertyValue> {
        self.property(alias).map(|p| &p.value)
    }

    /// Returns the current value of a property if it is text.
    fn text_value(&self, alias: &str) -> Option<&str> {
        self.value(alias).and_then(PropertyValue::as_text)
    }
}

/// In-memory content item.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub id: i32,
    pub key: Uuid,
    pub properties: Vec<Property>,
}

impl Content {
    pub fn new(id: i32, key: Uuid) -> Self {
        Self {
            id,
            key,
            properties: Vec::new(),
        }
    }

    /// Adds a property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }
}

impl ContentBase for Content {
    fn property(&self, alias: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.alias == alias)
    }

    /// Values for aliases the item does not define are discarded.
    fn set_value(&mut self, alias: &str, value: PropertyValue) {
        match self.properties.iter_mut().find(|p| p.alias == alias) {
            Some(property) => property.value = value,
            None => debug!(content = self.id, alias, "ignoring value for undefined property"),
        }
    }
}
