//! Value connectors.
//!
//! A connector converts the stored value of one kind of property editor
//! between its local form, which may hold repository-specific numeric ids,
//! and a portable text form that only uses globally unique identifiers.
//! While exporting it also reports every entity the value refers to.
//!
//! Conversion is best-effort: a reference that cannot be resolved is dropped
//! from the output (and logged), never reported as an error.

pub mod content_picker;
pub mod custom;
pub mod default;
pub mod file;
pub mod grid;
pub mod media_picker;
pub mod rich_text;
pub mod tags;
pub mod tree_picker;

pub use content_picker::{ContentPicker2ValueConnector, ContentPickerValueConnector};
pub use custom::CustomValueConnector;
pub use default::DefaultValueConnector;
pub use file::{FileUploadValueConnector, ImageCropperValueConnector};
pub use grid::GridValueConnector;
pub use media_picker::{
    LegacyMediaPickerValueConnector, MediaPicker2ValueConnector, MultipleMediaPickerValueConnector,
};
pub use rich_text::RichTextValueConnector;
pub use tags::TagValueConnector;
pub use tree_picker::{MultiNodeTreePicker2ValueConnector, MultiNodeTreePickerValueConnector};

use crate::error::ConnectorError;
use crate::model::{ContentBase, Dependency, EditorAlias, Property};

/// Converts values of specific property editors to and from portable form.
pub trait ValueConnector: Send + Sync {
    /// Editors whose values this connector handles.
    fn editor_aliases(&self) -> Vec<EditorAlias>;

    /// Produces the portable form of a property's value.
    ///
    /// Entities referenced by the value are appended to `dependencies`. `None`
    /// means the property has no value.
    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError>;

    /// Stores the local form of a portable value on `content`.
    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError>;
}
