//! Fallback connector for editors without a dedicated one.

use crate::codec::TypedScalar;
use crate::connectors::ValueConnector;
use crate::error::ConnectorError;
use crate::model::{ContentBase, Dependency, EditorAlias, Property, PropertyValue};

/// Writes scalars with a one-character type tag so they survive the trip
/// with their kind intact. Never reports dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueConnector;

impl DefaultValueConnector {
    pub fn new() -> Self {
        Self
    }
}

impl ValueConnector for DefaultValueConnector {
    /// Not bound to any editor; the registry falls back to it.
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        Vec::new()
    }

    fn to_portable(
        &self,
        property: &Property,
        _dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        Ok(TypedScalar::from_value(&property.value)?.map(|scalar| scalar.encode()))
    }

    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let local = match value {
            None => PropertyValue::Null,
            Some("") => PropertyValue::Text(String::new()),
            Some(encoded) => TypedScalar::decode(encoded)?.into_value(),
        };
        content.set_value(alias, local);
        Ok(())
    }
}
