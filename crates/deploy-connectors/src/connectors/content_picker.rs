//! Single document pickers.

use std::sync::Arc;

use tracing::debug;

use crate::connectors::ValueConnector;
use crate::error::ConnectorError;
use crate::model::{ContentBase, Dependency, EditorAlias, ObjectType, Property, PropertyValue, Udi};
use crate::services::{EntityService, id_for_udi, udi_exists, udi_for_id};

/// Content picker storing the picked document's numeric id.
///
/// Exports the document's UDI. An id that does not resolve exports as the
/// empty string; a UDI that does not resolve imports as `Null`.
pub struct ContentPickerValueConnector {
    entities: Arc<dyn EntityService>,
}

impl ContentPickerValueConnector {
    pub fn new(entities: Arc<dyn EntityService>) -> Self {
        Self { entities }
    }
}

impl ValueConnector for ContentPickerValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::ContentPicker]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(id) = property.value.as_integer() else {
            return Ok(None);
        };
        match udi_for_id(self.entities.as_ref(), id, ObjectType::Document) {
            Some(udi) => {
                let portable = udi.to_string();
                dependencies.push(Dependency::exists(udi));
                Ok(Some(portable))
            }
            None => {
                debug!(alias = %property.alias, id, "dropping reference to unknown document");
                Ok(Some(String::new()))
            }
        }
    }

    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let id = value
            .and_then(Udi::parse)
            .filter(|udi| udi.entity_type().object_type() == Some(ObjectType::Document))
            .and_then(|udi| id_for_udi(self.entities.as_ref(), &udi));
        content.set_value(alias, id.into());
        Ok(())
    }
}

/// Content picker storing the picked document's UDI.
///
/// The UDI is kept only if the document exists; otherwise the value becomes
/// the empty string on export and `Null` on import.
pub struct ContentPicker2ValueConnector {
    entities: Arc<dyn EntityService>,
}

impl ContentPicker2ValueConnector {
    pub fn new(entities: Arc<dyn EntityService>) -> Self {
        Self { entities }
    }

    /// Parses `value` as the UDI of an existing document.
    fn existing(&self, value: &str) -> Option<Udi> {
        Udi::parse(value)
            .filter(|udi| udi.entity_type().object_type() == Some(ObjectType::Document))
            .filter(|udi| udi_exists(self.entities.as_ref(), udi))
    }
}

impl ValueConnector for ContentPicker2ValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::ContentPicker2]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(text) = property.value.non_blank_text() else {
            return Ok(None);
        };
        match self.existing(text) {
            Some(udi) => {
                let portable = udi.to_string();
                dependencies.push(Dependency::exists(udi));
                Ok(Some(portable))
            }
            None => {
                debug!(alias = %property.alias, value = text, "dropping reference to unknown document");
                Ok(Some(String::new()))
            }
        }
    }

    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let local = value
            .and_then(|text| self.existing(text))
            .map_or(PropertyValue::Null, |udi| PropertyValue::Text(udi.to_string()));
        content.set_value(alias, local);
        Ok(())
    }
}
