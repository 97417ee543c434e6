//! Media pickers.

use std::sync::Arc;

use tracing::debug;

use crate::connectors::ValueConnector;
use crate::error::ConnectorError;
use crate::model::{
    ContentBase, Dependency, EditorAlias, ObjectType, Property, PropertyValue, Udi, join_udis,
    parse_udi_list,
};
use crate::services::{EntityService, id_for_udi, udi_exists, udi_for_id};

/// Single media picker storing a numeric id.
///
/// Import leaves the existing value alone when the UDI cannot be resolved.
pub struct LegacyMediaPickerValueConnector {
    entities: Arc<dyn EntityService>,
}

impl LegacyMediaPickerValueConnector {
    pub fn new(entities: Arc<dyn EntityService>) -> Self {
        Self { entities }
    }
}

impl ValueConnector for LegacyMediaPickerValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::MediaPicker]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(id) = property.value.as_integer() else {
            return Ok(None);
        };
        match udi_for_id(self.entities.as_ref(), id, ObjectType::Media) {
            Some(udi) => {
                let portable = udi.to_string();
                dependencies.push(Dependency::exists(udi));
                Ok(Some(portable))
            }
            None => {
                debug!(alias = %property.alias, id, "dropping reference to unknown media");
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
        let Some(udi) = value.and_then(Udi::parse).filter(|udi| !udi.is_nil()) else {
            return Ok(());
        };
        if udi.entity_type().object_type() != Some(ObjectType::Media) {
            return Ok(());
        }
        match id_for_udi(self.entities.as_ref(), &udi) {
            Some(id) => content.set_value(alias, PropertyValue::Text(id.to_string())),
            None => debug!(alias, %udi, "keeping current value, media not found"),
        }
        Ok(())
    }
}

/// Media picker storing a comma-separated list of numeric ids.
pub struct MultipleMediaPickerValueConnector {
    entities: Arc<dyn EntityService>,
}

impl MultipleMediaPickerValueConnector {
    pub fn new(entities: Arc<dyn EntityService>) -> Self {
        Self { entities }
    }
}

impl ValueConnector for MultipleMediaPickerValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::MultipleMediaPicker]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(text) = property.value.as_text() else {
            return Ok(None);
        };
        let mut udis = Vec::new();
        for item in text.split(',') {
            let Ok(id) = item.trim().parse::<i32>() else {
                continue;
            };
            match udi_for_id(self.entities.as_ref(), id, ObjectType::Media) {
                Some(udi) => udis.push(udi),
                None => debug!(alias = %property.alias, id, "dropping reference to unknown media"),
            }
        }
        dependencies.extend(udis.iter().cloned().map(Dependency::exists));
        Ok(Some(join_udis(&udis)))
    }

    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let ids: Vec<String> = parse_udi_list(value.unwrap_or_default())
            .filter(|udi| !udi.is_nil() && udi.entity_type().object_type() == Some(ObjectType::Media))
            .filter_map(|udi| id_for_udi(self.entities.as_ref(), &udi))
            .map(|id| id.to_string())
            .collect();
        content.set_value(alias, PropertyValue::Text(ids.join(",")));
        Ok(())
    }
}

/// Media picker storing a comma-separated list of UDIs.
pub struct MediaPicker2ValueConnector {
    entities: Arc<dyn EntityService>,
}

impl MediaPicker2ValueConnector {
    pub fn new(entities: Arc<dyn EntityService>) -> Self {
        Self { entities }
    }

    fn existing(&self, text: &str) -> Vec<Udi> {
        parse_udi_list(text)
            .filter(|udi| udi.entity_type().object_type() == Some(ObjectType::Media))
            .filter(|udi| udi_exists(self.entities.as_ref(), udi))
            .collect()
    }
}

impl ValueConnector for MediaPicker2ValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::MediaPicker2]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(text) = property.value.as_text() else {
            return Ok(None);
        };
        let udis = self.existing(text);
        dependencies.extend(udis.iter().cloned().map(Dependency::exists));
        Ok(Some(join_udis(&udis)))
    }

    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let udis = self.existing(value.unwrap_or_default());
        content.set_value(alias, PropertyValue::Text(join_udis(&udis)));
        Ok(())
    }
}
