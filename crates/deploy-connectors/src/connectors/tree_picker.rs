//! Multi-node tree pickers.
//!
//! Which tree the picker browses is part of its data type configuration: the
//! `startNode` pre-value is a JSON object whose `type` member is `content`,
//! `media` or `member`. Member trees are not converted.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::connectors::ValueConnector;
use crate::error::ConnectorError;
use crate::model::{
    ContentBase, Dependency, EditorAlias, ObjectType, Property, PropertyValue, Udi, join_udis,
    parse_udi_list,
};
use crate::services::{DataTypeService, EntityService, found, id_for_udi, udi_exists, udi_for_id};

const START_NODE_PRE_VALUE: &str = "startNode";

#[derive(Debug, Deserialize)]
struct StartNode {
    #[serde(rename = "type", default)]
    tree: Option<String>,
}

/// Returns the object type of the tree a picker browses, if it can be converted.
fn start_node_object_type(data_types: &dyn DataTypeService, data_type_id: i32) -> Option<ObjectType> {
    let raw = found(data_types.pre_value(data_type_id, START_NODE_PRE_VALUE))?;
    let start_node: StartNode = serde_json::from_str(&raw).ok()?;
    match start_node.tree?.as_str() {
        "content" => Some(ObjectType::Document),
        "media" => Some(ObjectType::Media),
        _ => None,
    }
}

fn convertible(udi: &Udi) -> bool {
    !udi.is_nil()
        && matches!(
            udi.entity_type().object_type(),
            Some(ObjectType::Document | ObjectType::Media)
        )
}

/// Tree picker storing a comma-separated list of numeric ids.
pub struct MultiNodeTreePickerValueConnector {
    entities: Arc<dyn EntityService>,
    data_types: Arc<dyn DataTypeService>,
}

impl MultiNodeTreePickerValueConnector {
    pub fn new(entities: Arc<dyn EntityService>, data_types: Arc<dyn DataTypeService>) -> Self {
        Self {
            entities,
            data_types,
        }
    }
}

impl ValueConnector for MultiNodeTreePickerValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::MultiNodeTreePicker]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(text) = property.value.as_text() else {
            return Ok(None);
        };
        let Some(object_type) = start_node_object_type(self.data_types.as_ref(), property.data_type_id)
        else {
            debug!(alias = %property.alias, "tree picker does not browse content or media");
            return Ok(Some(String::new()));
        };

        let mut udis = Vec::new();
        for item in text.split(',') {
            let Ok(id) = item.trim().parse::<i32>() else {
                continue;
            };
            match udi_for_id(self.entities.as_ref(), id, object_type) {
                Some(udi) => udis.push(udi),
                None => debug!(alias = %property.alias, id, "dropping reference to unknown node"),
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
            .filter(convertible)
            .filter_map(|udi| id_for_udi(self.entities.as_ref(), &udi))
            .map(|id| id.to_string())
            .collect();
        content.set_value(alias, PropertyValue::Text(ids.join(",")));
        Ok(())
    }
}

/// Tree picker storing a comma-separated list of UDIs.
pub struct MultiNodeTreePicker2ValueConnector {
    entities: Arc<dyn EntityService>,
    data_types: Arc<dyn DataTypeService>,
}

impl MultiNodeTreePicker2ValueConnector {
    pub fn new(entities: Arc<dyn EntityService>, data_types: Arc<dyn DataTypeService>) -> Self {
        Self {
            entities,
            data_types,
        }
    }

    fn existing(&self, text: &str) -> Vec<Udi> {
        parse_udi_list(text)
            .filter(convertible)
            .filter(|udi| udi_exists(self.entities.as_ref(), udi))
            .collect()
    }
}

impl ValueConnector for MultiNodeTreePicker2ValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::MultiNodeTreePicker2]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(text) = property.value.as_text() else {
            return Ok(None);
        };
        if start_node_object_type(self.data_types.as_ref(), property.data_type_id).is_none() {
            debug!(alias = %property.alias, "tree picker does not browse content or media");
            return Ok(Some(String::new()));
        }
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
