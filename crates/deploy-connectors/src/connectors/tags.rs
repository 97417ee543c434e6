//! Tag lists.

use crate::connectors::ValueConnector;
use crate::error::ConnectorError;
use crate::model::{ContentBase, Dependency, EditorAlias, Property};

/// Tags are plain text on both sides and reference nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagValueConnector;

impl TagValueConnector {
    pub fn new() -> Self {
        Self
    }
}

impl ValueConnector for TagValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::Tags]
    }

    fn to_portable(
        &self,
        property: &Property,
        _dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        Ok(property.value.as_text().map(str::to_string))
    }

    /// Fails if the item has no property with the given alias, since the tag
    /// assignment cannot be stored anywhere.
    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        if content.property(alias).is_none() {
            return Err(ConnectorError::PropertyNotFound {
                alias: alias.to_string(),
            });
        }
        content.set_value(alias, value.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::model::{Content, PropertyValue};

    #[test]
    fn test_tags_pass_through() {
        let property = Property::new("tags", EditorAlias::Tags, "red,green");
        let mut deps = Vec::new();
        assert_eq!(
            TagValueConnector.to_portable(&property, &mut deps),
            Ok(Some("red,green".to_string()))
        );
        assert!(deps.is_empty());

        let mut item = Content::new(1, Uuid::nil())
            .with_property(Property::new("tags", EditorAlias::Tags, PropertyValue::Null));
        TagValueConnector
            .from_portable(&mut item, "tags", Some("blue"))
            .unwrap();
        assert_eq!(item.text_value("tags"), Some("blue"));
    }

    #[test]
    fn test_tags_missing_property() {
        let mut item = Content::new(1, Uuid::nil());
        assert_eq!(
            TagValueConnector.from_portable(&mut item, "tags", Some("blue")),
            Err(ConnectorError::PropertyNotFound {
                alias: "tags".to_string()
            })
        );
    }
}
