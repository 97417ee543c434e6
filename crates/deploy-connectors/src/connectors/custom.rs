//! Connectors built from closures.

use crate::connectors::ValueConnector;
use crate::error::ConnectorError;
use crate::model::{ContentBase, Dependency, EditorAlias, Property};

type ToPortableFn =
    dyn Fn(&Property, &mut Vec<Dependency>) -> Result<Option<String>, ConnectorError> + Send + Sync;
type FromPortableFn =
    dyn Fn(&mut dyn ContentBase, &str, Option<&str>) -> Result<(), ConnectorError> + Send + Sync;

/// A connector whose conversions are supplied by the caller.
///
/// ```
/// use deploy_connectors::connectors::CustomValueConnector;
/// use deploy_connectors::model::{EditorAlias, PropertyValue};
///
/// let upper = CustomValueConnector::new(
///     [EditorAlias::from("My.Shout")],
///     |property, _| Ok(property.value.as_text().map(str::to_uppercase)),
///     |content, alias, value| {
///         content.set_value(alias, PropertyValue::from(value));
///         Ok(())
///     },
/// );
/// ```
pub struct CustomValueConnector {
    aliases: Vec<EditorAlias>,
    to_portable: Box<ToPortableFn>,
    from_portable: Box<FromPortableFn>,
}

impl CustomValueConnector {
    pub fn new<T, F>(aliases: impl IntoIterator<Item = EditorAlias>, to_portable: T, from_portable: F) -> Self
    where
        T: Fn(&Property, &mut Vec<Dependency>) -> Result<Option<String>, ConnectorError>
            + Send
            + Sync
            + 'static,
        F: Fn(&mut dyn ContentBase, &str, Option<&str>) -> Result<(), ConnectorError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            aliases: aliases.into_iter().collect(),
            to_portable: Box::new(to_portable),
            from_portable: Box::new(from_portable),
        }
    }
}

impl ValueConnector for CustomValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        self.aliases.clone()
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        (self.to_portable)(property, dependencies)
    }

    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        (self.from_portable)(content, alias, value)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::model::{Content, ObjectType, PropertyValue, Udi};

    #[test]
    fn test_closures_are_invoked() {
        let key = Uuid::from_u128(3);
        let connector = CustomValueConnector::new(
            [EditorAlias::from("My.Link")],
            move |property, deps| {
                deps.push(Dependency::exists(Udi::for_object(ObjectType::Document, key)));
                Ok(property.value.as_text().map(|s| format!("[{s}]")))
            },
            |content, alias, value| {
                let inner = value.map(|v| v.trim_matches(|c| c == '[' || c == ']'));
                content.set_value(alias, inner.into());
                Ok(())
            },
        );
        assert_eq!(connector.editor_aliases(), vec![EditorAlias::from("My.Link")]);

        let mut deps = Vec::new();
        let property = Property::new("link", "My.Link", "home");
        let portable = connector.to_portable(&property, &mut deps).unwrap();
        assert_eq!(portable.as_deref(), Some("[home]"));
        assert_eq!(deps.len(), 1);

        let mut item = Content::new(1, Uuid::nil())
            .with_property(Property::new("link", "My.Link", PropertyValue::Null));
        connector
            .from_portable(&mut item, "link", portable.as_deref())
            .unwrap();
        assert_eq!(item.text_value("link"), Some("home"));
    }
}
