//! Rich text.

use std::sync::Arc;

use crate::connectors::ValueConnector;
use crate::error::ConnectorError;
use crate::markup::MarkupParser;
use crate::model::{ContentBase, Dependency, EditorAlias, EntityType, Property, PropertyValue};

/// Converts the references embedded in rich-text markup.
///
/// Export runs the link, image and macro rewriters in that order. Import
/// runs them in reverse. Macro definitions must match the source; every
/// other reference only has to exist.
pub struct RichTextValueConnector {
    links: Arc<dyn MarkupParser>,
    images: Arc<dyn MarkupParser>,
    macros: Arc<dyn MarkupParser>,
}

impl RichTextValueConnector {
    pub fn new(
        links: impl MarkupParser + 'static,
        images: impl MarkupParser + 'static,
        macros: impl MarkupParser + 'static,
    ) -> Self {
        Self {
            links: Arc::new(links),
            images: Arc::new(images),
            macros: Arc::new(macros),
        }
    }
}

impl ValueConnector for RichTextValueConnector {
    fn editor_aliases(&self) -> Vec<EditorAlias> {
        vec![EditorAlias::RichText]
    }

    fn to_portable(
        &self,
        property: &Property,
        dependencies: &mut Vec<Dependency>,
    ) -> Result<Option<String>, ConnectorError> {
        let Some(text) = property.value.non_blank_text() else {
            return Ok(None);
        };

        let mut udis = Vec::new();
        let text = self.links.to_portable(text, &mut udis);
        let text = self.images.to_portable(&text, &mut udis);
        let text = self.macros.to_portable(&text, &mut udis);

        dependencies.extend(udis.into_iter().map(|udi| match udi.entity_type() {
            EntityType::Macro => Dependency::matches(udi),
            _ => Dependency::exists(udi),
        }));
        Ok(Some(text))
    }

    fn from_portable(
        &self,
        content: &mut dyn ContentBase,
        alias: &str,
        value: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let local = match value {
            Some(text) if !text.trim().is_empty() => {
                let text = self.macros.from_portable(text);
                let text = self.images.from_portable(&text);
                PropertyValue::Text(self.links.from_portable(&text))
            }
            other => other.into(),
        };
        content.set_value(alias, local);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::markup::{ImageSourceRewriter, LocalLinkRewriter, MacroRewriter};
    use crate::memory::{MemoryEntityService, MemoryMacroService};
    use crate::model::{Content, DependencyMode, ObjectType, Udi};

    const DOC: Uuid = Uuid::from_u128(0x10);
    const IMAGE: Uuid = Uuid::from_u128(0x20);
    const MACRO: Uuid = Uuid::from_u128(0x30);

    fn connector() -> RichTextValueConnector {
        let entities = Arc::new(
            MemoryEntityService::new()
                .with(ObjectType::Document, 1100, DOC)
                .with(ObjectType::Media, 1200, IMAGE),
        );
        let macros = Arc::new(MemoryMacroService::new().with("gallery", MACRO));
        RichTextValueConnector::new(
            LocalLinkRewriter::new(entities.clone()),
            ImageSourceRewriter::new(entities),
            MacroRewriter::new(macros),
        )
    }

    const LOCAL: &str = concat!(
        r#"<p><a href="/{localLink:1100}">about</a></p>"#,
        r#"<p><img src="/media/1200/a.jpg" rel="1200" /></p>"#,
        r#"<?UMBRACO_MACRO macroAlias="gallery" />"#,
    );

    #[test]
    fn test_export_records_references_in_order() {
        let property = Property::new("body", EditorAlias::RichText, LOCAL);
        let mut deps = Vec::new();
        let portable = connector().to_portable(&property, &mut deps).unwrap().unwrap();

        assert!(portable.contains(&format!("{{localLink:{}}}", Udi::for_object(ObjectType::Document, DOC))));
        assert!(portable.contains(&format!(
            r#"data-udi="{}""#,
            Udi::for_object(ObjectType::Media, IMAGE)
        )));
        assert_eq!(
            deps.iter().map(|d| (d.udi.clone(), d.mode)).collect::<Vec<_>>(),
            vec![
                (Udi::for_object(ObjectType::Document, DOC), DependencyMode::MustExist),
                (Udi::for_object(ObjectType::Media, IMAGE), DependencyMode::MustExist),
                (Udi::macro_key(MACRO), DependencyMode::MustMatch),
            ]
        );
    }

    #[test]
    fn test_roundtrip() {
        let connector = connector();
        let property = Property::new("body", EditorAlias::RichText, LOCAL);
        let portable = connector.to_portable(&property, &mut Vec::new()).unwrap();

        let mut item = Content::new(1, Uuid::nil())
            .with_property(Property::new("body", EditorAlias::RichText, PropertyValue::Null));
        connector
            .from_portable(&mut item, "body", portable.as_deref())
            .unwrap();
        assert_eq!(item.text_value("body"), Some(LOCAL));
    }

    #[test]
    fn test_blank_values() {
        let connector = connector();
        let blank = Property::new("body", EditorAlias::RichText, "   ");
        assert_eq!(connector.to_portable(&blank, &mut Vec::new()), Ok(None));

        let mut item = Content::new(1, Uuid::nil())
            .with_property(Property::new("body", EditorAlias::RichText, "x"));
        connector.from_portable(&mut item, "body", Some(" ")).unwrap();
        assert_eq!(item.text_value("body"), Some(" "));
        connector.from_portable(&mut item, "body", None).unwrap();
        assert_eq!(item.value("body"), Some(&PropertyValue::Null));
    }
}
