//! Media references on `<img>` tags.
//!
//! Locally an embedded image carries its media id in `rel="1234"`; the
//! portable form carries `data-udi="umb://media/..."` instead.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use crate::markup::MarkupParser;
use crate::model::{ObjectType, Udi};
use crate::services::{EntityService, id_for_udi, udi_for_id};

lazy_static! {
    static ref IMG_TAG: Regex = Regex::new(r"(?i)<img\b[^>]*>").expect("valid img tag pattern");
    static ref REL_ID: Regex = Regex::new(r#"\brel="(?P<id>-?\d+)""#).expect("valid rel pattern");
    static ref DATA_UDI: Regex =
        Regex::new(r#"\bdata-udi="(?P<udi>[^"]*)""#).expect("valid data-udi pattern");
}

pub struct ImageSourceRewriter {
    entities: Arc<dyn EntityService>,
}

impl ImageSourceRewriter {
    pub fn new(entities: Arc<dyn EntityService>) -> Self {
        Self { entities }
    }
}

impl MarkupParser for ImageSourceRewriter {
    fn to_portable(&self, text: &str, udis: &mut Vec<Udi>) -> String {
        IMG_TAG
            .replace_all(text, |tag: &Captures| {
                REL_ID
                    .replace(&tag[0], |attr: &Captures| {
                        let resolved = attr["id"]
                            .parse::<i32>()
                            .ok()
                            .and_then(|id| udi_for_id(self.entities.as_ref(), id, ObjectType::Media));
                        match resolved {
                            Some(udi) => {
                                let replaced = format!(r#"data-udi="{udi}""#);
                                udis.push(udi);
                                replaced
                            }
                            None => {
                                debug!(id = &attr["id"], "leaving unresolvable image reference");
                                attr[0].to_string()
                            }
                        }
                    })
                    .into_owned()
            })
            .into_owned()
    }

    fn from_portable(&self, text: &str) -> String {
        IMG_TAG
            .replace_all(text, |tag: &Captures| {
                DATA_UDI
                    .replace(&tag[0], |attr: &Captures| {
                        let id = Udi::parse(&attr["udi"])
                            .filter(|udi| udi.entity_type().object_type() == Some(ObjectType::Media))
                            .and_then(|udi| id_for_udi(self.entities.as_ref(), &udi));
                        match id {
                            Some(id) => format!(r#"rel="{id}""#),
                            None => attr[0].to_string(),
                        }
                    })
                    .into_owned()
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::memory::MemoryEntityService;

    fn rewriter() -> ImageSourceRewriter {
        let entities = MemoryEntityService::new().with(ObjectType::Media, 1077, Uuid::from_u128(0xCD));
        ImageSourceRewriter::new(Arc::new(entities))
    }

    #[test]
    fn test_images_roundtrip() {
        let udi = Udi::for_object(ObjectType::Media, Uuid::from_u128(0xCD));
        let local = r#"<p><IMG src="/media/1077/cat.jpg" rel="1077" alt="cat" /></p>"#;
        let mut udis = Vec::new();

        let portable = rewriter().to_portable(local, &mut udis);
        assert_eq!(
            portable,
            format!(r#"<p><IMG src="/media/1077/cat.jpg" data-udi="{udi}" alt="cat" /></p>"#)
        );
        assert_eq!(udis, vec![udi]);
        assert_eq!(rewriter().from_portable(&portable), local);
    }

    #[test]
    fn test_only_img_tags_are_rewritten() {
        let text = r#"<a rel="1077">x</a><img rel="5" />"#;
        let mut udis = Vec::new();
        assert_eq!(rewriter().to_portable(text, &mut udis), text);
        assert!(udis.is_empty());
    }
}
