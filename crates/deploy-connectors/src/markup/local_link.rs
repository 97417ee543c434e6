//! `{localLink:...}` document links.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use crate::markup::MarkupParser;
use crate::model::{ObjectType, Udi};
use crate::services::{EntityService, id_for_udi, udi_exists, udi_for_id};

lazy_static! {
    static ref LOCAL_LINK: Regex =
        Regex::new(r"\{localLink:(?P<target>[^}]+)\}").expect("valid local link pattern");
}

fn is_document(udi: &Udi) -> bool {
    udi.entity_type().object_type() == Some(ObjectType::Document)
}

/// Converts `{localLink:1234}` to `{localLink:umb://document/...}` and back.
pub struct LocalLinkRewriter {
    entities: Arc<dyn EntityService>,
}

impl LocalLinkRewriter {
    pub fn new(entities: Arc<dyn EntityService>) -> Self {
        Self { entities }
    }
}

impl MarkupParser for LocalLinkRewriter {
    fn to_portable(&self, text: &str, udis: &mut Vec<Udi>) -> String {
        LOCAL_LINK
            .replace_all(text, |caps: &Captures| {
                let target = &caps["target"];
                let udi = match target.parse::<i32>() {
                    Ok(id) => udi_for_id(self.entities.as_ref(), id, ObjectType::Document),
                    // links that already carry a UDI only need to be recorded
                    Err(_) => Udi::parse(target)
                        .filter(is_document)
                        .filter(|udi| udi_exists(self.entities.as_ref(), udi)),
                };
                match udi {
                    Some(udi) => {
                        let link = format!("{{localLink:{udi}}}");
                        udis.push(udi);
                        link
                    }
                    None => {
                        debug!(link = target, "leaving unresolvable local link");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    fn from_portable(&self, text: &str) -> String {
        LOCAL_LINK
            .replace_all(text, |caps: &Captures| {
                let target = &caps["target"];
                let id = Udi::parse(target)
                    .filter(is_document)
                    .and_then(|udi| id_for_udi(self.entities.as_ref(), &udi));
                match id {
                    Some(id) => format!("{{localLink:{id}}}"),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
