//! Macro invocations in rich text.
//!
//! Macros are referenced by alias, which is already portable, so the markup
//! itself is never changed. Export only records the macro definitions used.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::markup::MarkupParser;
use crate::model::Udi;
use crate::services::{MacroService, found};

lazy_static! {
    static ref MACRO_TAG: Regex = Regex::new(r#"(?i)<\?UMBRACO_MACRO\b[^>]*?\bmacroAlias="(?P<alias>[^"]+)"[^>]*>"#)
        .expect("valid macro tag pattern");
}

pub struct MacroRewriter {
    macros: Arc<dyn MacroService>,
}

impl MacroRewriter {
    pub fn new(macros: Arc<dyn MacroService>) -> Self {
        Self { macros }
    }
}

impl MarkupParser for MacroRewriter {
    fn to_portable(&self, text: &str, udis: &mut Vec<Udi>) -> String {
        for caps in MACRO_TAG.captures_iter(text) {
            let alias = &caps["alias"];
            match found(self.macros.key_for_alias(alias)) {
                Some(key) => udis.push(Udi::macro_key(key)),
                None => debug!(alias, "macro not found"),
            }
        }
        text.to_string()
    }

    fn from_portable(&self, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::memory::MemoryMacroService;

    #[test]
    fn test_macros_are_recorded() {
        let key = Uuid::from_u128(0xEF);
        let rewriter = MacroRewriter::new(Arc::new(MemoryMacroService::new().with("latestNews", key)));
        let text = r#"<p>x</p><?UMBRACO_MACRO macroAlias="latestNews" count="3" /><?UMBRACO_MACRO macroAlias="gone" />"#;
        let mut udis = Vec::new();

        assert_eq!(rewriter.to_portable(text, &mut udis), text);
        assert_eq!(udis, vec![Udi::macro_key(key)]);
        assert_eq!(rewriter.from_portable(text), text);
    }
}
