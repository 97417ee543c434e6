//! Rewriters for references embedded in rich-text markup.
//!
//! Each rewriter handles one kind of embedded reference. Exporting replaces
//! local references with portable ones and reports what was referenced;
//! importing does the opposite. References that cannot be resolved are left
//! in the text exactly as they were.

pub mod image_source;
pub mod local_link;
pub mod macros;

pub use image_source::ImageSourceRewriter;
pub use local_link::LocalLinkRewriter;
pub use macros::MacroRewriter;

use crate::model::Udi;

/// Rewrites one kind of reference inside markup.
pub trait MarkupParser: Send + Sync {
    /// Rewrites local references to portable form, appending each referenced UDI to `udis`.
    fn to_portable(&self, text: &str, udis: &mut Vec<Udi>) -> String;

    /// Rewrites portable references back to local form.
    fn from_portable(&self, text: &str) -> String;
}
