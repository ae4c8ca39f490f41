//! The plain-text content dialect.
//!
//! ```text
//! Header:
//!     cs: "Header in Czech"
//!     en: "Header in English"
//!     de: "Header in German"
//!     pl: "Header in Polish"
//!
//! Title:
//!     cs: "Title in Czech"
//!     ...
//!
//! Content:
//!     cs: "<PictureDeps/Content/Article1/photo.png|mr> Text in Czech"
//!     ...
//! ```
//!
//! Section anchors (`Header:`, `Title:`, `Content:`) must start the line and
//! are case-sensitive. Inside a section only `<locale>: "<text>"` lines are
//! read, quotes included; everything else is ignored. Locale lines before
//! the first section are dropped. Image tokens are collected from the whole
//! section text, wherever they appear.

use super::split_blocks;
use crate::document::{DraftDocument, Field, Locale};
use crate::image_token::ImageSyntax;

/// Parse plain-text content into a draft. Gaps are reported by
/// [`DraftDocument::finish`].
pub fn parse(raw: &str, syntax: &ImageSyntax) -> DraftDocument {
    let mut draft = DraftDocument::new();
    for section in split_blocks(raw, section_anchor) {
        for line in section.body.lines() {
            if let Some((locale, value)) = locale_line(line) {
                draft.set(section.key, locale, value);
            }
        }
        draft.push_images(syntax.parse_tokens(section.body));
    }
    draft
}

/// `Title:` at the start of a line opens the title section. The rest of the
/// anchor line belongs to the section body.
fn section_anchor(line: &str) -> Option<(Field, usize)> {
    let (name, _) = line.split_once(':')?;
    let field = Field::from_section_name(name)?;
    Some((field, name.len() + 1))
}

/// Match `  en : "Some text"  `, returning the value with its quotes.
fn locale_line(line: &str) -> Option<(Locale, &str)> {
    let (key, rest) = line.split_once(':')?;
    let locale = key.trim().parse::<Locale>().ok()?;
    let value = rest.trim();
    let quoted = value.len() >= 2 && value.starts_with('"') && value.ends_with('"');
    quoted.then_some((locale, value))
}
