//! Content file parsing.
//!
//! Content files come in two dialects that encode the same data:
//!
//! - **Plain text** (`.txt`), see [`text`]: `Header:` / `Title:` / `Content:`
//!   sections holding `cs: "..."` lines.
//! - **Markdown** (`.md`), see [`markdown`]: `# Header` / `# Title` /
//!   `# Content` headings holding `**cs:**` blocks of Markdown, converted to
//!   HTML per locale.
//!
//! Both produce a [`LocaleDocument`] or fail with every missing
//! `field.locale` slot listed.
//!
//! The dialect is chosen by extension: `.md` (any case) is Markdown and
//! everything else, unknown extensions included, is plain text.

pub mod markdown;
pub mod text;

use crate::document::{LocaleDocument, Slot};
use crate::image_token::ImageSyntax;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing fields: {}", join_slots(.0))]
    MissingFields(Vec<Slot>),
}

fn join_slots(slots: &[Slot]) -> String {
    slots
        .iter()
        .map(Slot::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A run of text that starts at an anchor line and ends before the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block<'a, K> {
    pub key: K,
    pub body: &'a str,
}

/// Split `text` at anchor lines.
///
/// `anchor` is called with every line (newline included) and returns the
/// block key plus the byte offset within the line where the body starts.
/// Text before the first anchor belongs to no block and is dropped.
pub(crate) fn split_blocks<'a, K>(
    text: &'a str,
    anchor: impl Fn(&str) -> Option<(K, usize)>,
) -> Vec<Block<'a, K>> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if let Some((key, body_offset)) = anchor(line) {
            starts.push((offset, offset + body_offset, key));
        }
        offset += line.len();
    }

    let mut blocks = Vec::with_capacity(starts.len());
    let mut rest = starts.into_iter().peekable();
    while let Some((_, body_start, key)) = rest.next() {
        let end = rest.peek().map_or(text.len(), |(line_start, _, _)| *line_start);
        blocks.push(Block {
            key,
            body: &text[body_start..end],
        });
    }
    blocks
}

/// Which dialect a content file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    PlainText,
    Markdown,
}

impl ContentFormat {
    /// `.md` selects Markdown; any other extension, or none, selects plain text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("md") => ContentFormat::Markdown,
            _ => ContentFormat::PlainText,
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentFormat::PlainText => f.write_str("text"),
            ContentFormat::Markdown => f.write_str("markdown"),
        }
    }
}

/// Parse already-loaded content in the given dialect.
pub fn parse_str(
    format: ContentFormat,
    raw: &str,
    syntax: &ImageSyntax,
) -> Result<LocaleDocument, ParseError> {
    let draft = match format {
        ContentFormat::PlainText => text::parse(raw, syntax),
        ContentFormat::Markdown => markdown::parse(raw, syntax),
    };
    draft.finish().map_err(ParseError::MissingFields)
}

/// Read and parse one content file, picking the dialect by extension.
pub fn parse_content_file(path: &Path, syntax: &ImageSyntax) -> Result<LocaleDocument, ParseError> {
    let raw = fs::read_to_string(path)?;
    let format = ContentFormat::from_path(path);
    tracing::debug!("Parsing {} as {}", path.display(), format);
    parse_str(format, &raw, syntax)
}
