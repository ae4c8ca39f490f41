//! The Markdown content dialect.
//!
//! ```markdown
//! # Header
//!
//! **cs:**
//! <img src="../PictureDeps/Content/Article1/photo.png|sl" alt="Photo" />
//! Header in Czech
//!
//! **en:** Header in English
//! **de:** Header in German
//! **pl:** Header in Polish
//!
//! # Content
//!
//! **cs:**
//! ## Úvod
//! Text with *emphasis* and `code`.
//!
//! <PictureDeps/Content/Article1/photo.png|mc>
//! ...
//! ```
//!
//! ## Parsing
//!
//! 1. `<img>` tags whose `src` points into the image directory are rewritten
//!    to bare placeholders across the whole file, dropping one leading `../`.
//! 2. `# Header`, `# Title` and `# Content` heading lines split the file into
//!    sections.
//! 3. `**cs:**`-style markers split each section into locale blocks.
//! 4. Each locale block is trimmed, its image tokens are collected from the
//!    raw text, and the block is converted to HTML with pulldown-cmark.
//!
//! Placeholders are not valid HTML, so pulldown-cmark would escape them to
//! `&lt;PictureDeps/...&gt;`. They are swapped for inert markers before
//! conversion and restored verbatim afterwards, so the renderer can still
//! find them by exact text.
//!
//! Two cases stay escaped text and never become images:
//! - a placeholder inside a code span or code block, which is shown as
//!   written;
//! - anything that is not a valid token, e.g. `<PictureDeps/x.png|zz>`,
//!   which pulldown-cmark does not treat as inline HTML and renders as
//!   `&lt;PictureDeps/x.png|zz&gt;`.

use super::split_blocks;
use crate::document::{DraftDocument, Field, Locale};
use crate::image_token::ImageSyntax;
use pulldown_cmark::{Event, Parser, Tag, TagEnd, html as md_html};

/// Parse Markdown content into a draft. Gaps are reported by
/// [`DraftDocument::finish`].
pub fn parse(raw: &str, syntax: &ImageSyntax) -> DraftDocument {
    let content = syntax.unwrap_img_tags(raw);

    let mut draft = DraftDocument::new();
    for section in split_blocks(&content, section_heading) {
        for block in split_blocks(section.body, locale_marker) {
            let text = block.body.trim();
            draft.push_images(syntax.parse_tokens(text));
            draft.set(section.key, block.key, markdown_to_html(text, syntax));
        }
    }
    draft
}

/// `# Title` on a line of its own, followed by a newline.
fn section_heading(line: &str) -> Option<(Field, usize)> {
    let heading = line.strip_suffix('\n')?;
    let name = heading.trim().strip_prefix('#')?.trim_start();
    let field = Field::from_section_name(name)?;
    Some((field, line.len()))
}

/// `**en:**` at the start of a line, optionally indented.
fn locale_marker(line: &str) -> Option<(Locale, usize)> {
    let indent = line.len() - line.trim_start().len();
    let rest = line[indent..].strip_prefix("**")?;
    let (tag, _) = rest.split_once(":**")?;
    let locale = tag.parse::<Locale>().ok()?;
    Some((locale, indent + "**".len() + tag.len() + ":**".len()))
}

/// Private-use code points pulldown-cmark passes through untouched.
const SHIELD_OPEN: char = '\u{E000}';
const SHIELD_CLOSE: char = '\u{E001}';

/// Convert a Markdown block to HTML, keeping image placeholders literal.
fn markdown_to_html(text: &str, syntax: &ImageSyntax) -> String {
    let mut shielded = String::with_capacity(text.len());
    let mut placeholders = Vec::new();
    let mut last = 0;
    for span in syntax.token_spans(text) {
        shielded.push_str(&text[last..span.start]);
        shielded.push_str(&shield(placeholders.len()));
        placeholders.push(&text[span.clone()]);
        last = span.end;
    }
    shielded.push_str(&text[last..]);

    // Inside code the placeholder goes back as text, so push_html escapes it.
    let mut in_code_block = false;
    let events = Parser::new(&shielded).map(|event| match event {
        Event::Start(Tag::CodeBlock(kind)) => {
            in_code_block = true;
            Event::Start(Tag::CodeBlock(kind))
        }
        Event::End(TagEnd::CodeBlock) => {
            in_code_block = false;
            Event::End(TagEnd::CodeBlock)
        }
        Event::Code(code) => Event::Code(unshield(&code, &placeholders).into()),
        Event::Text(text) if in_code_block => Event::Text(unshield(&text, &placeholders).into()),
        other => other,
    });

    let mut html = String::new();
    md_html::push_html(&mut html, events);
    unshield(html.trim_end(), &placeholders)
}

fn unshield(text: &str, placeholders: &[&str]) -> String {
    let mut out = text.to_string();
    for (idx, placeholder) in placeholders.iter().enumerate() {
        out = out.replace(&shield(idx), placeholder);
    }
    out
}

fn shield(idx: usize) -> String {
    format!("{SHIELD_OPEN}{idx}{SHIELD_CLOSE}")
}
