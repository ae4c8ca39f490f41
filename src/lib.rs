//! # Page Deploy
//!
//! Renders multilingual content files into HTML pages. Every content file
//! carries three sections (Header, Title, Content), each in four locales
//! (Czech, English, German, Polish). Each file becomes one page, rendered
//! into a shared HTML template, and a manifest lists the pages in order.
//!
//! # Architecture: Parse Everything, Then Write
//!
//! ```text
//! 1. Discover  ContentFiles/       →  ordered file names (N.name.ext)
//! 2. Parse     .txt / .md          →  LocaleDocument per file
//! 3. Render    template + document →  DeploymentFiles/N.name.html
//! 4. Manifest  rendered pages      →  DeploymentFiles/manifest.txt
//! ```
//!
//! Parsing finishes for every file before the first write, so a single
//! malformed file leaves the output directory untouched. See [`deploy`] for
//! the full failure model.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`document`] | Locales, fields, the draft document and the complete [`document::LocaleDocument`] |
//! | [`parse`] | Both content dialects: indented plain text and Markdown |
//! | [`image_token`] | `<PictureDeps/path\|code>` tokens: detection, styling, `<img>` generation |
//! | [`render`] | Template anchors and page rendering |
//! | [`naming`] | `N.name.ext` filename convention |
//! | [`manifest`] | Deployment order and the manifest file |
//! | [`deploy`] | The pipeline: discover, parse, render, write |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Complete Documents Only
//!
//! Parsers fill a [`document::DraftDocument`] where every slot is optional.
//! Rendering takes a [`document::LocaleDocument`], which can only be built
//! when all twelve slots are present. A missing slot is a parse error naming
//! the slot, never an empty string on a page.
//!
//! ## Anchors Located Once
//!
//! The template is scanned once for its five anchors. Rendering splices all
//! values into the original text in a single pass, so content that happens
//! to look like an anchor can never be matched again.
//!
//! ## Numeric Ordering
//!
//! `10.appendix.txt` comes after `2.body.md`: the prefix is compared as a
//! number. Files without a prefix are skipped by default, or appended after
//! the highest number when `manifest.unnumbered = "trailing"`.

pub mod config;
pub mod deploy;
pub mod document;
pub mod image_token;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod parse;
pub mod render;

#[cfg(test)]
pub(crate) mod test_helpers;
