//! Shared test utilities for the page-deploy test suite.
//!
//! Provides complete content files in both dialects, a minimal template
//! carrying every anchor, document builders, and a temp project layout.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let doc = document_with(Field::Title, Locale::Cs, "\"New Title\"");
//! let page = render(TEMPLATE, &doc, &ImageSyntax::default(), "content-image")?;
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::document::{DraftDocument, Field, Locale, LocaleDocument};
use crate::image_token::ImageSyntax;

// =========================================================================
// Content and template text
// =========================================================================

/// Minimal template with all five anchors and a footer to hang extras on.
pub const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="cs">
<head>
<meta charset="UTF-8">
<title>OLD</title>
</head>
<body>
<h1 id="header-title">Old header</h1>
<div class="text" id="content-text">Old content</div>
<footer>Footer</footer>
<script>
const titles = {'cs': ``};
const contents = {'cs': ``};
function setLanguage(lang) {
  document.getElementById('header-title').innerHTML = titles[lang];
  document.getElementById('content-text').innerHTML = contents[lang];
}
</script>
</body>
</html>
"#;

/// A plain-text content file with every slot set to `"<Field> <locale>"`.
pub fn full_text() -> String {
    let mut out = String::new();
    for field in Field::ALL {
        out.push_str(&format!("{}:\n", field.section_name()));
        for locale in Locale::ALL {
            out.push_str(&format!("    {locale}: \"{} {locale}\"\n", field.section_name()));
        }
        out.push('\n');
    }
    out
}

/// A Markdown content file with every slot set to `<Field> <locale>`.
pub fn full_markdown() -> String {
    let mut out = String::new();
    for field in Field::ALL {
        out.push_str(&format!("# {}\n\n", field.section_name()));
        for locale in Locale::ALL {
            out.push_str(&format!("**{locale}:** {} {locale}\n", field.section_name()));
        }
        out.push('\n');
    }
    out
}

// =========================================================================
// Document builders
// =========================================================================

/// A complete document with plain-text style values (`"Header cs"`), one
/// slot overridden. Image tokens in `value` are collected as a parser would.
pub fn document_with(field: Field, locale: Locale, value: &str) -> LocaleDocument {
    let mut draft = DraftDocument::new();
    for f in Field::ALL {
        for l in Locale::ALL {
            draft.set(f, l, format!("\"{} {l}\"", f.section_name()));
        }
    }
    draft.set(field, locale, value);
    draft.push_images(ImageSyntax::default().parse_tokens(value));
    draft
        .finish()
        .unwrap_or_else(|missing| panic!("test document incomplete: {missing:?}"))
}

// =========================================================================
// Project layout
// =========================================================================

/// A temp project with `ContentFiles/`, `template/template.html` and no
/// output directory yet. Content files are written by the caller.
pub fn setup_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("ContentFiles")).unwrap();
    fs::create_dir_all(tmp.path().join("template")).unwrap();
    fs::write(tmp.path().join("template/template.html"), TEMPLATE).unwrap();
    tmp
}

/// Write a content file into the project's content directory.
pub fn write_content(project: &Path, name: &str, text: &str) {
    fs::write(project.join("ContentFiles").join(name), text).unwrap();
}
