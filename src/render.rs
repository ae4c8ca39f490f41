//! Page rendering: substitute one [`LocaleDocument`] into the HTML template.
//!
//! The template is an ordinary HTML page with five anchors:
//!
//! | Anchor | Receives |
//! |--------|----------|
//! | `<title>…</title>` | `cs` title |
//! | element with `id="header-title"` | `cs` header, images removed |
//! | element with `id="content-text"` | `cs` content |
//! | `const titles = {…};` | headers of all locales, images removed |
//! | `const contents = {…};` | contents of all locales |
//!
//! Every anchor is located once, against the original template text, when a
//! [`Template`] is built. Rendering then splices the new values in a single
//! pass, so inserted text is never searched for anchors again. A template
//! missing any anchor is rejected up front, before a single page is written.
//!
//! After splicing, each image placeholder of the document is replaced
//! everywhere in the page, template included, by an `<img>` element. This
//! is plain substring replacement: text that merely looks like a
//! placeholder, such as `<PictureDeps/x.png|zz>`, is never touched.
//!
//! ## Value treatment
//!
//! Values lose their authored quotes (`"Hello"` → `Hello`) and a single
//! wrapping `<p>…</p>`. Headers additionally lose every image. Script values
//! are escaped for a backtick string literal.

use crate::document::{Locale, LocaleDocument, Localized};
use crate::image_token::ImageSyntax;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template has no {0} anchor")]
    MissingAnchor(Anchor),
    #[error("template anchors {0} and {1} overlap")]
    OverlappingAnchors(Anchor, Anchor),
}

/// A substitution point in the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Title,
    Header,
    Content,
    Titles,
    Contents,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Title => f.write_str("<title>"),
            Anchor::Header => write!(f, "id=\"{HEADER_ID}\""),
            Anchor::Content => write!(f, "id=\"{CONTENT_ID}\""),
            Anchor::Titles => f.write_str("`titles` script object"),
            Anchor::Contents => f.write_str("`contents` script object"),
        }
    }
}

const HEADER_ID: &str = "header-title";
const CONTENT_ID: &str = "content-text";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title>(.*?)</title>").expect("static pattern"));

/// A template with every anchor located.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    /// Anchor spans, sorted by position and non-overlapping.
    spans: Vec<Span>,
}

#[derive(Debug, Clone)]
struct Span {
    anchor: Anchor,
    range: Range<usize>,
    /// `const`, `let` or `var` for script objects.
    keyword: &'static str,
}

impl Template {
    /// Locate all five anchors in `source`.
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let mut spans = vec![
            find_title(&source)?,
            find_element(&source, HEADER_ID, Anchor::Header)?,
            find_element(&source, CONTENT_ID, Anchor::Content)?,
            find_script_object(&source, "titles", Anchor::Titles)?,
            find_script_object(&source, "contents", Anchor::Contents)?,
        ];
        spans.sort_by_key(|span| span.range.start);
        for pair in spans.windows(2) {
            if pair[0].range.end > pair[1].range.start {
                return Err(TemplateError::OverlappingAnchors(pair[0].anchor, pair[1].anchor));
            }
        }
        Ok(Self { source, spans })
    }

    /// Produce the page for one document.
    pub fn render(&self, doc: &LocaleDocument, syntax: &ImageSyntax, image_class: &str) -> String {
        let mut page = String::with_capacity(self.source.len() * 2);
        let mut last = 0;
        for span in &self.spans {
            page.push_str(&self.source[last..span.range.start]);
            page.push_str(&self.value_for(span, doc, syntax));
            last = span.range.end;
        }
        page.push_str(&self.source[last..]);

        // Script values were escaped before this point, so a placeholder
        // inside `contents` is matched in its escaped form.
        let mut seen = HashSet::new();
        for token in &doc.images {
            let placeholder = token.placeholder();
            if !seen.insert(placeholder.clone()) {
                continue;
            }
            let img = token.to_img_tag(image_class);
            let escaped = js_escape(&placeholder);
            if escaped != placeholder {
                page = page.replace(&escaped, &js_escape(&img));
            }
            page = page.replace(&placeholder, &img);
        }
        page
    }

    fn value_for(&self, span: &Span, doc: &LocaleDocument, syntax: &ImageSyntax) -> String {
        match span.anchor {
            Anchor::Title => display_text(doc.title.get(Locale::Cs)).to_string(),
            Anchor::Header => header_text(doc.header.get(Locale::Cs), syntax),
            Anchor::Content => display_text(doc.content.get(Locale::Cs)).to_string(),
            Anchor::Titles => script_object(span.keyword, "titles", &doc.header, |text| {
                header_text(text, syntax)
            }),
            Anchor::Contents => script_object(span.keyword, "contents", &doc.content, |text| {
                display_text(text).to_string()
            }),
        }
    }
}

/// Parse `template` and render `doc` into it.
pub fn render(
    template: &str,
    doc: &LocaleDocument,
    syntax: &ImageSyntax,
    image_class: &str,
) -> Result<String, TemplateError> {
    Ok(Template::parse(template)?.render(doc, syntax, image_class))
}

// ============================================================================
// Anchor location
// ============================================================================

fn find_title(source: &str) -> Result<Span, TemplateError> {
    let inner = TITLE_RE
        .captures(source)
        .and_then(|caps| caps.get(1))
        .ok_or(TemplateError::MissingAnchor(Anchor::Title))?;
    Ok(Span {
        anchor: Anchor::Title,
        range: inner.range(),
        keyword: "",
    })
}

/// Inner range of the first element carrying `id="<id>"`, whatever its tag.
///
/// Nested elements of the same tag are balanced, so a `div` inside the
/// anchor `div` does not end it early.
fn find_element(source: &str, id: &str, anchor: Anchor) -> Result<Span, TemplateError> {
    let missing = TemplateError::MissingAnchor(anchor);
    let open = Regex::new(&format!(
        r#"(?i)<([a-z][a-z0-9-]*)\b[^>]*\sid\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(id)
    ))
    .expect("id pattern is escaped");

    let caps = open.captures(source).ok_or(missing.clone())?;
    let tag = caps.get(0).ok_or(missing.clone())?;
    if tag.as_str().ends_with("/>") {
        return Err(missing);
    }
    let name = regex::escape(&caps[1]);
    let inner_start = tag.end();

    let tags = Regex::new(&format!(r"(?i)<(/?){name}\b[^>]*>")).expect("tag pattern is escaped");
    let mut depth = 1usize;
    for m in tags.captures_iter(&source[inner_start..]) {
        let whole = m.get(0).ok_or(missing.clone())?;
        if !m[1].is_empty() {
            depth -= 1;
            if depth == 0 {
                return Ok(Span {
                    anchor,
                    range: inner_start..inner_start + whole.start(),
                    keyword: "",
                });
            }
        } else if !whole.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    Err(missing)
}

/// Whole `const <name> = {…};` declaration, `let` and `var` accepted.
fn find_script_object(source: &str, name: &str, anchor: Anchor) -> Result<Span, TemplateError> {
    let declaration = Regex::new(&format!(
        r"\b(const|let|var)\s+{}\s*=\s*\{{[^}}]*\}}\s*;?",
        regex::escape(name)
    ))
    .expect("declaration pattern is escaped");
    let caps = declaration
        .captures(source)
        .ok_or(TemplateError::MissingAnchor(anchor))?;
    let keyword = match &caps[1] {
        "let" => "let",
        "var" => "var",
        _ => "const",
    };
    let whole = caps.get(0).ok_or(TemplateError::MissingAnchor(anchor))?;
    Ok(Span {
        anchor,
        range: whole.range(),
        keyword,
    })
}

// ============================================================================
// Value treatment
// ============================================================================

/// Drop the surrounding double quotes a plain-text value was authored with.
pub fn unquote(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

/// Drop a `<p>…</p>` that wraps the whole value as a single paragraph.
pub fn unwrap_paragraph(html: &str) -> &str {
    let html = html.trim();
    match html.strip_prefix("<p>").and_then(|inner| inner.strip_suffix("</p>")) {
        Some(inner) if !inner.contains("<p>") && !inner.contains("</p>") => inner.trim(),
        _ => html,
    }
}

fn display_text(text: &str) -> &str {
    unwrap_paragraph(unquote(text))
}

fn header_text(text: &str, syntax: &ImageSyntax) -> String {
    syntax.strip_images(display_text(text)).trim().to_string()
}

/// Escape text for a JavaScript backtick string literal inside `<script>`.
pub fn js_escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace('\'', "\\'")
        .replace("${", "\\${")
        .replace("</", "<\\/")
}

/// `const titles = {'cs': `…`, 'en': `…`, 'de': `…`, 'pl': `…`};`
fn script_object(
    keyword: &str,
    name: &str,
    field: &Localized,
    treat: impl Fn(&str) -> String,
) -> String {
    let entries = field
        .iter()
        .map(|(locale, text)| format!("'{}': `{}`", locale, js_escape(&treat(text))))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{keyword} {name} = {{{entries}}};")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DraftDocument, Field};
    use crate::test_helpers::{TEMPLATE, document_with};

    fn syntax() -> ImageSyntax {
        ImageSyntax::default()
    }

    fn render_default(doc: &LocaleDocument) -> String {
        render(TEMPLATE, doc, &syntax(), "content-image").unwrap()
    }

    #[test]
    fn title_replaced_without_quotes() {
        let doc = document_with(Field::Title, Locale::Cs, "\"New Title\"");
        let page = render_default(&doc);
        assert!(page.contains("<title>New Title</title>"));
        assert!(!page.contains("OLD"));
    }

    #[test]
    fn header_and_content_elements_replaced() {
        let doc = document_with(Field::Content, Locale::Cs, "<p>Body <em>cs</em></p>");
        let page = render_default(&doc);
        assert!(page.contains(r#"<h1 id="header-title">Header cs</h1>"#));
        assert!(page.contains(r#"<div class="text" id="content-text">Body <em>cs</em></div>"#));
    }

    #[test]
    fn header_never_carries_images() {
        let doc = document_with(
            Field::Header,
            Locale::Cs,
            "\"<PictureDeps/h.png|sl> Header <img src=\"x.png\"> cs\"",
        );
        let page = render_default(&doc);
        assert!(page.contains(r#"<h1 id="header-title">Header  cs</h1>"#));
        assert!(!page.contains("h.png"));
    }

    #[test]
    fn titles_object_has_four_image_free_entries() {
        let doc = document_with(Field::Header, Locale::En, "\"<PictureDeps/h.png> It's `here`\"");
        let page = render_default(&doc);
        let expected = "const titles = {'cs': `Header cs`, 'en': `It\\'s \\`here\\``, 'de': `Header de`, 'pl': `Header pl`};";
        assert!(page.contains(expected), "{page}");
        assert_eq!(page.matches("'en':").count(), 2);
    }

    #[test]
    fn contents_object_keeps_images() {
        let doc = document_with(Field::Content, Locale::De, "\"<PictureDeps/c.png|mc> Inhalt\"");
        let page = render_default(&doc);
        let start = page.find("const contents").unwrap();
        let object = &page[start..page[start..].find("};").unwrap() + start];
        assert!(object.contains("'de': `<img src=\"../PictureDeps/c.png\""));
        assert!(object.contains("width: 50%; display: block"));
    }

    #[test]
    fn escaped_placeholder_in_script_object_is_expanded() {
        let doc = document_with(Field::Content, Locale::Cs, "\"x <PictureDeps/it's.png|mc> y\"");
        let page = render_default(&doc);
        assert!(!page.contains("PictureDeps/it\\'s.png|mc"));
        assert!(!page.contains("<PictureDeps/it's.png|mc>"));
        assert!(page.contains(r#"<div class="text" id="content-text">x <img src="../PictureDeps/it's.png""#));
        assert!(page.contains(r#"'cs': `x <img src="../PictureDeps/it\'s.png""#));
    }

    #[test]
    fn placeholders_replaced_everywhere() {
        let doc = document_with(Field::Content, Locale::Cs, "\"<PictureDeps/c.png> x <PictureDeps/c.png>\"");
        let page = render_default(&doc);
        assert!(!page.contains("<PictureDeps/c.png>"));
        // twice in the visible element, twice in the script object
        assert_eq!(page.matches(r#"src="../PictureDeps/c.png""#).count(), 4);
    }

    #[test]
    fn template_placeholders_are_replaced_too() {
        let template = TEMPLATE.replace("<footer>", "<footer><PictureDeps/c.png|w>");
        let doc = document_with(Field::Content, Locale::Cs, "\"<PictureDeps/c.png|w>\"");
        let page = render(&template, &doc, &syntax(), "content-image").unwrap();
        assert!(!page.contains("<PictureDeps/c.png|w>"));
        assert!(page.contains(r#"<footer><img src="../PictureDeps/c.png""#));
    }

    #[test]
    fn invalid_placeholder_passes_through() {
        let doc = document_with(Field::Content, Locale::Cs, "\"see <PictureDeps/x.png|zz>\"");
        let page = render_default(&doc);
        assert!(page.contains(r#"<div class="text" id="content-text">see <PictureDeps/x.png|zz></div>"#));
        assert!(doc.images.is_empty());
    }

    #[test]
    fn rendering_is_deterministic() {
        let doc = document_with(Field::Content, Locale::Cs, "\"<PictureDeps/a.png|lr> text\"");
        assert_eq!(render_default(&doc), render_default(&doc));
    }

    #[test]
    fn values_are_not_reinterpreted_as_anchors() {
        let doc = document_with(Field::Title, Locale::Cs, "\"const titles = {};\"");
        let page = render_default(&doc);
        assert!(page.contains("<title>const titles = {};</title>"));
        assert_eq!(page.matches("const titles = {'cs'").count(), 1);
    }

    #[test]
    fn element_kind_is_not_fixed() {
        let template = TEMPLATE.replace(
            r#"<h1 id="header-title">Old header</h1>"#,
            r#"<span class="h" id='header-title'>Old header</span>"#,
        );
        let doc = document_with(Field::Title, Locale::Cs, "\"T\"");
        let page = render(&template, &doc, &syntax(), "content-image").unwrap();
        assert!(page.contains("<span class=\"h\" id='header-title'>Header cs</span>"));
    }

    #[test]
    fn nested_elements_are_balanced() {
        let template = TEMPLATE.replace(
            r#"<div class="text" id="content-text">Old content</div>"#,
            r#"<div class="text" id="content-text"><div>inner</div> old</div><div>after</div>"#,
        );
        let doc = document_with(Field::Title, Locale::Cs, "\"T\"");
        let page = render(&template, &doc, &syntax(), "content-image").unwrap();
        assert!(page.contains(r#"<div class="text" id="content-text">Content cs</div><div>after</div>"#));
    }

    #[test]
    fn data_id_is_not_an_id() {
        let template = TEMPLATE.replace(r#"id="header-title""#, r#"data-id="header-title""#);
        let doc = document_with(Field::Title, Locale::Cs, "\"T\"");
        assert_eq!(
            render(&template, &doc, &syntax(), "content-image").unwrap_err(),
            TemplateError::MissingAnchor(Anchor::Header)
        );
    }

    #[test]
    fn missing_anchors_are_named() {
        let cases = [
            ("<title>OLD</title>", Anchor::Title),
            ("const contents = {'cs': ``};", Anchor::Contents),
            ("const titles = {'cs': ``};", Anchor::Titles),
        ];
        for (needle, anchor) in cases {
            let template = TEMPLATE.replace(needle, "");
            assert_eq!(
                Template::parse(template).unwrap_err(),
                TemplateError::MissingAnchor(anchor)
            );
        }
    }

    #[test]
    fn let_declaration_keeps_keyword() {
        let template = TEMPLATE.replace("const titles", "let titles");
        let doc = document_with(Field::Title, Locale::Cs, "\"T\"");
        let page = render(&template, &doc, &syntax(), "content-image").unwrap();
        assert!(page.contains("let titles = {'cs': `Header cs`"));
    }

    #[test]
    fn unquote_only_strips_matching_pair() {
        assert_eq!(unquote("  \"a\"  "), "a");
        assert_eq!(unquote("\"a"), "\"a");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("<p>a</p>"), "<p>a</p>");
    }

    #[test]
    fn unwrap_paragraph_single_only() {
        assert_eq!(unwrap_paragraph("<p>Title</p>\n"), "Title");
        assert_eq!(unwrap_paragraph("<p>a</p>\n<p>b</p>"), "<p>a</p>\n<p>b</p>");
        assert_eq!(unwrap_paragraph("<h1>a</h1>"), "<h1>a</h1>");
    }

    #[test]
    fn js_escape_covers_literal_breakers() {
        assert_eq!(js_escape("a`b'c"), "a\\`b\\'c");
        assert_eq!(js_escape("\\n"), "\\\\n");
        assert_eq!(js_escape("${x}"), "\\${x}");
        assert_eq!(js_escape("</script>"), "<\\/script>");
    }

    #[test]
    fn markdown_values_are_unwrapped() {
        let mut draft = DraftDocument::new();
        for field in Field::ALL {
            for locale in Locale::ALL {
                draft.set(field, locale, format!("<p>{field} {locale}</p>"));
            }
        }
        let page = render_default(&draft.finish().unwrap());
        assert!(page.contains("<title>title cs</title>"));
        assert!(page.contains("'pl': `header pl`"));
    }
}
