//! The image placeholder micro-language shared by both content dialects.
//!
//! Authors reference images with a bare placeholder:
//!
//! ```text
//! <PictureDeps/Content/Article1/photo.png>        full width
//! <PictureDeps/Content/Article1/photo.png|w>      full width, explicit
//! <PictureDeps/Content/Article1/photo.png|mr>     50% wide, floated right
//! ```
//!
//! The path always begins with the image directory marker (`PictureDeps` by
//! default, see [`crate::config::ImagesConfig`]) and never contains `<`, `>`
//! or `|`. The optional layout code is `w` or a size letter (`s` 25%,
//! `m` 50%, `l` 75%) followed by an alignment letter (`c` centered,
//! `l` float left, `r` float right), matched case-insensitively.
//!
//! A placeholder with any other code (`|zz`, `|xl`, `|mcx`) is not a token.
//! It stays in the text untouched.
//!
//! Tokens are later replaced by plain substring search for the placeholder
//! they were parsed from, so [`ImageToken::placeholder`] reproduces the code
//! exactly as authored (`|MC` stays `|MC`).

use maud::html;
use regex::Regex;
use serde::Serialize;

/// Prefix added to every image path in rendered pages. Pages live one
/// directory below the image root.
const PARENT_DIR: &str = "../";

/// One image reference found in content text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageToken {
    /// Path starting with the image directory marker, e.g. `PictureDeps/a.png`.
    pub path: String,
    /// Layout code as authored. `None` means full width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ImageToken {
    pub fn new(path: impl Into<String>, code: Option<&str>) -> Self {
        Self {
            path: path.into(),
            code: code.map(str::to_string),
        }
    }

    /// The literal placeholder this token was parsed from.
    pub fn placeholder(&self) -> String {
        match &self.code {
            Some(code) => format!("<{}|{}>", self.path, code),
            None => format!("<{}>", self.path),
        }
    }

    /// Inline CSS for the rendered image.
    ///
    /// | code | style |
    /// |------|-------|
    /// | none, `w` | `width: 100%; height: auto;` |
    /// | `?c` | width + centered block |
    /// | `?l` | width + float left, 20px right margin |
    /// | `?r` | width + float right, 20px left margin |
    /// | other | width only |
    pub fn style(&self) -> String {
        let code = self
            .code
            .as_deref()
            .unwrap_or("w")
            .to_ascii_lowercase();
        if code == "w" {
            return "width: 100%; height: auto;".to_string();
        }

        let mut letters = code.chars();
        let width = match letters.next() {
            Some('s') => "25%",
            Some('m') => "50%",
            Some('l') => "75%",
            _ => "100%",
        };
        match letters.next().unwrap_or('c') {
            'c' => format!(
                "width: {width}; display: block; margin-left: auto; margin-right: auto; height: auto;"
            ),
            'l' => format!("width: {width}; float: left; margin-right: 20px; height: auto;"),
            'r' => format!("width: {width}; float: right; margin-left: 20px; height: auto;"),
            _ => format!("width: {width}; height: auto;"),
        }
    }

    /// The `<img>` element that replaces this token in a rendered page.
    ///
    /// The element removes itself when the image fails to load.
    pub fn to_img_tag(&self, class: &str) -> String {
        html! {
            img src={ (PARENT_DIR) (self.path) } class=(class) style=(self.style()) onerror="this.remove()";
        }
        .into_string()
    }
}

/// Compiled matchers for one image directory marker.
#[derive(Debug, Clone)]
pub struct ImageSyntax {
    token: Regex,
    img_tag: Regex,
    any_img_tag: Regex,
}

impl ImageSyntax {
    pub fn new(marker: &str) -> Self {
        let escaped = regex::escape(marker);
        let code = r"w|[sml][clr]";
        let token = format!(r"(?i)<({escaped}/[^<>|]+)(?:\|({code}))?>");
        let img_tag =
            format!(r#"(?i)<img\s+[^>]*src="([^"]*{escaped}/[^"|]+)(?:\|({code}))?"[^>]*>"#);
        Self {
            token: Regex::new(&token).expect("token pattern is built from an escaped marker"),
            img_tag: Regex::new(&img_tag).expect("img pattern is built from an escaped marker"),
            any_img_tag: Regex::new(r"(?i)<img\b[^>]*>").expect("static pattern"),
        }
    }

    /// Every token in `text`, in order of appearance.
    pub fn parse_tokens(&self, text: &str) -> Vec<ImageToken> {
        self.token
            .captures_iter(text)
            .map(|caps| ImageToken::new(&caps[1], caps.get(2).map(|m| m.as_str())))
            .collect()
    }

    /// Byte ranges of every token in `text`.
    pub(crate) fn token_spans(&self, text: &str) -> Vec<std::ops::Range<usize>> {
        self.token.find_iter(text).map(|m| m.range()).collect()
    }

    /// Rewrite `<img src="../PictureDeps/a.png|mc" ...>` into `<PictureDeps/a.png|mc>`.
    ///
    /// One leading `../` is dropped from the source path. Image tags that do
    /// not point into the marker directory are left alone.
    pub fn unwrap_img_tags(&self, text: &str) -> String {
        self.img_tag
            .replace_all(text, |caps: &regex::Captures| {
                let src = &caps[1];
                let path = src.strip_prefix(PARENT_DIR).unwrap_or(src);
                match caps.get(2) {
                    Some(code) => format!("<{}|{}>", path, code.as_str()),
                    None => format!("<{}>", path),
                }
            })
            .into_owned()
    }

    /// Remove both `<img>` elements and image tokens from `text`.
    pub fn strip_images(&self, text: &str) -> String {
        let without_tags = self.any_img_tag.replace_all(text, "");
        self.token.replace_all(&without_tags, "").into_owned()
    }
}

impl Default for ImageSyntax {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_IMAGE_MARKER)
    }
}
