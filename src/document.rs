//! The normalized in-memory model of one content file.
//!
//! Both content dialects parse into the same shape: three localized fields
//! (header, title, content) in four fixed locales, plus every image token
//! found along the way.
//!
//! Parsers fill a [`DraftDocument`], where every slot is optional, and then
//! call [`DraftDocument::finish`]. That is the only way to obtain a
//! [`LocaleDocument`], so a document that reaches the renderer is always
//! fully populated. A file with any gap produces no document at all, and the
//! error lists every missing slot.
//!
//! ## Quoting
//!
//! Values from the plain-text dialect keep the double quotes they were
//! authored with (`"Hello"`). Values from the Markdown dialect are already
//! HTML and carry no quotes. The renderer strips quotes from both.

use crate::image_token::ImageToken;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One of the four fixed content locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Cs,
    En,
    De,
    Pl,
}

impl Locale {
    /// All locales, in the order they appear in files and script objects.
    pub const ALL: [Locale; 4] = [Locale::Cs, Locale::En, Locale::De, Locale::Pl];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Cs => "cs",
            Locale::En => "en",
            Locale::De => "de",
            Locale::Pl => "pl",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = ();

    /// Locale tags are matched exactly; `CS` is not a locale.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|locale| locale.as_str() == s)
            .ok_or(())
    }
}

/// One of the three localized fields of a content file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Header,
    Title,
    Content,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Header, Field::Title, Field::Content];

    /// Section name as authored in content files (`Header`, `Title`, `Content`).
    pub fn section_name(self) -> &'static str {
        match self {
            Field::Header => "Header",
            Field::Title => "Title",
            Field::Content => "Content",
        }
    }

    /// Section names are case-sensitive anchors.
    pub fn from_section_name(name: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|field| field.section_name() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Header => "header",
            Field::Title => "title",
            Field::Content => "content",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `field.locale` pair, e.g. `title.de`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub field: Field,
    pub locale: Locale,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.field, self.locale)
    }
}

/// A fully populated field: one text per locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Localized([String; 4]);

impl Localized {
    pub fn get(&self, locale: Locale) -> &str {
        &self.0[locale.index()]
    }

    /// `(locale, text)` pairs in [`Locale::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Locale, &str)> {
        Locale::ALL.into_iter().map(|locale| (locale, self.get(locale)))
    }
}

impl Serialize for Localized {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(4))?;
        for (locale, text) in self.iter() {
            map.serialize_entry(locale.as_str(), text)?;
        }
        map.end()
    }
}

/// A content file as it is being parsed. Every slot may still be empty.
#[derive(Debug, Clone, Default)]
pub struct DraftDocument {
    slots: [[Option<String>; 4]; 3],
    images: Vec<ImageToken>,
}

impl DraftDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing an earlier one for the same slot.
    pub fn set(&mut self, field: Field, locale: Locale, text: impl Into<String>) {
        self.slots[field as usize][locale.index()] = Some(text.into());
    }

    pub fn get(&self, field: Field, locale: Locale) -> Option<&str> {
        self.slots[field as usize][locale.index()].as_deref()
    }

    pub fn push_images(&mut self, tokens: impl IntoIterator<Item = ImageToken>) {
        self.images.extend(tokens);
    }

    /// Every slot that has no value yet, in field-then-locale order.
    pub fn missing(&self) -> Vec<Slot> {
        Field::ALL
            .into_iter()
            .flat_map(|field| Locale::ALL.into_iter().map(move |locale| Slot { field, locale }))
            .filter(|slot| self.get(slot.field, slot.locale).is_none())
            .collect()
    }

    /// Turn the draft into a document, or report every empty slot.
    pub fn finish(self) -> Result<LocaleDocument, Vec<Slot>> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(missing);
        }
        let [header, title, content] = self
            .slots
            .map(|field| Localized(field.map(Option::unwrap_or_default)));
        Ok(LocaleDocument {
            header,
            title,
            content,
            images: self.images,
        })
    }
}

/// A fully populated content file, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleDocument {
    pub header: Localized,
    pub title: Localized,
    pub content: Localized,
    /// Image tokens in order of first appearance. May contain repeats.
    pub images: Vec<ImageToken>,
}
