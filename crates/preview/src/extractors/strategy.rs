// ABOUTME: Ordered extraction strategies that make per-field precedence a first-class value.
// ABOUTME: Each field's chain is a const slice of Source entries evaluated until the first hit.

//! Precedence chains.
//!
//! A [`Source`] names one place a value can come from. A chain is a slice of
//! sources; [`first_match`] walks it in order and stops at the first
//! non-empty value. Twitter Card tags show up as either `name=` or
//! `property=` in the wild, so [`Source::Meta`] checks both.

use crate::dom::Document;

/// One place a field value may be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// `<meta property="...">` content.
    MetaProperty(&'static str),
    /// `<meta name="...">` content.
    MetaName(&'static str),
    /// `<meta name="...">` or `<meta property="...">` content.
    Meta(&'static str),
    /// Normalized text of the first non-empty element matching a selector.
    Text(&'static str),
    /// `href` of the first element matching a selector.
    Href(&'static str),
}

impl Source {
    pub fn extract(&self, doc: &Document) -> Option<String> {
        match *self {
            Source::MetaProperty(key) => doc.meta_content("property", key),
            Source::MetaName(key) => doc.meta_content("name", key),
            Source::Meta(key) => doc
                .meta_content("name", key)
                .or_else(|| doc.meta_content("property", key)),
            Source::Text(css) => doc.first_text(css),
            Source::Href(css) => doc.link_href(css),
        }
    }
}

/// Returns the value of the first source in `chain` that yields one.
pub fn first_match(doc: &Document, chain: &[Source]) -> Option<String> {
    chain.iter().find_map(|source| source.extract(doc))
}

pub const TITLE: &[Source] = &[
    Source::MetaProperty("og:title"),
    Source::Meta("twitter:title"),
    Source::Text("title"),
];

pub const DESCRIPTION: &[Source] = &[
    Source::MetaProperty("og:description"),
    Source::Meta("twitter:description"),
    Source::MetaName("description"),
    Source::Text("p"),
];

pub const THUMBNAIL: &[Source] = &[
    Source::MetaProperty("og:image:secure_url"),
    Source::MetaProperty("og:image"),
    Source::Meta("twitter:image"),
    Source::Meta("twitter:image:src"),
    Source::Href("link[rel~='image_src']"),
    Source::Href("link[rel~='apple-touch-icon']"),
];

/// Site names declared by the document itself.
pub const SITE_NAME: &[Source] = &[
    Source::MetaProperty("og:site_name"),
    Source::MetaName("application-name"),
];

pub const ICON: &[Source] = &[
    Source::Href("link[rel='shortcut icon']"),
    Source::Href("link[rel~='icon']"),
];

pub const TWITTER_CARD: &[Source] = &[Source::Meta("twitter:card")];

pub const OG_VIDEO_URL: &[Source] = &[
    Source::MetaProperty("og:video:secure_url"),
    Source::MetaProperty("og:video:url"),
    Source::MetaProperty("og:video"),
];

pub const OG_VIDEO_WIDTH: &[Source] = &[Source::MetaProperty("og:video:width")];
pub const OG_VIDEO_HEIGHT: &[Source] = &[Source::MetaProperty("og:video:height")];

pub const TWITTER_PLAYER_URL: &[Source] = &[Source::Meta("twitter:player")];
pub const TWITTER_PLAYER_WIDTH: &[Source] = &[Source::Meta("twitter:player:width")];
pub const TWITTER_PLAYER_HEIGHT: &[Source] = &[Source::Meta("twitter:player:height")];
