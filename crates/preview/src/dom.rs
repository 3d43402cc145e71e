// ABOUTME: Typed DOM abstraction over scraper exposing query_selector/attr style lookups.
// ABOUTME: Compiled selectors are cached process-wide so repeated precedence chains stay cheap.

//! Thin typed view over a parsed HTML tree.
//!
//! Extractors never touch `scraper` directly; they go through [`Document`]
//! and [`Element`]. The tree is not `Send`, so a `Document` only lives inside
//! synchronous extraction code.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector. Invalid selectors are cached as `None`.
fn compiled(css: &str) -> Option<Selector> {
    if let Ok(cache) = SELECTOR_CACHE.read() {
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let selector = Selector::parse(css).ok();
    if let Ok(mut cache) = SELECTOR_CACHE.write() {
        cache
            .entry(css.to_string())
            .or_insert_with(|| selector.clone());
    }
    selector
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A parsed HTML document or fragment.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Parses markup as a body fragment (used for oEmbed `html`).
    pub fn parse_fragment(html: &str) -> Self {
        Self {
            html: Html::parse_fragment(html),
        }
    }

    /// The first element matching `css`, or `None` (also for invalid selectors).
    pub fn query_selector(&self, css: &str) -> Option<Element<'_>> {
        let selector = compiled(css)?;
        self.html.select(&selector).next().map(Element)
    }

    /// Every element matching `css`, in document order.
    pub fn query_selector_all(&self, css: &str) -> Vec<Element<'_>> {
        match compiled(css) {
            Some(selector) => self.html.select(&selector).map(Element).collect(),
            None => Vec::new(),
        }
    }

    /// Trimmed, non-empty `content` of the first `<meta {attr}="{key}">`.
    pub fn meta_content(&self, attr: &str, key: &str) -> Option<String> {
        let css = format!("meta[{}=\"{}\"]", attr, key);
        self.query_selector_all(&css)
            .into_iter()
            .find_map(|el| el.attr("content"))
    }

    /// Trimmed, non-empty `href` of the first element matching `css`.
    pub fn link_href(&self, css: &str) -> Option<String> {
        self.query_selector_all(css)
            .into_iter()
            .find_map(|el| el.attr("href"))
    }

    /// Whitespace-normalized text of the first element matching `css` that has any.
    pub fn first_text(&self, css: &str) -> Option<String> {
        self.query_selector_all(css)
            .into_iter()
            .map(|el| el.text())
            .find(|t| !t.is_empty())
    }

    /// `true` when `el` is a direct child of the root element.
    pub fn is_top_level(&self, el: &Element<'_>) -> bool {
        let root = self.html.root_element().id();
        el.0.parent().map(|p| p.id()) == Some(root)
    }
}

/// A borrowed element within a [`Document`].
#[derive(Clone, Copy)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    /// Trimmed attribute value; empty values count as absent.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.0
            .value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Whether the attribute is present at all, including boolean attributes.
    pub fn has_attr(&self, name: &str) -> bool {
        self.0.value().attr(name).is_some()
    }

    /// Whitespace-normalized text content.
    pub fn text(&self) -> String {
        normalize_whitespace(&self.0.text().collect::<Vec<_>>().join(" "))
    }

    /// Raw, unnormalized text content.
    pub fn raw_text(&self) -> String {
        self.0.text().collect()
    }

    /// Descendant elements with the given tag name, excluding `self`.
    pub fn count_descendants_named(&self, tag: &str) -> usize {
        self.0
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name().eq_ignore_ascii_case(tag))
            .count()
    }
}
