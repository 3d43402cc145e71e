// ABOUTME: Title, description, thumbnail and site-name extraction with cleanup and clipping.
// ABOUTME: Precedence comes from the strategy chains; clipping applies to the final chosen value.

use regex::Regex;
use url::Url;

use super::resolve_url;
use super::strategy::{self, first_match, Source};
use crate::dom::Document;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 300;

const ELLIPSIS: char = '…';

/// The text fields of a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialSummary {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub sitename: Option<String>,
}

/// Trims `s` and clips it to at most `max` characters, the last being `…` when clipped.
pub fn clip(s: &str, max: usize) -> String {
    let trimmed = s.trim();
    if trimmed.chars().count() <= max {
        return trimmed.to_string();
    }
    let mut clipped: String = trimmed.chars().take(max.saturating_sub(1)).collect();
    clipped.truncate(clipped.trim_end().len());
    clipped.push(ELLIPSIS);
    clipped
}

/// Strips a trailing `<separator> <site name>` from a title.
///
/// Only applies when the title is longer than the site name, so a title
/// that *is* the site name survives.
pub fn cleanup_title(title: &str, site_name: Option<&str>) -> String {
    let title = title.trim();
    let Some(site) = site_name.map(str::trim).filter(|s| !s.is_empty()) else {
        return title.to_string();
    };
    if title.chars().count() <= site.chars().count() {
        return title.to_string();
    }

    let pattern = format!(r"^(.+?)\s*[\-|:・—–]\s*{}$", regex::escape(site));
    match Regex::new(&pattern) {
        Ok(re) => re
            .captures(title)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| title.to_string()),
        Err(_) => title.to_string(),
    }
}

/// Extracts the text fields of a summary from `doc`.
pub fn extract(doc: &Document, page_url: &Url) -> PartialSummary {
    let declared_site = first_match(doc, strategy::SITE_NAME);
    let sitename = declared_site
        .clone()
        .or_else(|| page_url.host_str().map(str::to_string));

    // Only a document <title> carries the site-name suffix; meta titles are taken as-is.
    let title = strategy::TITLE
        .iter()
        .find_map(|source| {
            let raw = source.extract(doc)?;
            Some(match source {
                Source::Text(_) => cleanup_title(&raw, declared_site.as_deref()),
                _ => raw,
            })
        })
        .map(|t| clip(&t, TITLE_MAX_CHARS))
        .filter(|t| !t.is_empty())
        .or_else(|| sitename.clone());

    let description = first_match(doc, strategy::DESCRIPTION)
        .map(|d| clip(&d, DESCRIPTION_MAX_CHARS))
        .filter(|d| !d.is_empty())
        .filter(|d| Some(d) != title.as_ref());

    let thumbnail =
        first_match(doc, strategy::THUMBNAIL).and_then(|href| resolve_url(page_url, &href));

    PartialSummary {
        title,
        description,
        thumbnail,
        sitename,
    }
}
