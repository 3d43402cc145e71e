// ABOUTME: Metadata extraction strategies over a decoded HTML document.
// ABOUTME: Builds the synchronous Page record that the summarizer completes with network lookups.

//! Metadata extraction module.
//!
//! Submodules:
//! - `strategy`: ordered source lists that encode per-field precedence.
//! - `fields`: title/description/thumbnail/site name with cleanup and clipping.
//! - `favicon`: declared icon discovery and the well-known path probe.
//! - `sensitive`: rating signals from meta tags and response headers.
//! - `federation`: ActivityPub alternate link and fediverse creator tag.
//! - `player`: Open Graph / Twitter player fallback.
//!
//! All of these run against one [`Document`] in [`extract_page`], which drops
//! the parsed tree before returning so callers can `.await` afterwards.

pub mod favicon;
pub mod federation;
pub mod fields;
pub mod player;
pub mod sensitive;
pub mod strategy;

use reqwest::header::HeaderMap;
use url::Url;

use crate::dom::Document;
use crate::oembed::{self, Resolved};
use crate::summary::{Player, Summary};

use self::fields::PartialSummary;

/// Resolves `href` against `base`, keeping only http(s) results.
pub(crate) fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let resolved = base.join(href.trim()).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Parses a pixel dimension leniently: integers or decimals, anything else is `None`.
pub(crate) fn parse_dimension_lenient(value: &str) -> Option<u32> {
    let n = value.trim().parse::<f64>().ok()?;
    if n.is_finite() && n >= 0.0 {
        Some(n.round().min(u32::MAX as f64) as u32)
    } else {
        None
    }
}

/// Everything that can be read from the document without further requests.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub fields: PartialSummary,
    pub declared_icon: Option<String>,
    pub sensitive: bool,
    pub activity_pub: Option<String>,
    pub fediverse_creator: Option<String>,
    pub fallback_player: Player,
    pub oembed_endpoint: Option<Url>,
}

/// Runs every synchronous extractor over `html`.
pub fn extract_page(html: &str, page_url: &Url, headers: &HeaderMap) -> Page {
    let doc = Document::parse(html);
    let (activity_pub, fediverse_creator) = federation::extract(&doc, page_url);

    Page {
        fields: fields::extract(&doc, page_url),
        declared_icon: favicon::declared_icon(&doc, page_url),
        sensitive: sensitive::is_sensitive(&doc, headers),
        activity_pub,
        fediverse_creator,
        fallback_player: player::fallback_player(&doc, page_url),
        oembed_endpoint: oembed::discover(&doc, page_url),
    }
}

impl Page {
    /// Combines the page with the icon and oEmbed lookups.
    ///
    /// A validated oEmbed player replaces the fallback player; an oEmbed
    /// thumbnail only fills a missing one.
    pub fn into_summary(self, icon: Option<String>, embed: Option<Resolved>) -> Summary {
        let PartialSummary {
            title,
            description,
            mut thumbnail,
            sitename,
        } = self.fields;

        let mut player = self.fallback_player;
        if let Some(resolved) = embed {
            if thumbnail.is_none() {
                thumbnail = resolved.thumbnail;
            }
            if let Some(embedded) = resolved.player {
                player = embedded;
            }
        }

        Summary {
            title,
            icon,
            description,
            thumbnail,
            sitename,
            sensitive: self.sensitive,
            player,
            activity_pub: self.activity_pub,
            fediverse_creator: self.fediverse_creator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_url_handles_relative_and_rejects_other_schemes() {
        let base = Url::parse("https://example.com/blog/post/").unwrap();
        assert_eq!(
            resolve_url(&base, "../img.png"),
            Some("https://example.com/blog/img.png".to_string())
        );
        assert_eq!(
            resolve_url(&base, "//cdn.example.com/a.png"),
            Some("https://cdn.example.com/a.png".to_string())
        );
        assert_eq!(resolve_url(&base, "javascript:alert(1)"), None);
        assert_eq!(resolve_url(&base, "data:image/png;base64,AAAA"), None);
    }

    #[test]
    fn lenient_dimensions() {
        assert_eq!(parse_dimension_lenient("640"), Some(640));
        assert_eq!(parse_dimension_lenient(" 360.4 "), Some(360));
        assert_eq!(parse_dimension_lenient("100%"), None);
        assert_eq!(parse_dimension_lenient("-5"), None);
        assert_eq!(parse_dimension_lenient("wide"), None);
    }

    #[test]
    fn oembed_player_overrides_fallback_and_thumbnail_only_fills_gaps() {
        let page = Page {
            fields: PartialSummary {
                title: Some("T".to_string()),
                thumbnail: Some("https://example.com/og.png".to_string()),
                ..Default::default()
            },
            fallback_player: Player {
                url: Some("https://example.com/og-video.mp4".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let embedded = Player {
            url: Some("https://player.example.com/embed/1".to_string()),
            height: Some(360),
            ..Default::default()
        };
        let summary = page.into_summary(
            None,
            Some(Resolved {
                player: Some(embedded.clone()),
                thumbnail: Some("https://example.com/oembed-thumb.png".to_string()),
            }),
        );
        assert_eq!(summary.player, embedded);
        assert_eq!(summary.thumbnail.as_deref(), Some("https://example.com/og.png"));
    }
}
