// ABOUTME: Embed safety validation for oEmbed video/rich markup.
// ABOUTME: Accepts exactly one top-level https iframe, clamps height, and filters allow tokens to the safelist.

use std::collections::BTreeSet;

use url::Url;

use super::payload::{Dimension, RichContent};
use super::OEmbedError;
use crate::dom::{Document, Element};
use crate::summary::{Permission, Player};

pub const MAX_HEIGHT: u32 = 1024;

fn single_iframe<'a>(doc: &'a Document) -> Result<Element<'a>, OEmbedError> {
    let iframes = doc.query_selector_all("iframe");
    match iframes.as_slice() {
        [] => Err(OEmbedError::IframeCount(0)),
        [only] => {
            if !doc.is_top_level(only) {
                return Err(OEmbedError::NotTopLevel);
            }
            if only.count_descendants_named("iframe") > 0
                || only.raw_text().to_ascii_lowercase().contains("<iframe")
            {
                return Err(OEmbedError::NestedIframe);
            }
            Ok(*only)
        }
        many => {
            if many.iter().any(|f| !doc.is_top_level(f)) {
                Err(OEmbedError::NestedIframe)
            } else {
                Err(OEmbedError::IframeCount(many.len()))
            }
        }
    }
}

fn secure_src(iframe: &Element<'_>) -> Result<String, OEmbedError> {
    let src = iframe.attr("src").ok_or(OEmbedError::MissingSrc)?;
    let url = Url::parse(&src).map_err(|_| OEmbedError::InvalidUrl(src.clone()))?;
    if url.scheme() != "https" {
        return Err(OEmbedError::InsecureScheme(url.scheme().to_string()));
    }
    Ok(url.to_string())
}

/// Attribute value first, then the payload's own value.
fn dimension(
    iframe: &Element<'_>,
    content: &RichContent,
    field: &'static str,
) -> Result<Option<Dimension>, OEmbedError> {
    if let Some(value) = iframe.attr(field) {
        return Dimension::parse_str(&value)
            .map(Some)
            .ok_or(OEmbedError::InvalidDimension { field, value });
    }
    let raw = match field {
        "width" => content.width.as_ref(),
        _ => content.height.as_ref(),
    };
    raw.map(|r| Dimension::from_raw(r, field)).transpose()
}

/// Safelisted permissions from `allow` plus a legacy `allowfullscreen`.
pub fn permissions(iframe: &Element<'_>) -> BTreeSet<Permission> {
    let mut allow: BTreeSet<Permission> = iframe
        .attr("allow")
        .unwrap_or_default()
        .split(|c: char| c == ';' || c.is_whitespace())
        .filter_map(Permission::from_token)
        .collect();
    if iframe.has_attr("allowfullscreen") {
        allow.insert(Permission::Fullscreen);
    }
    allow
}

/// Validates `content` and derives its player.
pub fn validate(content: &RichContent) -> Result<Player, OEmbedError> {
    let doc = Document::parse_fragment(&content.html);
    let iframe = single_iframe(&doc)?;
    let url = secure_src(&iframe)?;

    let width = match dimension(&iframe, content, "width")? {
        Some(Dimension::Pixels(w)) => Some(w),
        Some(Dimension::Percent) | None => None,
    };
    let height = match dimension(&iframe, content, "height")? {
        Some(Dimension::Pixels(h)) => h.min(MAX_HEIGHT),
        Some(Dimension::Percent) => {
            return Err(OEmbedError::InvalidDimension {
                field: "height",
                value: "percentage".to_string(),
            })
        }
        None => return Err(OEmbedError::MissingHeight),
    };

    Ok(Player {
        url: Some(url),
        width,
        height: Some(height),
        allow: permissions(&iframe),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oembed::payload::RawDimension;
    use pretty_assertions::assert_eq;

    fn rich(html: &str, width: Option<RawDimension>, height: Option<RawDimension>) -> RichContent {
        RichContent {
            html: html.to_string(),
            width,
            height,
        }
    }

    fn px(n: f64) -> Option<RawDimension> {
        Some(RawDimension::Number(n))
    }

    #[test]
    fn accepts_single_secure_iframe() {
        let content = rich(
            r#"<iframe src="https://player.example.com/embed/1" allow="fullscreen; autoplay"></iframe>"#,
            px(640.0),
            px(360.0),
        );
        let player = validate(&content).unwrap();
        assert_eq!(player.url.as_deref(), Some("https://player.example.com/embed/1"));
        assert_eq!(player.width, Some(640));
        assert_eq!(player.height, Some(360));
        assert_eq!(
            player.allow.into_iter().collect::<Vec<_>>(),
            vec![Permission::Autoplay, Permission::Fullscreen]
        );
    }

    #[test]
    fn sibling_iframes_are_rejected() {
        let content = rich(
            r#"<iframe src="https://a.example.com/"></iframe><iframe src="https://b.example.com/"></iframe>"#,
            None,
            px(300.0),
        );
        assert!(matches!(validate(&content), Err(OEmbedError::IframeCount(2))));
    }

    #[test]
    fn nested_iframes_are_rejected() {
        let content = rich(
            r#"<iframe src="https://a.example.com/"><iframe src="https://evil.example.com/"></iframe></iframe>"#,
            None,
            px(300.0),
        );
        assert!(matches!(validate(&content), Err(OEmbedError::NestedIframe)));
    }

    #[test]
    fn iframe_inside_wrapper_is_rejected() {
        let content = rich(
            r#"<div><iframe src="https://a.example.com/"></iframe></div>"#,
            None,
            px(300.0),
        );
        assert!(matches!(validate(&content), Err(OEmbedError::NotTopLevel)));

        let content = rich(
            r#"<iframe src="https://a.example.com/"></iframe><div><iframe src="https://b.example.com/"></iframe></div>"#,
            None,
            px(300.0),
        );
        assert!(matches!(validate(&content), Err(OEmbedError::NestedIframe)));
    }

    #[test]
    fn no_iframe_is_rejected() {
        let content = rich("<blockquote>Just a quote</blockquote>", None, px(300.0));
        assert!(matches!(validate(&content), Err(OEmbedError::IframeCount(0))));
    }

    #[test]
    fn height_is_clamped() {
        let content = rich(r#"<iframe src="https://a.example.com/"></iframe>"#, None, px(2000.0));
        assert_eq!(validate(&content).unwrap().height, Some(MAX_HEIGHT));

        let content = rich(
            r#"<iframe src="https://a.example.com/" height="5000"></iframe>"#,
            None,
            None,
        );
        assert_eq!(validate(&content).unwrap().height, Some(MAX_HEIGHT));
    }

    #[test]
    fn percentage_width_becomes_unspecified() {
        let content = rich(
            r#"<iframe src="https://a.example.com/"></iframe>"#,
            Some(RawDimension::Text("100%".to_string())),
            px(400.0),
        );
        let player = validate(&content).unwrap();
        assert_eq!(player.width, None);
        assert_eq!(player.height, Some(400));
    }

    #[test]
    fn iframe_attributes_override_payload_dimensions() {
        let content = rich(
            r#"<iframe src="https://a.example.com/" width="100%" height="240"></iframe>"#,
            px(640.0),
            px(360.0),
        );
        let player = validate(&content).unwrap();
        assert_eq!(player.width, None);
        assert_eq!(player.height, Some(240));
    }

    #[test]
    fn height_must_be_numeric_and_present() {
        let src = r#"<iframe src="https://a.example.com/"></iframe>"#;
        assert!(matches!(validate(&rich(src, px(640.0), None)), Err(OEmbedError::MissingHeight)));
        assert!(matches!(
            validate(&rich(src, None, Some(RawDimension::Text("tall".to_string())))),
            Err(OEmbedError::InvalidDimension { field: "height", .. })
        ));
        assert!(matches!(
            validate(&rich(src, None, Some(RawDimension::Text("50%".to_string())))),
            Err(OEmbedError::InvalidDimension { field: "height", .. })
        ));
        assert!(matches!(
            validate(&rich(src, Some(RawDimension::Text("wide".to_string())), px(300.0))),
            Err(OEmbedError::InvalidDimension { field: "width", .. })
        ));
    }

    #[test]
    fn unsafe_permissions_are_dropped() {
        let content = rich(
            r#"<iframe src="https://a.example.com/" allow="autoplay;gyroscope;accelerometer"></iframe>"#,
            None,
            px(300.0),
        );
        let tokens: Vec<&str> = validate(&content)
            .unwrap()
            .allow
            .iter()
            .map(Permission::as_str)
            .collect();
        assert_eq!(tokens, vec!["autoplay"]);
    }

    #[test]
    fn allowfullscreen_implies_fullscreen() {
        let content = rich(
            r#"<iframe src="https://a.example.com/" allow="camera web-share" allowfullscreen></iframe>"#,
            None,
            px(300.0),
        );
        let tokens: Vec<&str> = validate(&content)
            .unwrap()
            .allow
            .iter()
            .map(Permission::as_str)
            .collect();
        assert_eq!(tokens, vec!["fullscreen", "web-share"]);
    }

    #[test]
    fn insecure_or_missing_src_is_rejected() {
        let http = rich(r#"<iframe src="http://a.example.com/"></iframe>"#, px(640.0), px(360.0));
        assert!(matches!(validate(&http), Err(OEmbedError::InsecureScheme(s)) if s == "http"));

        let relative = rich(r#"<iframe src="/embed/1"></iframe>"#, None, px(360.0));
        assert!(matches!(validate(&relative), Err(OEmbedError::InvalidUrl(_))));

        let missing = rich("<iframe></iframe>", None, px(360.0));
        assert!(matches!(validate(&missing), Err(OEmbedError::MissingSrc)));
    }
}
