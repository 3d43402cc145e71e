// ABOUTME: oEmbed discovery, fetch and validation into a safe player or thumbnail.
// ABOUTME: Every failure is a local rejection; summarization continues with fallback fields.

//! oEmbed resolution.
//!
//! The flow is discover, fetch, envelope check ([`payload::parse`]), then
//! content check ([`validate`]). Only a fully validated `video` or `rich`
//! payload produces a player. A `photo` payload can only contribute a
//! thumbnail.

pub mod iframe;
pub mod payload;

use reqwest::Method;
use url::Url;

use crate::dom::Document;
use crate::resource::{self, FetchOptions};
use crate::summary::Player;

use self::payload::{OEmbed, OEmbedKind};

const DISCOVERY_LINK: &str = "link[type='application/json+oembed']";

/// Why an oEmbed payload was rejected.
#[derive(Debug, thiserror::Error)]
pub enum OEmbedError {
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported version {0}")]
    UnsupportedVersion(String),
    #[error("unsupported type {0:?}")]
    UnsupportedType(String),
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
    #[error("insecure scheme {0:?}")]
    InsecureScheme(String),
    #[error("expected exactly one iframe, found {0}")]
    IframeCount(usize),
    #[error("iframe is not top-level")]
    NotTopLevel,
    #[error("nested iframe")]
    NestedIframe,
    #[error("iframe has no src")]
    MissingSrc,
    #[error("missing height")]
    MissingHeight,
    #[error("invalid {field} {value:?}")]
    InvalidDimension { field: &'static str, value: String },
}

/// What a validated payload contributes to a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub player: Option<Player>,
    pub thumbnail: Option<String>,
}

/// Finds the JSON oEmbed endpoint a document advertises.
pub fn discover(doc: &Document, page_url: &Url) -> Option<Url> {
    let href = doc.link_href(DISCOVERY_LINK)?;
    let endpoint = page_url.join(&href).ok()?;
    match endpoint.scheme() {
        "http" | "https" => Some(endpoint),
        _ => None,
    }
}

fn absolute_http(value: &str) -> Option<String> {
    let url = Url::parse(value.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.to_string()),
        _ => None,
    }
}

/// Checks the content of an envelope-valid payload.
pub fn validate(embed: OEmbed) -> Result<Resolved, OEmbedError> {
    let thumbnail_url = embed.thumbnail_url.as_deref().and_then(absolute_http);

    match embed.kind {
        OEmbedKind::Photo { url } => {
            let photo = absolute_http(&url).ok_or(OEmbedError::InvalidUrl(url))?;
            Ok(Resolved {
                player: None,
                thumbnail: Some(photo),
            })
        }
        OEmbedKind::Video(content) | OEmbedKind::Rich(content) => Ok(Resolved {
            player: Some(iframe::validate(&content)?),
            thumbnail: thumbnail_url,
        }),
    }
}

/// Fetches and validates the payload at `endpoint`. Rejections are logged and yield `None`.
pub async fn resolve(
    client: &reqwest::Client,
    endpoint: &Url,
    opts: &FetchOptions,
) -> Option<Resolved> {
    let result = match resource::fetch(client, endpoint.as_str(), Method::GET, opts).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(endpoint = %endpoint, error = %e, "oEmbed fetch failed");
            return None;
        }
    };

    match payload::parse(&result.body).and_then(validate) {
        Ok(resolved) => Some(resolved),
        Err(reason) => {
            tracing::debug!(endpoint = %endpoint, %reason, "oEmbed payload rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    fn local_opts() -> FetchOptions {
        FetchOptions {
            allow_private_networks: true,
            ..Default::default()
        }
    }

    #[test]
    fn discovers_relative_json_endpoint_only() {
        let doc = Document::parse(
            r#"<html><head>
                <link rel="alternate" type="text/xml+oembed" href="/oembed.xml">
                <link rel="alternate" type="application/json+oembed" href="oembed?url=x&amp;format=json">
            </head></html>"#,
        );
        let page = Url::parse("https://video.example.com/watch/").unwrap();
        assert_eq!(
            discover(&doc, &page).map(|u| u.to_string()),
            Some("https://video.example.com/watch/oembed?url=x&format=json".to_string())
        );

        let xml_only = Document::parse(
            r#"<html><head><link type="text/xml+oembed" href="/oembed.xml"></head></html>"#,
        );
        assert_eq!(discover(&xml_only, &page), None);
    }

    #[test]
    fn photo_contributes_thumbnail_only() {
        let embed = payload::parse(
            br#"{"version": "1.0", "type": "photo", "url": "https://img.example.com/p.jpg",
                 "thumbnail_url": "https://img.example.com/t.jpg"}"#,
        )
        .unwrap();
        assert_eq!(
            validate(embed).unwrap(),
            Resolved {
                player: None,
                thumbnail: Some("https://img.example.com/p.jpg".to_string()),
            }
        );
    }

    #[test]
    fn photo_requires_absolute_url() {
        let embed = payload::parse(br#"{"version": "1.0", "type": "photo", "url": "/p.jpg"}"#).unwrap();
        assert!(matches!(validate(embed), Err(OEmbedError::InvalidUrl(_))));
    }

    #[test]
    fn relative_thumbnail_url_is_dropped() {
        let embed = payload::parse(
            br#"{"version": "1.0", "type": "video", "height": 200, "thumbnail_url": "/t.jpg",
                 "html": "<iframe src=\"https://player.example.com/1\"></iframe>"}"#,
        )
        .unwrap();
        let resolved = validate(embed).unwrap();
        assert!(resolved.player.is_some());
        assert_eq!(resolved.thumbnail, None);
    }

    #[tokio::test]
    async fn resolve_accepts_valid_rich_payload() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/oembed");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"version": "1.0", "type": "rich", "width": 500, "height": 2000,
                          "html": "<iframe src=\"https://player.example.com/e/1\" allow=\"autoplay; camera\"></iframe>"}"#);
        });

        let endpoint = Url::parse(&server.url("/oembed")).unwrap();
        let resolved = resolve(&reqwest::Client::new(), &endpoint, &local_opts()).await;
        mock.assert();

        let player = resolved.and_then(|r| r.player).expect("player");
        assert_eq!(player.url.as_deref(), Some("https://player.example.com/e/1"));
        assert_eq!(player.width, Some(500));
        assert_eq!(player.height, Some(1024));
        assert_eq!(player.allow.len(), 1);
    }

    #[tokio::test]
    async fn resolve_rejects_on_http_failure_and_bad_version() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET).path("/old");
            then.status(200).body(
                r#"{"version": "0.9", "type": "rich", "height": 100,
                    "html": "<iframe src=\"https://player.example.com/e/1\"></iframe>"}"#,
            );
        });

        let client = reqwest::Client::new();
        let missing = Url::parse(&server.url("/missing")).unwrap();
        assert_eq!(resolve(&client, &missing, &local_opts()).await, None);
        let old = Url::parse(&server.url("/old")).unwrap();
        assert_eq!(resolve(&client, &old, &local_opts()).await, None);
    }
}
