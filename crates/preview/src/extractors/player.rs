// ABOUTME: Fallback player from Open Graph video tags or a Twitter player card.
// ABOUTME: Used when no oEmbed player validates; grants the default permission set.

use url::Url;

use super::strategy::{self, first_match, Source};
use super::{parse_dimension_lenient, resolve_url};
use crate::dom::Document;
use crate::summary::Player;

fn dimension(doc: &Document, chain: &[Source]) -> Option<u32> {
    first_match(doc, chain).and_then(|v| parse_dimension_lenient(&v))
}

fn build(url: String, width: Option<u32>, height: Option<u32>) -> Player {
    Player {
        url: Some(url),
        width,
        height,
        allow: Player::DEFAULT_ALLOW.into_iter().collect(),
    }
}

/// Player declared by page meta tags, or [`Player::none`].
///
/// Open Graph video wins over a Twitter player card. Twitter players only
/// count when `twitter:card` is `player`.
pub fn fallback_player(doc: &Document, page_url: &Url) -> Player {
    if let Some(url) =
        first_match(doc, strategy::OG_VIDEO_URL).and_then(|href| resolve_url(page_url, &href))
    {
        return build(
            url,
            dimension(doc, strategy::OG_VIDEO_WIDTH),
            dimension(doc, strategy::OG_VIDEO_HEIGHT),
        );
    }

    let is_player_card = first_match(doc, strategy::TWITTER_CARD)
        .map(|card| card.eq_ignore_ascii_case("player"))
        .unwrap_or(false);
    if is_player_card {
        if let Some(url) = first_match(doc, strategy::TWITTER_PLAYER_URL)
            .and_then(|href| resolve_url(page_url, &href))
        {
            return build(
                url,
                dimension(doc, strategy::TWITTER_PLAYER_WIDTH),
                dimension(doc, strategy::TWITTER_PLAYER_HEIGHT),
            );
        }
    }

    Player::none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::Permission;
    use pretty_assertions::assert_eq;

    fn page() -> Url {
        Url::parse("https://video.example.com/watch/42").unwrap()
    }

    #[test]
    fn open_graph_video_wins() {
        let doc = Document::parse(
            r#"<html><head>
                <meta name="twitter:card" content="player">
                <meta name="twitter:player" content="https://video.example.com/tw/42">
                <meta property="og:video" content="https://video.example.com/plain/42">
                <meta property="og:video:secure_url" content="https://video.example.com/secure/42">
                <meta property="og:video:width" content="1280">
                <meta property="og:video:height" content="720">
            </head></html>"#,
        );
        let player = fallback_player(&doc, &page());
        assert_eq!(player.url.as_deref(), Some("https://video.example.com/secure/42"));
        assert_eq!(player.width, Some(1280));
        assert_eq!(player.height, Some(720));
        assert_eq!(
            player.allow.into_iter().collect::<Vec<_>>(),
            vec![Permission::Autoplay, Permission::EncryptedMedia, Permission::Fullscreen]
        );
    }

    #[test]
    fn twitter_player_requires_player_card() {
        let head = r#"<meta name="twitter:player" content="/embed/42">
            <meta name="twitter:player:width" content="480">
            <meta name="twitter:player:stream" content="https://video.example.com/raw.mp4">"#;

        let summary_card = Document::parse(&format!(
            r#"<html><head><meta name="twitter:card" content="summary">{}</head></html>"#,
            head
        ));
        assert!(fallback_player(&summary_card, &page()).is_none());

        let player_card = Document::parse(&format!(
            r#"<html><head><meta name="twitter:card" content="player">{}</head></html>"#,
            head
        ));
        let player = fallback_player(&player_card, &page());
        assert_eq!(player.url.as_deref(), Some("https://video.example.com/embed/42"));
        assert_eq!(player.width, Some(480));
        assert_eq!(player.height, None);
    }

    #[test]
    fn nothing_declared_is_none() {
        let doc = Document::parse("<html><head><title>Plain</title></head></html>");
        let player = fallback_player(&doc, &page());
        assert_eq!(player, Player::none());
        assert!(player.allow.is_empty());
    }

    #[test]
    fn unresolvable_video_url_is_skipped() {
        let doc = Document::parse(
            r#"<html><head><meta property="og:video" content="javascript:void(0)"></head></html>"#,
        );
        assert!(fallback_player(&doc, &page()).is_none());
    }
}
