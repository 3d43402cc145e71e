// ABOUTME: Federation identity extraction: the ActivityPub alternate link and the fediverse:creator tag.

use url::Url;

use super::resolve_url;
use crate::dom::Document;

const ACTIVITY_PUB_LINK: &str = "link[rel~='alternate'][type='application/activity+json']";

/// Returns `(activity_pub, fediverse_creator)`.
///
/// The ActivityPub href is resolved against the page; the creator handle is
/// passed through as written.
pub fn extract(doc: &Document, page_url: &Url) -> (Option<String>, Option<String>) {
    let activity_pub = doc
        .link_href(ACTIVITY_PUB_LINK)
        .and_then(|href| resolve_url(page_url, &href));
    let fediverse_creator = doc.meta_content("name", "fediverse:creator");
    (activity_pub, fediverse_creator)
}
