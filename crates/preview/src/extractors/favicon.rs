// ABOUTME: Favicon resolution from declared <link rel=icon> tags or the well-known /favicon.ico path.
// ABOUTME: The well-known path is only reported when a HEAD probe answers 200.

use reqwest::Method;
use url::Url;

use super::resolve_url;
use super::strategy::{self, first_match};
use crate::dom::Document;
use crate::resource::{self, FetchOptions};

/// The icon URL the document declares, resolved against the page.
pub fn declared_icon(doc: &Document, page_url: &Url) -> Option<String> {
    first_match(doc, strategy::ICON).and_then(|href| resolve_url(page_url, &href))
}

/// `/favicon.ico` at the page's origin.
pub fn well_known_url(page_url: &Url) -> Option<Url> {
    page_url.join("/favicon.ico").ok()
}

/// Probes the well-known favicon path with a HEAD request.
///
/// Any failure, including a non-200 success status, yields `None`.
pub async fn probe(client: &reqwest::Client, page_url: &Url, opts: &FetchOptions) -> Option<String> {
    let target = well_known_url(page_url)?;
    match resource::fetch(client, target.as_str(), Method::HEAD, opts).await {
        Ok(result) if result.status == 200 => Some(target.to_string()),
        Ok(result) => {
            tracing::debug!(url = %target, status = result.status, "favicon probe miss");
            None
        }
        Err(e) => {
            tracing::debug!(url = %target, error = %e, "favicon probe failed");
            None
        }
    }
}
