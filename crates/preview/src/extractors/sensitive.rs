// ABOUTME: Sensitivity classification from rating meta tags, rating response headers and mixi ratings.
// ABOUTME: Any single positive signal marks the page sensitive.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;

use crate::dom::Document;

static RTA_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^RTA(-[0-9A-Za-z]+)+-RTA$").unwrap());

/// Whether a rating value marks adult content.
pub fn is_adult_rating(value: &str) -> bool {
    let value = value.trim();
    if value.eq_ignore_ascii_case("adult") {
        return true;
    }
    RTA_LABEL.is_match(value)
}

fn rating_meta(doc: &Document) -> bool {
    ["name", "property"]
        .iter()
        .flat_map(|attr| doc.query_selector_all(&format!("meta[{}=\"rating\"]", attr)))
        .filter_map(|el| el.attr("content"))
        .any(|v| is_adult_rating(&v))
}

fn rating_header(headers: &HeaderMap) -> bool {
    headers
        .get_all("rating")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(is_adult_rating)
}

fn mixi_rating(doc: &Document) -> bool {
    ["property", "name"]
        .iter()
        .flat_map(|attr| doc.query_selector_all(&format!("meta[{}=\"mixi:content-rating\"]", attr)))
        .filter_map(|el| el.attr("content"))
        .any(|v| v == "1")
}

/// Classifies a page as sensitive.
pub fn is_sensitive(doc: &Document, headers: &HeaderMap) -> bool {
    rating_meta(doc) || rating_header(headers) || mixi_rating(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn doc(head: &str) -> Document {
        Document::parse(&format!("<html><head>{}</head><body></body></html>", head))
    }

    #[test]
    fn adult_meta_rating_in_any_case() {
        let headers = HeaderMap::new();
        assert!(is_sensitive(&doc(r#"<meta name="rating" content="adult">"#), &headers));
        assert!(is_sensitive(&doc(r#"<meta name="rating" content="ADULT">"#), &headers));
        assert!(is_sensitive(&doc(r#"<meta property="rating" content="Adult">"#), &headers));
    }

    #[test]
    fn rta_label_matches() {
        assert!(is_adult_rating("RTA-5042-1996-1400-1577-RTA"));
        assert!(is_adult_rating("rta-5042-1996-1400-1577-rta"));
        assert!(!is_adult_rating("RTA--RTA"));
        assert!(!is_adult_rating("RTA"));
        assert!(!is_adult_rating("general"));
        assert!(!is_adult_rating("adults only"));
    }

    #[test]
    fn rating_header_marks_sensitive() {
        let mut headers = HeaderMap::new();
        headers.append("rating", HeaderValue::from_static("general"));
        headers.append("rating", HeaderValue::from_static("RTA-5042-1996-1400-1577-RTA"));
        assert!(is_sensitive(&doc(""), &headers));
    }

    #[test]
    fn mixi_rating_requires_exact_one() {
        let headers = HeaderMap::new();
        assert!(is_sensitive(
            &doc(r#"<meta property="mixi:content-rating" content="1">"#),
            &headers
        ));
        assert!(!is_sensitive(
            &doc(r#"<meta property="mixi:content-rating" content="0">"#),
            &headers
        ));
    }

    #[test]
    fn no_signals_is_not_sensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("rating", HeaderValue::from_static("general"));
        assert!(!is_sensitive(
            &doc(r#"<meta name="rating" content="general"><title>Cats</title>"#),
            &headers
        ));
    }
}
