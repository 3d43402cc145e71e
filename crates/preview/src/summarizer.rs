// ABOUTME: The Summarizer ties transport, decoding, extraction, favicon probing and oEmbed together.
// ABOUTME: summarize() fetches a URL under the operation budget; summarize_general() works on decoded HTML.

use std::net::ToSocketAddrs;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

use crate::encoding::{self, DecoderCache};
use crate::error::SummaryError;
use crate::extractors::{extract_page, favicon};
use crate::oembed;
use crate::options::{Options, SummarizerBuilder};
use crate::resource::{self, FetchOptions, HTML_CONTENT_TYPES};
use crate::summary::Summary;

/// Builds preview summaries for pages.
pub struct Summarizer {
    opts: Options,
    http_client: reqwest::Client,
    decoders: Arc<DecoderCache>,
}

fn redirect_policy(allow_private: bool) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        if allow_private {
            return attempt.follow();
        }
        let next = attempt.url().clone();
        let Some(host) = next.host_str() else {
            return attempt.follow();
        };
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            if resource::is_private_ip(&ip) {
                return attempt.error("redirect to private IP blocked");
            }
            return attempt.follow();
        }
        // synchronous DNS resolution; the policy callback cannot await
        let port = next.port_or_known_default().unwrap_or(80);
        match (host, port).to_socket_addrs() {
            Ok(addrs) => {
                for sa in addrs {
                    if resource::is_private_ip(&sa.ip()) {
                        return attempt.error("redirect to private IP blocked");
                    }
                }
                attempt.follow()
            }
            Err(_) => attempt.error("DNS lookup failed during redirect"),
        }
    })
}

impl Summarizer {
    /// Create a new SummarizerBuilder for configuring the summarizer.
    pub fn builder() -> SummarizerBuilder {
        SummarizerBuilder::new()
    }

    /// Create a new Summarizer with the given options.
    pub fn new(opts: Options) -> Self {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .redirect(redirect_policy(opts.allow_private_networks))
                .user_agent(&opts.user_agent)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "falling back to default HTTP client");
                    reqwest::Client::new()
                })
        });
        let decoders = opts.decoder_cache.clone().unwrap_or_else(DecoderCache::shared);

        Self {
            opts,
            http_client,
            decoders,
        }
    }

    fn fetch_options(&self) -> FetchOptions {
        FetchOptions::from_options(&self.opts)
    }

    /// Fetches `url` and summarizes it.
    ///
    /// Fails only with transport, timeout, size-limit, SSRF or invalid-URL
    /// errors. Everything about the content itself degrades to empty fields.
    #[tracing::instrument(skip(self))]
    pub async fn summarize(&self, url: &str) -> Result<Summary, SummaryError> {
        let budget = self.opts.operation_timeout;
        match tokio::time::timeout(budget, self.summarize_url(url)).await {
            Ok(result) => result,
            Err(_) => Err(SummaryError::timeout(
                url,
                "Summarize",
                Some(anyhow::anyhow!("operation exceeded {:?}", budget)),
            )),
        }
    }

    async fn summarize_url(&self, url: &str) -> Result<Summary, SummaryError> {
        let page_url = Url::parse(url).map_err(|e| {
            SummaryError::invalid_url(url, "Summarize", Some(anyhow::anyhow!("invalid URL: {}", e)))
        })?;

        let opts = self.fetch_options().accepting(HTML_CONTENT_TYPES);
        let fetched = resource::fetch(&self.http_client, page_url.as_str(), Method::GET, &opts).await?;
        let final_url = Url::parse(&fetched.final_url).unwrap_or(page_url);

        Ok(self
            .summarize_bytes(&final_url, &fetched.body, &fetched.headers)
            .await)
    }

    /// Decodes raw document bytes and summarizes them.
    pub async fn summarize_bytes(&self, url: &Url, bytes: &[u8], headers: &HeaderMap) -> Summary {
        let html = encoding::decode_detected(bytes, &self.decoders);
        self.summarize_general(url, &html, headers).await
    }

    /// Summarizes already-decoded HTML. Never fails.
    pub async fn summarize_general(&self, url: &Url, html: &str, headers: &HeaderMap) -> Summary {
        let page = extract_page(html, url, headers);
        let opts = self.fetch_options();

        let icon = async {
            match page.declared_icon.clone() {
                Some(icon) => Some(icon),
                None => favicon::probe(&self.http_client, url, &opts).await,
            }
        };
        let embed = async {
            match page.oembed_endpoint.as_ref() {
                Some(endpoint) => oembed::resolve(&self.http_client, endpoint, &opts).await,
                None => None,
            }
        };
        let (icon, embed) = tokio::join!(icon, embed);

        page.into_summary(icon, embed)
    }
}
