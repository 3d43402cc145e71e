// ABOUTME: HTTP transport for page, oEmbed and favicon requests built on reqwest.
// ABOUTME: Enforces SSRF protection, response/operation timeouts, content-type and content-length limits.

use std::net::IpAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use ipnet::{Ipv4Net, Ipv6Net};
use reqwest::header::{HeaderMap, ACCEPT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use url::Url;

use crate::error::SummaryError;
use crate::options::{Options, DEFAULT_CONTENT_LENGTH_LIMIT};

/// Content types accepted for the main document.
pub const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Options for fetching a resource.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: Option<String>,
    pub lang: Option<String>,
    pub response_timeout: Duration,
    pub operation_timeout: Duration,
    pub content_length_limit: usize,
    pub content_length_required: bool,
    pub allow_private_networks: bool,
    /// Media types the response must declare; empty accepts anything.
    pub accept_content_types: &'static [&'static str],
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            lang: None,
            response_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(60),
            content_length_limit: DEFAULT_CONTENT_LENGTH_LIMIT,
            content_length_required: false,
            allow_private_networks: false,
            accept_content_types: &[],
        }
    }
}

impl FetchOptions {
    /// Fetch options derived from summarizer options, accepting any content type.
    pub fn from_options(opts: &Options) -> Self {
        Self {
            user_agent: Some(opts.user_agent.clone()),
            lang: opts.lang.clone(),
            response_timeout: opts.response_timeout,
            operation_timeout: opts.operation_timeout,
            content_length_limit: opts.content_length_limit,
            content_length_required: opts.content_length_required,
            allow_private_networks: opts.allow_private_networks,
            accept_content_types: &[],
        }
    }

    pub fn accepting(mut self, types: &'static [&'static str]) -> Self {
        self.accept_content_types = types;
        self
    }
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub final_url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchResult {
    /// Lowercased media type of the response, without parameters.
    pub fn media_type(&self) -> Option<String> {
        media_type(&self.headers)
    }
}

fn media_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|mt| mt.trim().to_ascii_lowercase())
        .filter(|mt| !mt.is_empty())
}

/// Check if an IP address is in a private/reserved range.
pub(crate) fn is_private_ip(addr: &IpAddr) -> bool {
    static PRIVATE_V4: [&str; 5] = [
        "10.0.0.0/8",
        "172.16.0.0/12",
        "192.168.0.0/16",
        "127.0.0.0/8",
        "169.254.0.0/16",
    ];
    static PRIVATE_V6: [&str; 2] = ["fc00::/7", "fe80::/10"];

    match addr {
        IpAddr::V4(ip) => {
            ip.is_unspecified()
                || PRIVATE_V4
                    .iter()
                    .filter_map(|net| net.parse::<Ipv4Net>().ok())
                    .any(|net| net.contains(ip))
        }
        IpAddr::V6(ip) => {
            if ip.is_loopback() || ip.is_unspecified() {
                return true;
            }
            if let Some(v4) = ip.to_ipv4_mapped() {
                return is_private_ip(&IpAddr::V4(v4));
            }
            PRIVATE_V6
                .iter()
                .filter_map(|net| net.parse::<Ipv6Net>().ok())
                .any(|net| net.contains(ip))
        }
    }
}

/// Rejects hosts that are, or resolve to, private addresses.
async fn guard_host(url: &Url, original: &str, reason: &str) -> Result<(), SummaryError> {
    let Some(host) = url.host_str() else {
        return Err(SummaryError::invalid_url(
            original,
            "Fetch",
            Some(anyhow::anyhow!("URL has no host")),
        ));
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(SummaryError::ssrf(original, "Fetch", Some(anyhow::anyhow!("{}", reason))));
        }
        return Ok(());
    }

    let port = url.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        SummaryError::transport(original, "Fetch", Some(anyhow::anyhow!("DNS lookup failed: {}", e)))
    })?;
    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(SummaryError::ssrf(original, "Fetch", Some(anyhow::anyhow!("{}", reason))));
        }
    }
    Ok(())
}

fn map_reqwest_error(url: &str, what: &str, e: reqwest::Error) -> SummaryError {
    if e.is_timeout() {
        SummaryError::timeout(url, "Fetch", Some(anyhow::anyhow!("{}: {}", what, e)))
    } else {
        SummaryError::transport(url, "Fetch", Some(anyhow::anyhow!("{}: {}", what, e)))
    }
}

/// Fetch a resource from the given URL.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    method: Method,
    opts: &FetchOptions,
) -> Result<FetchResult, SummaryError> {
    if url.is_empty() {
        return Err(SummaryError::invalid_url(url, "Fetch", None));
    }

    let parsed_url = Url::parse(url).map_err(|e| {
        SummaryError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(SummaryError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    if !opts.allow_private_networks {
        guard_host(&parsed_url, url, "private IP addresses are not allowed").await?;
    }

    let mut request = client
        .request(method.clone(), parsed_url.clone())
        .timeout(opts.operation_timeout);
    if let Some(ref agent) = opts.user_agent {
        request = request.header(USER_AGENT, agent.as_str());
    }
    if let Some(ref lang) = opts.lang {
        request = request.header(ACCEPT_LANGUAGE, lang.as_str());
    }

    let response = match tokio::time::timeout(opts.response_timeout, request.send()).await {
        Ok(result) => result.map_err(|e| map_reqwest_error(url, "request failed", e))?,
        Err(_) => {
            return Err(SummaryError::timeout(
                url,
                "Fetch",
                Some(anyhow::anyhow!("no response within {:?}", opts.response_timeout)),
            ))
        }
    };

    if !opts.allow_private_networks && response.url() != &parsed_url {
        guard_host(response.url(), url, "redirect to private IP address is not allowed").await?;
    }

    let status = response.status();
    if !status.is_success() {
        return Err(SummaryError::status(url, "Fetch", status));
    }

    let final_url = response.url().to_string();
    let headers = response.headers().clone();

    if !opts.accept_content_types.is_empty() {
        let accepted = media_type(&headers)
            .map(|mt| opts.accept_content_types.contains(&mt.as_str()))
            .unwrap_or(false);
        if !accepted {
            return Err(SummaryError::transport(
                url,
                "Fetch",
                Some(anyhow::anyhow!(
                    "unsupported content-type: {}",
                    media_type(&headers).unwrap_or_else(|| "none".to_string())
                )),
            ));
        }
    }

    if method == Method::HEAD {
        return Ok(FetchResult {
            status: status.as_u16(),
            final_url,
            headers,
            body: Bytes::new(),
        });
    }

    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok());
    match declared {
        Some(len) if len > opts.content_length_limit as u64 => {
            return Err(SummaryError::size_limit(
                url,
                "Fetch",
                Some(anyhow::anyhow!(
                    "declared content-length {} exceeds limit {}",
                    len,
                    opts.content_length_limit
                )),
            ));
        }
        None if opts.content_length_required => {
            return Err(SummaryError::size_limit(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content-length required")),
            ));
        }
        _ => {}
    }

    let mut response = response;
    let mut body = BytesMut::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| map_reqwest_error(url, "failed to read body", e))?
    {
        if body.len() + chunk.len() > opts.content_length_limit {
            return Err(SummaryError::size_limit(
                url,
                "Fetch",
                Some(anyhow::anyhow!("body exceeds limit {}", opts.content_length_limit)),
            ));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(FetchResult {
        status: status.as_u16(),
        final_url,
        headers,
        body: body.freeze(),
    })
}
