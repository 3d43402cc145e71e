// ABOUTME: Configuration options for the preview summarizer and its fluent SummarizerBuilder.
// ABOUTME: Covers language, user agent, response/operation timeouts, size limits and network policy.

use std::sync::Arc;
use std::time::Duration;

use crate::encoding::DecoderCache;
use crate::summarizer::Summarizer;

/// Default cap on response bodies (10 MB).
pub const DEFAULT_CONTENT_LENGTH_LIMIT: usize = 10 * 1024 * 1024;

/// Configuration options for a [`Summarizer`].
#[derive(Debug, Clone)]
pub struct Options {
    /// Sent as `Accept-Language`; never affects parsing.
    pub lang: Option<String>,
    pub user_agent: String,
    /// Budget for a response's headers to arrive.
    pub response_timeout: Duration,
    /// Budget for a whole request, and for a whole summarization.
    pub operation_timeout: Duration,
    pub content_length_limit: usize,
    pub content_length_required: bool,
    pub allow_private_networks: bool,
    pub http_client: Option<reqwest::Client>,
    pub decoder_cache: Option<Arc<DecoderCache>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            lang: None,
            user_agent: "DigestsPreview/1.0".to_string(),
            response_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(60),
            content_length_limit: DEFAULT_CONTENT_LENGTH_LIMIT,
            content_length_required: false,
            allow_private_networks: false,
            http_client: None,
            decoder_cache: None,
        }
    }
}

/// Builder for constructing Summarizer instances with custom configuration.
#[derive(Debug, Clone)]
pub struct SummarizerBuilder {
    opts: Options,
}

impl SummarizerBuilder {
    /// Create a new SummarizerBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the Accept-Language value for outbound requests.
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.opts.lang = Some(lang.into());
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set how long to wait for response headers.
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.opts.response_timeout = timeout;
        self
    }

    /// Set the overall budget for one request and for one summarization.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.opts.operation_timeout = timeout;
        self
    }

    /// Set the maximum accepted body size in bytes.
    pub fn content_length_limit(mut self, limit: usize) -> Self {
        self.opts.content_length_limit = limit;
        self
    }

    /// Reject responses that do not declare a Content-Length.
    pub fn content_length_required(mut self, required: bool) -> Self {
        self.opts.content_length_required = required;
        self
    }

    /// Allow or disallow requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Use a specific decoder cache instead of the process-wide one.
    pub fn decoder_cache(mut self, cache: Arc<DecoderCache>) -> Self {
        self.opts.decoder_cache = Some(cache);
        self
    }

    /// Build the Summarizer with the configured options.
    pub fn build(self) -> Summarizer {
        Summarizer::new(self.opts)
    }
}

impl Default for SummarizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
