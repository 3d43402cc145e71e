// ABOUTME: Error types for the preview summarizer including ErrorCode enum and SummaryError struct.
// ABOUTME: Only transport, timeout, size-limit and guard failures propagate; extraction failures never do.

use std::fmt;

/// Error codes representing the failures a summarization request can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Transport,
    Timeout,
    SizeLimit,
    Ssrf,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Transport => "transport error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::SizeLimit => "size limit exceeded",
            ErrorCode::Ssrf => "SSRF blocked",
        };
        write!(f, "{}", s)
    }
}

/// The error type returned by [`crate::Summarizer`] operations.
#[derive(Debug, thiserror::Error)]
pub struct SummaryError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    /// HTTP status of the response, when one was received.
    pub status: Option<u16>,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for SummaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(status) = self.status {
            write!(f, " (status {})", status)?;
        }
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl SummaryError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            status: None,
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Transport error without a status (connection failure, bad content-type).
    pub fn transport(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Transport, url, op, source)
    }

    /// Create a Transport error for a non-2xx response.
    pub fn status(url: impl Into<String>, op: impl Into<String>, status: reqwest::StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("unknown status");
        Self {
            status: Some(status.as_u16()),
            ..Self::new(
                ErrorCode::Transport,
                url,
                op,
                Some(anyhow::anyhow!("{} {}", status.as_u16(), reason)),
            )
        }
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, url, op, source)
    }

    /// Create a SizeLimit error.
    pub fn size_limit(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::SizeLimit, url, op, source)
    }

    /// Create an SSRF error.
    pub fn ssrf(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Ssrf, url, op, source)
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Transport error.
    pub fn is_transport(&self) -> bool {
        self.code == ErrorCode::Transport
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is a SizeLimit error.
    pub fn is_size_limit(&self) -> bool {
        self.code == ErrorCode::SizeLimit
    }

    /// Returns true if this is an SSRF error.
    pub fn is_ssrf(&self) -> bool {
        self.code == ErrorCode::Ssrf
    }
}
