// ABOUTME: Character-encoding detection and decoding for raw response bytes.
// ABOUTME: Scans the first 4 KiB for a charset declaration, normalizes aliases, and caches decoders by name.

//! Encoding resolution.
//!
//! Detection looks only at the first [`SNIFF_LIMIT`] bytes, read through an
//! ASCII-only view, for a `charset=` declaration. Known aliases collapse onto
//! one canonical name so they share a cache entry. Anything that does not
//! name a decoder `encoding_rs` can build resolves to `utf-8`.
//!
//! Decoding never fails: malformed sequences become U+FFFD and an unknown
//! name falls back to UTF-8 over the full buffer.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use encoding_rs::{Encoding, REPLACEMENT, UTF_16BE, UTF_16LE, UTF_8, X_USER_DEFINED};
use once_cell::sync::Lazy;
use regex::Regex;

/// Number of leading bytes inspected for a charset declaration.
pub const SNIFF_LIMIT: usize = 4096;

/// Name returned when no usable declaration is found.
pub const DEFAULT_ENCODING: &str = "utf-8";

static CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([a-z0-9_:.\-]+)"#).unwrap());

static SHARED_CACHE: Lazy<Arc<DecoderCache>> = Lazy::new(|| Arc::new(DecoderCache::new()));

/// Process-scoped, append-only map from normalized encoding name to decoder.
///
/// Entries are never evicted or replaced. Two threads racing on the same miss
/// both resolve the same `&'static Encoding`, so the insert is idempotent.
#[derive(Debug, Default)]
pub struct DecoderCache {
    entries: RwLock<HashMap<String, &'static Encoding>>,
}

impl DecoderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every summarizer that was not given its own.
    pub fn shared() -> Arc<DecoderCache> {
        Arc::clone(&SHARED_CACHE)
    }

    /// Returns the decoder for a normalized name, building and caching it on first use.
    pub fn get(&self, name: &str) -> Option<&'static Encoding> {
        if let Ok(entries) = self.entries.read() {
            if let Some(encoding) = entries.get(name) {
                return Some(*encoding);
            }
        }

        let encoding = Encoding::for_label(name.as_bytes())?;
        if let Ok(mut entries) = self.entries.write() {
            entries.entry(name.to_string()).or_insert(encoding);
        }
        Some(encoding)
    }

    /// Number of cached decoders.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maps charset aliases onto the name used as the cache key.
pub fn normalize_label(label: &str) -> String {
    let lower = label.trim().to_ascii_lowercase();
    match lower.as_str() {
        "shift_jis" | "windows-31j" | "x-sjis" | "cp932" => "shift-jis".to_string(),
        "gb2312" | "gbk" => "gbk".to_string(),
        _ => lower,
    }
}

/// Detects the declared encoding of `bytes`, returning a normalized name.
pub fn detect(bytes: &[u8], cache: &DecoderCache) -> String {
    let head = &bytes[..bytes.len().min(SNIFF_LIMIT)];
    // Charset names are ASCII; everything else is masked out.
    let ascii: String = head
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
        .collect();

    let Some(declared) = CHARSET_RE
        .captures(&ascii)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    else {
        return DEFAULT_ENCODING.to_string();
    };

    let name = normalize_label(declared);
    match cache.get(&name) {
        Some(encoding) if is_declarable(encoding) => name,
        Some(_) => {
            tracing::debug!(charset = declared, "undeclarable charset, defaulting to utf-8");
            DEFAULT_ENCODING.to_string()
        }
        None => {
            tracing::debug!(charset = declared, "unsupported charset, defaulting to utf-8");
            DEFAULT_ENCODING.to_string()
        }
    }
}

/// Whether an in-document declaration may select `encoding`.
///
/// The replacement encoding would decode the whole body to one U+FFFD, and a
/// UTF-16 body could not have been read as ASCII to find the declaration.
fn is_declarable(encoding: &'static Encoding) -> bool {
    encoding != REPLACEMENT
        && encoding != UTF_16LE
        && encoding != UTF_16BE
        && encoding != X_USER_DEFINED
}

/// Decodes `bytes` with the named encoding, falling back to UTF-8.
pub fn decode(bytes: &[u8], name: &str, cache: &DecoderCache) -> String {
    let encoding = cache.get(name).unwrap_or(UTF_8);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "replaced malformed byte sequences");
    }
    text.into_owned()
}

/// Detects and decodes in one step.
pub fn decode_detected(bytes: &[u8], cache: &DecoderCache) -> String {
    let name = detect(bytes, cache);
    decode(bytes, &name, cache)
}
