// ABOUTME: Fallible parse step from untrusted oEmbed JSON into a typed, envelope-checked record.
// ABOUTME: Dimensions stay raw here; the iframe validator decides how to interpret them.

use serde::Deserialize;
use serde_json::Value;

use super::OEmbedError;

pub const SUPPORTED_VERSION: &str = "1.0";

/// Wire shape of an oEmbed response. Nothing here is trusted yet.
#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    version: Option<Value>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    width: Option<RawDimension>,
    #[serde(default)]
    height: Option<RawDimension>,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

/// A width or height as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDimension {
    Number(f64),
    Text(String),
}

impl RawDimension {
    fn describe(&self) -> String {
        match self {
            RawDimension::Number(n) => n.to_string(),
            RawDimension::Text(s) => s.clone(),
        }
    }
}

/// An interpreted dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Pixels(u32),
    Percent,
}

fn pixels(n: f64) -> Option<Dimension> {
    if n.is_finite() && n >= 0.0 {
        Some(Dimension::Pixels(n.round().min(u32::MAX as f64) as u32))
    } else {
        None
    }
}

impl Dimension {
    /// Interprets an attribute or JSON string: `"360"`, `"360.5"` or `"100%"`.
    pub fn parse_str(value: &str) -> Option<Dimension> {
        let value = value.trim();
        if let Some(number) = value.strip_suffix('%') {
            return number.trim().parse::<f64>().ok().filter(|n| n.is_finite()).map(|_| Dimension::Percent);
        }
        value.parse::<f64>().ok().and_then(pixels)
    }

    /// Interprets a wire dimension, naming `field` on failure.
    pub fn from_raw(raw: &RawDimension, field: &'static str) -> Result<Dimension, OEmbedError> {
        let parsed = match raw {
            RawDimension::Number(n) => pixels(*n),
            RawDimension::Text(s) => Dimension::parse_str(s),
        };
        parsed.ok_or_else(|| OEmbedError::InvalidDimension {
            field,
            value: raw.describe(),
        })
    }
}

/// Markup-bearing content of a `video` or `rich` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RichContent {
    pub html: String,
    pub width: Option<RawDimension>,
    pub height: Option<RawDimension>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OEmbedKind {
    Photo { url: String },
    Video(RichContent),
    Rich(RichContent),
}

/// An oEmbed response whose envelope has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct OEmbed {
    pub kind: OEmbedKind,
    pub thumbnail_url: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, OEmbedError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(OEmbedError::MissingField(field))
}

/// Parses a response body and checks the version and type envelope.
pub fn parse(body: &[u8]) -> Result<OEmbed, OEmbedError> {
    let raw: RawPayload = serde_json::from_slice(body)?;

    match raw.version {
        Some(Value::String(ref v)) if v == SUPPORTED_VERSION => {}
        Some(other) => return Err(OEmbedError::UnsupportedVersion(other.to_string())),
        None => return Err(OEmbedError::MissingField("version")),
    }

    let kind = match raw.kind.as_deref().map(str::trim) {
        Some("photo") => OEmbedKind::Photo {
            url: required(raw.url, "url")?,
        },
        Some(k @ ("video" | "rich")) => {
            let content = RichContent {
                html: required(raw.html, "html")?,
                width: raw.width,
                height: raw.height,
            };
            if k == "video" {
                OEmbedKind::Video(content)
            } else {
                OEmbedKind::Rich(content)
            }
        }
        Some(other) => return Err(OEmbedError::UnsupportedType(other.to_string())),
        None => return Err(OEmbedError::MissingField("type")),
    };

    Ok(OEmbed {
        kind,
        thumbnail_url: raw.thumbnail_url,
    })
}
