// ABOUTME: Summary and Player output records plus the iframe Permission safelist.
// ABOUTME: Serializes as camelCase JSON; allow tokens always come out in safelist order.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An iframe permission token that may be forwarded to an embedding context.
///
/// Variant order is the canonical output order, so a `BTreeSet<Permission>`
/// is both deduplicated and safelist-ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    Autoplay,
    ClipboardWrite,
    EncryptedMedia,
    Fullscreen,
    PictureInPicture,
    WebShare,
}

impl Permission {
    pub const SAFELIST: [Permission; 6] = [
        Permission::Autoplay,
        Permission::ClipboardWrite,
        Permission::EncryptedMedia,
        Permission::Fullscreen,
        Permission::PictureInPicture,
        Permission::WebShare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Autoplay => "autoplay",
            Permission::ClipboardWrite => "clipboard-write",
            Permission::EncryptedMedia => "encrypted-media",
            Permission::Fullscreen => "fullscreen",
            Permission::PictureInPicture => "picture-in-picture",
            Permission::WebShare => "web-share",
        }
    }

    /// Looks up a safelisted token; anything else is `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::SAFELIST
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Embeddable player descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub allow: BTreeSet<Permission>,
}

impl Player {
    /// Permissions granted to players that come from page meta tags.
    pub const DEFAULT_ALLOW: [Permission; 3] = [
        Permission::Autoplay,
        Permission::EncryptedMedia,
        Permission::Fullscreen,
    ];

    /// A player with no URL; dimensions and permissions are cleared.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.url.is_none()
    }
}

/// Preview metadata for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub sitename: Option<String>,
    pub sensitive: bool,
    pub player: Player,
    pub activity_pub: Option<String>,
    pub fediverse_creator: Option<String>,
}
