// ABOUTME: Main library entry point for the Digests link-preview summarizer.
// ABOUTME: Re-exports the public API: Summarizer, SummarizerBuilder, Options, Summary, Player, SummaryError.

//! Digests Preview - builds link-preview summaries from untrusted HTML.
//!
//! Given a URL (or HTML bytes and the URL they came from), the summarizer
//! resolves a title, description, thumbnail, icon, site name, a sensitivity
//! flag, federation identity, and an embeddable player that has passed oEmbed
//! safety validation.
//!
//! # Example
//!
//! ```no_run
//! use digests_preview::{Summarizer, SummaryError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SummaryError> {
//!     let summarizer = Summarizer::builder().lang("en-US").build();
//!     let summary = summarizer.summarize("https://example.com/article").await?;
//!     println!("{:?}", summary.title);
//!     Ok(())
//! }
//! ```

pub mod dom;
pub mod encoding;
pub mod error;
pub mod extractors;
pub mod oembed;
pub mod options;
pub mod resource;
pub mod summarizer;
pub mod summary;

pub use crate::encoding::DecoderCache;
pub use crate::error::{ErrorCode, SummaryError};
pub use crate::options::{Options, SummarizerBuilder};
pub use crate::summarizer::Summarizer;
pub use crate::summary::{Permission, Player, Summary};
