//! # wenku-extract
//!
//! Reconstruct the full text (or slide images) of a Baidu Wenku document
//! from nothing but its public id.
//!
//! The platform never serves a document as one file. Its view page embeds a
//! manifest of per-page content URLs, and each of those returns a fragment
//! of text wrapped in a JSONP envelope. This crate drives those endpoints
//! and stitches the fragments back together in order.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document id / view URL
//!  │
//!  ├─ 1. Input       resolve the DocumentId
//!  ├─ 2. Manifest    view page → WkInfo.htmlUrls → ordered page URLs
//!  ├─ 3. Payload     fetch each page, strip wenku_<n>(…), decode segments
//!  └─ 4. Reassemble  concatenate in manifest order, paragraph breaks as blank lines
//!
//! presentation documents:
//!  ├─ 1. Listing     getbcsurl → ordered slide image URLs
//!  └─ 2. Images      fetch each slide → <id>/<index>.jpg
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wenku_extract::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let output = extract("136da9c702d276a200292ea0", &config).await?;
//!     print!("{}", output.text);
//!     eprintln!("{} pages", output.stats.fetched_pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `wenku` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! wenku-extract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, PageSelection, PageSeparator};
pub use error::WenkuError;
pub use extract::{download_slides, extract, extract_sync, extract_to_file, inspect};
pub use output::{ExtractionOutput, ExtractionStats, PageText, SlideDeck};
pub use pipeline::input::DocumentId;
pub use pipeline::manifest::{DocumentManifest, PageDescriptor};
pub use pipeline::payload::ContentSegment;
pub use pipeline::slides::{SavedSlide, SlideDescriptor};
pub use pipeline::transport::{HttpResponse, ReqwestTransport, Transport};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{extract_stream, PageStream};
