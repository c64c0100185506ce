//! Error types for the wenku-extract library.
//!
//! Every stage of the reconstruction pipeline fails fast: there is no local
//! recovery, no retry and no partial result. A single [`WenkuError`] enum
//! carries the whole taxonomy so callers can match on the stage that broke.
//!
//! Failures that happen while processing one page or one slide are wrapped
//! in [`WenkuError::Page`] / [`WenkuError::Slide`] so the message names the
//! ordinal that failed. Use [`WenkuError::root`] to reach the stage error
//! underneath.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the wenku-extract library.
#[derive(Debug, Error)]
pub enum WenkuError {
    // ── Transport ─────────────────────────────────────────────────────────
    /// The network call itself failed (DNS, refused connection, TLS, timeout).
    #[error("Request to '{url}' failed: {reason}\nCheck your internet connection.")]
    Transport { url: String, reason: String },

    /// The server answered with a status outside `[200, 300)`.
    #[error("HTTP {status} from '{url}'")]
    PageFetch { url: String, status: u16 },

    // ── Manifest ──────────────────────────────────────────────────────────
    /// The view page did not contain exactly one `WkInfo.htmlUrls` assignment.
    #[error(
        "Page manifest not found in view page: expected exactly one \
         `WkInfo.htmlUrls` assignment, found {matches}"
    )]
    ManifestNotFound { matches: usize },

    /// The manifest string was found but is not the expected JSON shape.
    #[error("Page manifest could not be parsed: {detail}")]
    ManifestParse { detail: String },

    // ── Payload ───────────────────────────────────────────────────────────
    /// A page payload did not match the `wenku_<n>(<json>)` envelope or its
    /// body is malformed.
    #[error("Malformed page payload: {detail}")]
    PayloadFormat { detail: String },

    // ── Input / output ────────────────────────────────────────────────────
    /// The input is neither a document id nor a `view/<id>.html` URL.
    #[error("Invalid document '{input}': expected an id or a URL containing view/<id>.html")]
    InvalidDocumentUrl { input: String },

    /// The slide output directory already exists; a prior run is never
    /// overwritten.
    #[error("Output directory '{path}' already exists\nRemove it or choose another --out-dir.")]
    OutputDirectoryExists { path: PathBuf },

    /// The slide listing contained no slide image URLs.
    #[error("No slides listed for document '{document_id}' (is it a presentation?)")]
    NoSlides { document_id: String },

    /// Could not create or write an output file or directory.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Ordinal context ───────────────────────────────────────────────────
    /// A page-stage failure, tagged with the page's 1-based manifest position.
    #[error("Page {position} (pageIndex {page_index}): {source}")]
    Page {
        position: usize,
        page_index: u32,
        #[source]
        source: Box<WenkuError>,
    },

    /// A slide-stage failure, tagged with the slide's 0-based index.
    #[error("Slide {index}: {source}")]
    Slide {
        index: usize,
        #[source]
        source: Box<WenkuError>,
    },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WenkuError {
    /// Wrap a page-stage error with its manifest position.
    pub fn at_page(self, position: usize, page_index: u32) -> Self {
        WenkuError::Page {
            position,
            page_index,
            source: Box::new(self),
        }
    }

    /// Wrap a slide-stage error with its slide index.
    pub fn at_slide(self, index: usize) -> Self {
        WenkuError::Slide {
            index,
            source: Box::new(self),
        }
    }

    /// The stage error beneath any `Page` / `Slide` wrappers.
    pub fn root(&self) -> &WenkuError {
        match self {
            WenkuError::Page { source, .. } | WenkuError::Slide { source, .. } => source.root(),
            other => other,
        }
    }

    /// HTTP status carried by a [`WenkuError::PageFetch`], if any.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            WenkuError::PageFetch { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_fetch_display() {
        let e = WenkuError::PageFetch {
            url: "https://x/p1".into(),
            status: 404,
        };
        let msg = e.to_string();
        assert!(msg.contains("404"), "got: {msg}");
        assert!(msg.contains("https://x/p1"), "got: {msg}");
    }

    #[test]
    fn manifest_not_found_display() {
        let e = WenkuError::ManifestNotFound { matches: 2 };
        assert!(e.to_string().contains("found 2"));
    }

    #[test]
    fn page_wrapper_names_position() {
        let e = WenkuError::PayloadFormat {
            detail: "missing body".into(),
        }
        .at_page(7, 9);
        let msg = e.to_string();
        assert!(msg.contains("Page 7"), "got: {msg}");
        assert!(msg.contains("pageIndex 9"), "got: {msg}");
        assert!(msg.contains("missing body"), "got: {msg}");
    }

    #[test]
    fn root_peels_nested_wrappers() {
        let e = WenkuError::PageFetch {
            url: "u".into(),
            status: 500,
        }
        .at_slide(3);
        assert!(matches!(e.root(), WenkuError::PageFetch { status: 500, .. }));
        assert_eq!(e.status(), Some(500));
    }

    #[test]
    fn status_is_none_for_other_errors() {
        let e = WenkuError::ManifestParse {
            detail: "eof".into(),
        };
        assert_eq!(e.status(), None);
    }
}
