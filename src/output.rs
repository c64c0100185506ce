//! Output types returned by the extraction entry points.

use crate::config::PageSeparator;
use crate::pipeline::input::DocumentId;
use crate::pipeline::payload::DecodedPage;
use crate::pipeline::reassemble::{render_page, separator_before};
use crate::pipeline::slides::SavedSlide;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One page's rendered text.
///
/// `text` is always the page alone. `separator_before` holds the configured
/// page separator that precedes it in the document (empty for the first
/// page or with [`PageSeparator::None`]), so concatenating
/// `separator_before + text` over all pages reproduces the document text.
///
/// [`PageSeparator::None`]: crate::config::PageSeparator::None
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 0-based position in the manifest.
    pub ordinal: usize,
    /// Platform page number, informational.
    pub page_index: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub separator_before: String,
    pub segments: usize,
    pub paragraph_breaks: usize,
}

impl PageText {
    /// Page text preceded by its separator, as it appears in the document.
    pub fn with_separator(page: &DecodedPage, first: bool, separator: &PageSeparator) -> Self {
        Self {
            separator_before: separator_before(page, first, separator),
            ..Self::from(page)
        }
    }
}

impl From<&DecodedPage> for PageText {
    fn from(page: &DecodedPage) -> Self {
        Self {
            ordinal: page.ordinal,
            page_index: page.page_index,
            text: render_page(&page.segments),
            separator_before: String::new(),
            segments: page.segments.len(),
            paragraph_breaks: page
                .segments
                .iter()
                .filter(|s| s.paragraph_break_after)
                .count(),
        }
    }
}

/// Counters for a completed text extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages listed in the manifest.
    pub manifest_pages: usize,
    /// Pages fetched after applying the page selection.
    pub fetched_pages: usize,
    pub total_segments: usize,
    pub paragraph_breaks: usize,
    /// Sum of raw payload sizes.
    pub payload_bytes: u64,
    pub total_duration_ms: u64,
}

/// The reassembled document plus per-page detail.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    pub document_id: DocumentId,
    /// All pages in manifest order with paragraph breaks applied.
    pub text: String,
    pub pages: Vec<PageText>,
    pub stats: ExtractionStats,
}

/// Slides written by the presentation pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct SlideDeck {
    pub document_id: DocumentId,
    pub directory: PathBuf,
    pub slides: Vec<SavedSlide>,
}

impl SlideDeck {
    pub fn total_bytes(&self) -> u64 {
        self.slides.iter().map(|s| s.bytes as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::payload::ContentSegment;

    #[test]
    fn page_text_counts_breaks() {
        let page = DecodedPage {
            ordinal: 4,
            page_index: 5,
            url: "u".into(),
            segments: vec![
                ContentSegment::new("a", true),
                ContentSegment::new("b", false),
                ContentSegment::new("c", true),
            ],
            payload_bytes: 10,
        };
        let text = PageText::from(&page);
        assert_eq!(text.text, "a\n\nbc\n\n");
        assert_eq!(text.segments, 3);
        assert_eq!(text.paragraph_breaks, 2);
        assert_eq!(text.ordinal, 4);
    }

    #[test]
    fn stats_serialise() {
        let stats = ExtractionStats {
            manifest_pages: 3,
            fetched_pages: 2,
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"fetched_pages\":2"));
    }

    #[test]
    fn separator_kept_apart_from_text() {
        let page = DecodedPage {
            ordinal: 2,
            page_index: 3,
            url: "u".into(),
            segments: vec![ContentSegment::new("three", false)],
            payload_bytes: 5,
        };
        let later = PageText::with_separator(&page, false, &PageSeparator::Comment);
        assert_eq!(later.text, "three");
        assert_eq!(later.separator_before, "\n\n<!-- page 3 -->\n\n");

        let first = PageText::with_separator(&page, true, &PageSeparator::Comment);
        assert!(first.separator_before.is_empty());
    }
}
