//! Reassembly: concatenate decoded segments into the final document text.
//!
//! Pages are serialised by manifest ordinal, never by arrival order, so the
//! output is identical whether pages were fetched one at a time or with
//! several requests in flight.
//!
//! A segment flagged `paragraph_break_after` is followed by one blank line
//! (`"\n\n"`). Breaks are applied literally: two adjacent breaks, within a
//! page or across a page boundary, produce two blank lines.

use crate::config::PageSeparator;
use crate::pipeline::payload::{ContentSegment, DecodedPage};

/// The paragraph-separating unit appended after a flagged segment.
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// Render one page's segments.
pub fn render_page(segments: &[ContentSegment]) -> String {
    let capacity = segments
        .iter()
        .map(|s| s.text.len() + PARAGRAPH_BREAK.len())
        .sum();
    let mut out = String::with_capacity(capacity);
    for segment in segments {
        out.push_str(&segment.text);
        if segment.paragraph_break_after {
            out.push_str(PARAGRAPH_BREAK);
        }
    }
    out
}

/// Reassemble pages in manifest order with no separator between pages.
pub fn reassemble(pages: &[DecodedPage]) -> String {
    reassemble_with(pages, &PageSeparator::None)
}

/// The separator emitted before `page`. Empty for the first page of the
/// output; otherwise numbered by the page's manifest position, so a sparse
/// page selection still names the real page.
pub fn separator_before(page: &DecodedPage, first: bool, separator: &PageSeparator) -> String {
    if first {
        String::new()
    } else {
        separator.render(page.ordinal + 1)
    }
}

/// Reassemble pages in manifest order, inserting `separator` between
/// consecutive pages.
pub fn reassemble_with(pages: &[DecodedPage], separator: &PageSeparator) -> String {
    let mut ordered: Vec<&DecodedPage> = pages.iter().collect();
    ordered.sort_by_key(|p| p.ordinal);

    let mut out = String::new();
    for (i, page) in ordered.iter().enumerate() {
        out.push_str(&separator_before(page, i == 0, separator));
        out.push_str(&render_page(&page.segments));
    }
    out
}
