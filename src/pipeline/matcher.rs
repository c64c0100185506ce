//! Exactly-one pattern extraction over unstructured text.
//!
//! The platform embeds its data in markup and JavaScript call envelopes that
//! have no published grammar. Every such lookup goes through
//! [`extract_exactly_one`] so an ambiguous or missing match is always an
//! error and never silently resolved by picking the first hit.

use regex::Regex;

/// Why a single-match extraction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchError {
    NotFound,
    Ambiguous { count: usize },
}

impl MatchError {
    /// Number of matches observed.
    pub fn count(&self) -> usize {
        match self {
            MatchError::NotFound => 0,
            MatchError::Ambiguous { count } => *count,
        }
    }
}

/// Return capture group 1 of the only match of `pattern` in `text`.
///
/// `pattern` must contain at least one capture group; a match whose first
/// group did not participate yields the empty string.
pub fn extract_exactly_one<'t>(pattern: &Regex, text: &'t str) -> Result<&'t str, MatchError> {
    let mut matches = pattern.captures_iter(text);
    let first = matches.next().ok_or(MatchError::NotFound)?;
    let extra = matches.count();
    if extra > 0 {
        return Err(MatchError::Ambiguous { count: extra + 1 });
    }
    Ok(first.get(1).map_or("", |m| m.as_str()))
}
