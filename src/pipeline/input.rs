//! Input resolution: normalise a user-supplied id or view URL to a
//! [`DocumentId`], and derive the platform endpoints from it.
//!
//! Users paste whatever they have at hand: the bare id from a share link,
//! the full `https://wenku.baidu.com/view/<id>.html` address, or a relative
//! `view/<id>.html` path. All three resolve to the same id.

use crate::error::WenkuError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

static RE_VIEW_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"view/([^/?#]+?)\.html").unwrap());

static RE_BARE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Opaque identifier of a document on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Resolve a bare id or a URL containing `view/<id>.html`.
    pub fn parse(input: &str) -> Result<Self, WenkuError> {
        let trimmed = input.trim();
        let invalid = || WenkuError::InvalidDocumentUrl {
            input: input.to_string(),
        };

        if is_url(trimmed) || trimmed.contains("view/") {
            let caps = RE_VIEW_PATH.captures(trimmed).ok_or_else(invalid)?;
            let id = caps[1].to_string();
            if !RE_BARE_ID.is_match(&id) {
                return Err(invalid());
            }
            debug!("Resolved document id {} from URL", id);
            return Ok(Self(id));
        }

        if RE_BARE_ID.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(invalid())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<base>/view/<id>.html`
    pub fn view_url(&self, base_url: &str) -> String {
        format!("{}/view/{}.html", base_url.trim_end_matches('/'), self.0)
    }

    /// The presentation listing endpoint enumerating every slide image.
    pub fn slide_listing_url(&self, base_url: &str) -> String {
        format!(
            "{}/browse/getbcsurl?doc_id={}&pn=1&rn=99999&type=ppt",
            base_url.trim_end_matches('/'),
            self.0
        )
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}
