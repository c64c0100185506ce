//! Configuration types for document extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Callers set only what they care
//! about and rely on the documented defaults for the rest.

use crate::error::WenkuError;
use crate::pipeline::input::is_url;
use crate::pipeline::transport::Transport;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Platform root used to build view-page and listing URLs.
pub const DEFAULT_BASE_URL: &str = "https://wenku.baidu.com";

/// User agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; wenku-extract/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Configuration for a document extraction.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use wenku_extract::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .request_timeout_secs(10)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, 4);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Platform base URL. Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Per-request timeout in seconds; `0` disables it. Default: 30.
    ///
    /// A timeout surfaces as [`WenkuError::Transport`], like any other
    /// network failure.
    pub request_timeout_secs: u64,

    /// `User-Agent` header for the default transport.
    pub user_agent: String,

    /// Maximum page (or slide) fetches in flight. Default: 1 (sequential).
    ///
    /// Output order never depends on this value: pages are reassembled and
    /// slides are written by their manifest/listing ordinal.
    pub concurrency: usize,

    /// Which manifest entries to fetch. Default: all.
    pub pages: PageSelection,

    /// Text inserted between pages. Default: nothing.
    pub page_separator: PageSeparator,

    /// Pre-constructed transport. Takes precedence over the reqwest default.
    pub transport: Option<Arc<dyn Transport>>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 1,
            pages: PageSelection::default(),
            page_separator: PageSeparator::default(),
            transport: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("concurrency", &self.concurrency)
            .field("pages", &self.pages)
            .field("page_separator", &self.page_separator)
            .field("transport", &self.transport.as_ref().map(|_| "<dyn Transport>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, WenkuError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(WenkuError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if !is_url(&c.base_url) {
            return Err(WenkuError::InvalidConfig(format!(
                "Base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.user_agent.trim().is_empty() {
            return Err(WenkuError::InvalidConfig("User agent must not be empty".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which manifest entries to fetch.
///
/// Numbers are 1-based positions in manifest order, not the platform's
/// `pageIndex` values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Fetch every page (default).
    #[default]
    All,
    /// Fetch a single page.
    Single(usize),
    /// Fetch a contiguous range of pages (inclusive).
    Range(usize, usize),
    /// Fetch specific pages (deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-based
    /// manifest positions.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

/// What to insert between consecutive pages of the reassembled text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSeparator {
    /// Pages are concatenated directly. (default)
    #[default]
    None,
    /// Horizontal rule: "\n\n---\n\n"
    HorizontalRule,
    /// HTML comment with the page position: "<!-- page N -->"
    Comment,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator placed before page `page_num` (1-based).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::None => String::new(),
            PageSeparator::HorizontalRule => "\n\n---\n\n".to_string(),
            PageSeparator::Comment => format!("\n\n<!-- page {} -->\n\n", page_num),
            PageSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sequential() {
        let c = ExtractionConfig::default();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert!(c.transport.is_none());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let err = ExtractionConfig::builder().concurrency(0).build().unwrap_err();
        assert!(matches!(err, WenkuError::InvalidConfig(_)));
    }

    #[test]
    fn base_url_must_be_http() {
        assert!(ExtractionConfig::builder()
            .base_url("ftp://wenku")
            .build()
            .is_err());
        assert!(ExtractionConfig::builder()
            .base_url("http://127.0.0.1:8080")
            .build()
            .is_ok());
    }

    #[test]
    fn test_page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).to_indices(5),
            vec![0, 2] // deduplicated and sorted
        );
    }

    #[test]
    fn separator_none_is_empty() {
        assert_eq!(PageSeparator::None.render(2), "");
        assert_eq!(PageSeparator::HorizontalRule.render(2), "\n\n---\n\n");
        assert_eq!(PageSeparator::Custom("~".into()).render(3), "\n\n~\n\n");
    }

    #[test]
    fn debug_hides_trait_objects() {
        let s = format!("{:?}", ExtractionConfig::default());
        assert!(s.contains("ExtractionConfig"));
        assert!(s.contains("concurrency: 1"));
    }
}
