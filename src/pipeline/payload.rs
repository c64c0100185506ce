//! Page payloads: fetch one page's wrapped body and decode it into
//! [`ContentSegment`]s.
//!
//! A payload is a JSONP-style call envelope:
//!
//! ```text
//! wenku_3({"body":[{"c":"Hello","ps":null},{"c":" world","ps":{"_enter":1}}], …})
//! ```
//!
//! Each record of `body` contributes its `c` text; a non-null `ps` marks the
//! end of a paragraph.

use crate::error::WenkuError;
use crate::pipeline::matcher::{extract_exactly_one, MatchError};
use crate::pipeline::transport::{fetch_checked, Transport};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

static RE_WRAPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"wenku_\d+\((.*)\)").unwrap());

/// The smallest decoded unit of document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSegment {
    pub text: String,
    pub paragraph_break_after: bool,
}

impl ContentSegment {
    pub fn new(text: impl Into<String>, paragraph_break_after: bool) -> Self {
        Self {
            text: text.into(),
            paragraph_break_after,
        }
    }
}

/// All segments of one page, tagged with the page's manifest position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    /// 0-based position in the manifest; the reassembly key.
    pub ordinal: usize,
    /// Platform page number, informational only.
    pub page_index: u32,
    pub url: String,
    pub segments: Vec<ContentSegment>,
    /// Size of the raw payload body.
    pub payload_bytes: usize,
}

#[derive(Deserialize)]
struct RawPayload {
    body: Option<Vec<RawRecord>>,
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    c: Value,
    #[serde(default)]
    ps: Value,
}

/// Fetch a page payload and decode its body as UTF-8.
pub async fn fetch_page(transport: &dyn Transport, url: &str) -> Result<String, WenkuError> {
    let body = fetch_checked(transport, url).await?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Strip the `wenku_<n>(…)` envelope and project `body` into segments.
pub fn decode_payload(payload: &str) -> Result<Vec<ContentSegment>, WenkuError> {
    let json = extract_exactly_one(&RE_WRAPPER, payload).map_err(|e: MatchError| {
        WenkuError::PayloadFormat {
            detail: format!(
                "expected exactly one wenku_<n>(…) envelope, found {}",
                e.count()
            ),
        }
    })?;

    let raw: RawPayload = serde_json::from_str(json).map_err(|e| WenkuError::PayloadFormat {
        detail: format!("invalid JSON body: {e}"),
    })?;
    let records = raw.body.ok_or_else(|| WenkuError::PayloadFormat {
        detail: "missing `body` field".into(),
    })?;

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let text = match record.c {
                Value::String(s) => s,
                Value::Null => {
                    return Err(WenkuError::PayloadFormat {
                        detail: format!("record {i} has no `c` text"),
                    })
                }
                // Picture and graphic elements carry structured `c` values.
                other => {
                    debug!("Skipping non-text record {}: {}", i, other);
                    String::new()
                }
            };
            Ok(ContentSegment {
                text,
                paragraph_break_after: !record.ps.is_null(),
            })
        })
        .collect()
}

/// Fetch and decode one manifest entry.
pub async fn load_page(
    transport: &dyn Transport,
    ordinal: usize,
    page_index: u32,
    url: &str,
) -> Result<DecodedPage, WenkuError> {
    let payload = fetch_page(transport, url).await?;
    let segments = decode_payload(&payload)?;
    debug!(
        "Page {} (pageIndex {}): {} segments",
        ordinal + 1,
        page_index,
        segments.len()
    );
    Ok(DecodedPage {
        ordinal,
        page_index,
        url: url.to_string(),
        segments,
        payload_bytes: payload.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transport::tests::MockTransport;

    #[test]
    fn decodes_spec_example() {
        let segs =
            decode_payload(r#"wenku_1({"body":[{"c":"Hello","ps":null},{"c":" world","ps":1}]})"#)
                .unwrap();
        assert_eq!(
            segs,
            vec![
                ContentSegment::new("Hello", false),
                ContentSegment::new(" world", true),
            ]
        );
    }

    #[test]
    fn absent_ps_means_no_break() {
        let segs = decode_payload(r#"wenku_7({"body":[{"c":"a"}]})"#).unwrap();
        assert!(!segs[0].paragraph_break_after);
    }

    #[test]
    fn any_non_null_ps_is_a_break() {
        let segs = decode_payload(
            r#"wenku_2({"body":[{"c":"a","ps":0},{"c":"b","ps":false},{"c":"c","ps":{"_enter":1}}]})"#,
        )
        .unwrap();
        assert!(segs.iter().all(|s| s.paragraph_break_after));
    }

    #[test]
    fn structured_c_yields_empty_text() {
        let segs =
            decode_payload(r#"wenku_2({"body":[{"c":{"ix":0},"t":"pic","ps":1},{"c":"x"}]})"#)
                .unwrap();
        assert_eq!(segs[0], ContentSegment::new("", true));
        assert_eq!(segs[1], ContentSegment::new("x", false));
    }

    #[test]
    fn missing_c_is_rejected() {
        let err = decode_payload(r#"wenku_2({"body":[{"ps":1}]})"#).unwrap_err();
        assert!(matches!(err, WenkuError::PayloadFormat { .. }));
    }

    #[test]
    fn missing_envelope() {
        let err = decode_payload(r#"{"body":[]}"#).unwrap_err();
        assert!(matches!(err, WenkuError::PayloadFormat { .. }));
    }

    #[test]
    fn two_envelopes_on_separate_lines() {
        let err = decode_payload("wenku_1({\"body\":[]})\nwenku_2({\"body\":[]})").unwrap_err();
        assert!(err.to_string().contains("found 2"), "got: {err}");
    }

    #[test]
    fn missing_body_field() {
        let err = decode_payload(r#"wenku_1({"page":1})"#).unwrap_err();
        assert!(err.to_string().contains("body"));
    }

    #[test]
    fn invalid_json_body() {
        let err = decode_payload(r#"wenku_1({"body":[)"#).unwrap_err();
        assert!(matches!(err, WenkuError::PayloadFormat { .. }));
    }

    #[tokio::test]
    async fn load_page_decodes_utf8() {
        let body = r#"wenku_1({"body":[{"c":"你好","ps":null}]})"#;
        let transport = MockTransport::new().route("https://x/p1", 200, body);
        let page = load_page(&transport, 0, 1, "https://x/p1").await.unwrap();
        assert_eq!(page.segments, vec![ContentSegment::new("你好", false)]);
        assert_eq!(page.payload_bytes, body.len());
    }

    #[tokio::test]
    async fn load_page_rejects_redirect_status() {
        let transport = MockTransport::new().route("https://x/p1", 302, "");
        let err = load_page(&transport, 0, 1, "https://x/p1").await.unwrap_err();
        assert_eq!(err.status(), Some(302));
    }
}
