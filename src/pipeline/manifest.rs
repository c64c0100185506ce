//! Manifest extraction: recover the per-page content URLs embedded in a
//! document's view page.
//!
//! The view page carries a JavaScript assignment of the form
//!
//! ```text
//! WkInfo.htmlUrls = '{\x22json\x22:[{\x22pageIndex\x22:1,\x22pageLoadUrl\x22:\x22https:\\\/\\\/…\x22}]}';
//! ```
//!
//! Double quotes are escaped as `\x22` and every `/` in the URLs is preceded
//! by backslash noise. The view page is decoded as ISO-8859-1 so that the
//! escaped payload survives byte-for-byte regardless of what the rest of the
//! markup is encoded in.

use crate::error::WenkuError;
use crate::pipeline::input::DocumentId;
use crate::pipeline::matcher::{extract_exactly_one, MatchError};
use crate::pipeline::transport::{fetch_checked, Transport};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

static RE_HTML_URLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"WkInfo\.htmlUrls = '(.*)';").unwrap());

/// One entry of the manifest.
///
/// `page_index` is the platform's own numbering and purely informational;
/// the position of the descriptor in the manifest decides reassembly order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    #[serde(rename = "pageIndex")]
    pub page_index: u32,
    #[serde(rename = "pageLoadUrl")]
    pub page_load_url: String,
}

/// The ordered manifest of a document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentManifest {
    pub document_id: DocumentId,
    pub view_url: String,
    pub pages: Vec<PageDescriptor>,
}

#[derive(Deserialize)]
struct RawManifest {
    json: Option<Vec<PageDescriptor>>,
}

/// Fetch the view page and decode it as ISO-8859-1.
pub async fn fetch_view_page(transport: &dyn Transport, url: &str) -> Result<String, WenkuError> {
    info!("Fetching view page: {}", url);
    let body = fetch_checked(transport, url).await?;
    Ok(decode_latin1(&body))
}

/// Fetch the view page of `document_id` and extract its manifest.
pub async fn load_manifest(
    transport: &dyn Transport,
    document_id: &DocumentId,
    base_url: &str,
) -> Result<DocumentManifest, WenkuError> {
    let view_url = document_id.view_url(base_url);
    let view = fetch_view_page(transport, &view_url).await?;
    let pages = parse_manifest(&view)?;
    info!("Manifest for {} lists {} pages", document_id, pages.len());
    Ok(DocumentManifest {
        document_id: document_id.clone(),
        view_url,
        pages,
    })
}

/// Extract and parse the page manifest from view-page markup.
pub fn parse_manifest(view_page: &str) -> Result<Vec<PageDescriptor>, WenkuError> {
    let raw = extract_exactly_one(&RE_HTML_URLS, view_page).map_err(|e: MatchError| {
        WenkuError::ManifestNotFound { matches: e.count() }
    })?;
    let unescaped = raw.replace(r"\x22", "\"");

    let manifest: RawManifest =
        serde_json::from_str(&unescaped).map_err(|e| WenkuError::ManifestParse {
            detail: e.to_string(),
        })?;
    let pages = manifest.json.ok_or_else(|| WenkuError::ManifestParse {
        detail: "missing `json` field".into(),
    })?;

    Ok(pages
        .into_iter()
        .map(|mut page| {
            page.page_load_url = page.page_load_url.replace('\\', "");
            debug!("Manifest page {} -> {}", page.page_index, page.page_load_url);
            page
        })
        .collect())
}

/// ISO-8859-1: every byte is the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transport::tests::MockTransport;

    fn view_page(assignment: &str) -> String {
        format!(
            "<html><head><script>\nvar WkInfo = {{}};\n{assignment}\nWkInfo.DocInfo = {{}};\n</script></head></html>"
        )
    }

    const ASSIGNMENT: &str = r"WkInfo.htmlUrls = '{\x22ttf\x22:[],\x22json\x22:[{\x22pageIndex\x22:1,\x22pageLoadUrl\x22:\x22https:\\\/\\\/x\\\/p1\x22},{\x22pageIndex\x22:2,\x22pageLoadUrl\x22:\x22https:\\\/\\\/x\\\/p2?a=1\x22}]}';";

    #[test]
    fn manifest_round_trip() {
        let pages = parse_manifest(&view_page(ASSIGNMENT)).unwrap();
        assert_eq!(
            pages,
            vec![
                PageDescriptor {
                    page_index: 1,
                    page_load_url: "https://x/p1".into()
                },
                PageDescriptor {
                    page_index: 2,
                    page_load_url: "https://x/p2?a=1".into()
                },
            ]
        );
    }

    #[test]
    fn manifest_order_is_not_resorted() {
        let assignment = r"WkInfo.htmlUrls = '{\x22json\x22:[{\x22pageIndex\x22:3,\x22pageLoadUrl\x22:\x22c\x22},{\x22pageIndex\x22:1,\x22pageLoadUrl\x22:\x22a\x22}]}';";
        let pages = parse_manifest(&view_page(assignment)).unwrap();
        let indices: Vec<u32> = pages.iter().map(|p| p.page_index).collect();
        assert_eq!(indices, vec![3, 1]);
    }

    #[test]
    fn zero_assignments_rejected() {
        let err = parse_manifest("<html>no manifest</html>").unwrap_err();
        assert!(matches!(err, WenkuError::ManifestNotFound { matches: 0 }));
    }

    #[test]
    fn two_assignments_rejected() {
        let page = view_page(&format!("{ASSIGNMENT}\n{ASSIGNMENT}"));
        let err = parse_manifest(&page).unwrap_err();
        assert!(matches!(err, WenkuError::ManifestNotFound { matches: 2 }));
    }

    #[test]
    fn missing_json_field() {
        let page = view_page(r"WkInfo.htmlUrls = '{\x22png\x22:[]}';");
        let err = parse_manifest(&page).unwrap_err();
        assert!(matches!(err, WenkuError::ManifestParse { .. }));
    }

    #[test]
    fn invalid_json() {
        let page = view_page(r"WkInfo.htmlUrls = '{\x22json\x22:[';");
        let err = parse_manifest(&page).unwrap_err();
        assert!(matches!(err, WenkuError::ManifestParse { .. }));
    }

    #[test]
    fn latin1_decoding_is_bytewise() {
        assert_eq!(decode_latin1(&[0x41, 0xE9, 0xFF]), "A\u{E9}\u{FF}");
    }

    #[tokio::test]
    async fn load_manifest_fetches_view_url() {
        let id = DocumentId::parse("doc1").unwrap();
        let transport =
            MockTransport::new().route("https://w/view/doc1.html", 200, view_page(ASSIGNMENT));
        let manifest = load_manifest(&transport, &id, "https://w").await.unwrap();
        assert_eq!(manifest.pages.len(), 2);
        assert_eq!(manifest.view_url, "https://w/view/doc1.html");
        assert_eq!(transport.requested(), vec!["https://w/view/doc1.html"]);
    }

    #[tokio::test]
    async fn view_page_bad_status() {
        let id = DocumentId::parse("doc1").unwrap();
        let transport = MockTransport::new().route("https://w/view/doc1.html", 404, "gone");
        let err = load_manifest(&transport, &id, "https://w").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
