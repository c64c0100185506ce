//! Presentation documents: resolve slide image URLs and persist each image
//! as `<dir>/<index>.jpg`.
//!
//! Resolution ([`parse_slide_listing`]) is a pure function over the listing
//! body. Persistence ([`create_output_dir`], [`save_slide`]) keys every write
//! by the slide's ordinal, so fetching several slides at once cannot reorder
//! the files on disk.

use crate::error::WenkuError;
use crate::pipeline::input::DocumentId;
use crate::pipeline::transport::{fetch_checked, Transport};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static RE_ZOOM: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\{"zoom":"(.*?)","page""#).unwrap());

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// One slide image to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideDescriptor {
    /// 0-based fetch order, also the output file stem.
    pub index: usize,
    pub image_url: String,
}

/// A slide written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedSlide {
    pub index: usize,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Fetch the listing endpoint for `document_id`.
pub async fn fetch_listing(
    transport: &dyn Transport,
    document_id: &DocumentId,
    base_url: &str,
) -> Result<String, WenkuError> {
    let url = document_id.slide_listing_url(base_url);
    info!("Fetching slide listing: {}", url);
    let body = fetch_checked(transport, &url).await?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Every `{"zoom":"<url>","page"` occurrence, backslashes stripped, in
/// listing order.
pub fn parse_slide_listing(body: &str) -> Vec<SlideDescriptor> {
    RE_ZOOM
        .captures_iter(body)
        .enumerate()
        .map(|(index, caps)| SlideDescriptor {
            index,
            image_url: caps[1].replace('\\', ""),
        })
        .collect()
}

/// `<dir>/<index>.jpg`
pub fn slide_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{index}.jpg"))
}

/// Create `<root>/<document_id>`. An existing directory is an error; a prior
/// run is never overwritten.
pub async fn create_output_dir(root: &Path, document_id: &DocumentId) -> Result<PathBuf, WenkuError> {
    let dir = root.join(document_id.as_str());
    match tokio::fs::create_dir(&dir).await {
        Ok(()) => {
            debug!("Created slide directory {}", dir.display());
            Ok(dir)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(WenkuError::OutputDirectoryExists { path: dir })
        }
        Err(e) => Err(WenkuError::OutputWriteFailed {
            path: dir,
            source: e,
        }),
    }
}

/// Fetch one slide image.
pub async fn fetch_slide(
    transport: &dyn Transport,
    slide: &SlideDescriptor,
) -> Result<Vec<u8>, WenkuError> {
    let bytes = fetch_checked(transport, &slide.image_url).await?;
    if !bytes.starts_with(&JPEG_MAGIC) {
        warn!(
            "Slide {} from {} does not look like a JPEG (first bytes {:02X?})",
            slide.index,
            slide.image_url,
            &bytes[..bytes.len().min(4)]
        );
    }
    Ok(bytes)
}

/// Write `bytes` to `<dir>/<index>.jpg`.
pub async fn save_slide(dir: &Path, index: usize, bytes: &[u8]) -> Result<SavedSlide, WenkuError> {
    let path = slide_path(dir, index);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| WenkuError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
    Ok(SavedSlide {
        index,
        path,
        bytes: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transport::tests::MockTransport;

    const LISTING: &str = r#"<html>{"list":[{"zoom":"https:\/\/img.x\/a.jpg?o=1","page":1},{"zoom":"https:\/\/img.x\/b.jpg","page":2}]}</html>"#;

    #[test]
    fn listing_preserves_extraction_order() {
        let slides = parse_slide_listing(LISTING);
        assert_eq!(
            slides,
            vec![
                SlideDescriptor {
                    index: 0,
                    image_url: "https://img.x/a.jpg?o=1".into()
                },
                SlideDescriptor {
                    index: 1,
                    image_url: "https://img.x/b.jpg".into()
                },
            ]
        );
    }

    #[test]
    fn empty_listing() {
        assert!(parse_slide_listing("<html></html>").is_empty());
    }

    #[test]
    fn path_is_keyed_by_index() {
        assert_eq!(slide_path(Path::new("doc"), 12), PathBuf::from("doc/12.jpg"));
    }

    #[tokio::test]
    async fn output_dir_must_not_exist() {
        let root = tempfile::tempdir().unwrap();
        let id = DocumentId::parse("deck").unwrap();
        let dir = create_output_dir(root.path(), &id).await.unwrap();
        assert!(dir.is_dir());

        let err = create_output_dir(root.path(), &id).await.unwrap_err();
        assert!(matches!(err, WenkuError::OutputDirectoryExists { .. }));
    }

    #[tokio::test]
    async fn missing_root_is_a_write_failure() {
        let root = tempfile::tempdir().unwrap();
        let id = DocumentId::parse("deck").unwrap();
        let err = create_output_dir(&root.path().join("absent"), &id)
            .await
            .unwrap_err();
        assert!(matches!(err, WenkuError::OutputWriteFailed { .. }));
    }

    #[tokio::test]
    async fn save_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let saved = save_slide(dir.path(), 3, b"\xFF\xD8\xFFjpeg").await.unwrap();
        assert_eq!(saved.path, dir.path().join("3.jpg"));
        assert_eq!(saved.bytes, 7);
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"\xFF\xD8\xFFjpeg");
    }

    #[tokio::test]
    async fn fetch_slide_checks_status() {
        let slide = SlideDescriptor {
            index: 0,
            image_url: "https://img.x/a.jpg".into(),
        };
        let transport = MockTransport::new().route("https://img.x/a.jpg", 403, "denied");
        let err = fetch_slide(&transport, &slide).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }
}
