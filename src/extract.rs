//! Eager (full-document) extraction entry points.
//!
//! These wait for every page, then return the reassembled document. Use
//! [`crate::stream::extract_stream`] instead to receive page texts as they
//! are decoded.

use crate::config::{ExtractionConfig, PageSelection};
use crate::error::WenkuError;
use crate::output::{ExtractionOutput, ExtractionStats, PageText, SlideDeck};
use crate::pipeline::input::DocumentId;
use crate::pipeline::manifest::{self, DocumentManifest, PageDescriptor};
use crate::pipeline::payload::{self, DecodedPage};
use crate::pipeline::reassemble::reassemble_with;
use crate::pipeline::slides;
use crate::pipeline::transport::{ReqwestTransport, Transport};
use crate::progress::ProgressCallback;
use futures::stream::{self, Stream, StreamExt};
use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Extract the full text of a document.
///
/// # Arguments
/// * `input`  - document id or view URL
/// * `config` - extraction configuration
///
/// # Errors
/// Any stage failure aborts the whole extraction; no partial text is
/// returned.
pub async fn extract(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, WenkuError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting extraction: {}", input);

    // ── Step 1: Resolve input and transport ──────────────────────────────
    let document_id = DocumentId::parse(input)?;
    let transport = resolve_transport(config)?;

    // ── Step 2: View page → manifest ─────────────────────────────────────
    let manifest =
        manifest::load_manifest(transport.as_ref(), &document_id, &config.base_url).await?;
    let manifest_pages = manifest.pages.len();

    // ── Step 3: Apply page selection ─────────────────────────────────────
    let selected = select_pages(&manifest, &config.pages)?;
    debug!("Selected {} of {} pages", selected.len(), manifest_pages);

    // ── Step 4: Fetch and decode every page ──────────────────────────────
    let pages = fetch_pages(transport, selected, config).await?;

    // ── Step 5: Reassemble ───────────────────────────────────────────────
    let text = reassemble_with(&pages, &config.page_separator);
    let page_texts: Vec<PageText> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| PageText::with_separator(page, i == 0, &config.page_separator))
        .collect();

    let stats = ExtractionStats {
        manifest_pages,
        fetched_pages: pages.len(),
        total_segments: page_texts.iter().map(|p| p.segments).sum(),
        paragraph_breaks: page_texts.iter().map(|p| p.paragraph_breaks).sum(),
        payload_bytes: pages.iter().map(|p| p.payload_bytes as u64).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} pages, {} chars, {}ms",
        stats.fetched_pages,
        text.chars().count(),
        stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        document_id,
        text,
        pages: page_texts,
        stats,
    })
}

/// Extract a document and write its text directly to a file.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// truncated file behind.
pub async fn extract_to_file(
    input: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, WenkuError> {
    let output = extract(input, config).await?;
    let path = output_path.as_ref();
    let write_err = |e| WenkuError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, &output.text)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    Ok(output.stats)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, WenkuError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| WenkuError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input, config))
}

/// Fetch the view page and return the manifest without fetching any page.
pub async fn inspect(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<DocumentManifest, WenkuError> {
    let document_id = DocumentId::parse(input.as_ref())?;
    let transport = resolve_transport(config)?;
    manifest::load_manifest(transport.as_ref(), &document_id, &config.base_url).await
}

/// Download every slide of a presentation into `<output_root>/<id>/`.
///
/// The slide directory must not exist yet. A failure on slide k aborts the
/// run; slides before k stay on disk.
pub async fn download_slides(
    input: impl AsRef<str>,
    output_root: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<SlideDeck, WenkuError> {
    let input = input.as_ref();
    info!("Starting slide download: {}", input);

    let document_id = DocumentId::parse(input)?;
    let transport = resolve_transport(config)?;

    // ── Resolve slide URLs ───────────────────────────────────────────────
    let listing = slides::fetch_listing(transport.as_ref(), &document_id, &config.base_url).await?;
    let descriptors = slides::parse_slide_listing(&listing);
    if descriptors.is_empty() {
        return Err(WenkuError::NoSlides {
            document_id: document_id.to_string(),
        });
    }
    info!("Listing has {} slides", descriptors.len());

    // ── Fresh output directory ───────────────────────────────────────────
    let directory = slides::create_output_dir(output_root.as_ref(), &document_id).await?;

    // ── Fetch and write, keyed by slide index ────────────────────────────
    let total = descriptors.len();
    let progress = config.progress_callback.clone();
    if let Some(ref cb) = progress {
        cb.on_extraction_start(total);
    }

    let fetch_progress = progress.clone();
    let mut fetched = Box::pin(
        stream::iter(descriptors)
            .map(|slide| {
                let transport = Arc::clone(&transport);
                let progress = fetch_progress.clone();
                async move {
                    if let Some(ref cb) = progress {
                        cb.on_page_start(slide.index + 1, total);
                    }
                    slides::fetch_slide(transport.as_ref(), &slide)
                        .await
                        .map(|bytes| (slide.index, bytes))
                        .map_err(|e| e.at_slide(slide.index))
                }
            })
            .buffered(config.concurrency.max(1)),
    );

    let mut saved = Vec::with_capacity(total);
    while let Some(result) = fetched.next().await {
        let written = match result {
            Ok((index, bytes)) => slides::save_slide(&directory, index, &bytes)
                .await
                .map_err(|e| e.at_slide(index)),
            Err(e) => Err(e),
        };
        match written {
            Ok(slide) => {
                debug!("Saved slide {} ({} bytes)", slide.index, slide.bytes);
                if let Some(ref cb) = progress {
                    cb.on_page_complete(slide.index + 1, total, slide.bytes);
                }
                saved.push(slide);
            }
            Err(e) => {
                if let Some(ref cb) = progress {
                    cb.on_page_error(saved.len() + 1, total, &e.to_string());
                    cb.on_extraction_complete(total, saved.len());
                }
                return Err(e);
            }
        }
    }

    if let Some(ref cb) = progress {
        cb.on_extraction_complete(total, saved.len());
    }
    info!("Saved {} slides to {}", saved.len(), directory.display());

    Ok(SlideDeck {
        document_id,
        directory,
        slides: saved,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Use the configured transport, or build the reqwest default.
pub(crate) fn resolve_transport(
    config: &ExtractionConfig,
) -> Result<Arc<dyn Transport>, WenkuError> {
    if let Some(ref transport) = config.transport {
        return Ok(Arc::clone(transport));
    }
    Ok(Arc::new(ReqwestTransport::from_config(config)?))
}

/// Pair each selected manifest entry with its 0-based manifest ordinal.
pub(crate) fn select_pages(
    manifest: &DocumentManifest,
    selection: &PageSelection,
) -> Result<Vec<(usize, PageDescriptor)>, WenkuError> {
    let total = manifest.pages.len();
    let indices = selection.to_indices(total);
    if indices.is_empty() && total > 0 {
        return Err(WenkuError::InvalidConfig(format!(
            "Page selection {:?} matches none of the {} manifest pages",
            selection, total
        )));
    }
    Ok(indices
        .into_iter()
        .map(|i| (i, manifest.pages[i].clone()))
        .collect())
}

/// Fetch and decode pages, yielding them in manifest order.
///
/// Up to `concurrency` requests are in flight; `buffered` hands results back
/// in submission order. The stream ends after the first error.
pub(crate) fn decoded_pages(
    transport: Arc<dyn Transport>,
    selected: Vec<(usize, PageDescriptor)>,
    concurrency: usize,
    progress: Option<ProgressCallback>,
) -> impl Stream<Item = Result<DecodedPage, WenkuError>> + Send + 'static {
    let total = selected.len();
    let start_progress = progress.clone();

    stream::iter(selected.into_iter().enumerate())
        .map(move |(n, (ordinal, page))| {
            let transport = Arc::clone(&transport);
            let progress = start_progress.clone();
            async move {
                if let Some(ref cb) = progress {
                    cb.on_page_start(n + 1, total);
                }
                payload::load_page(
                    transport.as_ref(),
                    ordinal,
                    page.page_index,
                    &page.page_load_url,
                )
                .await
                .map_err(|e| e.at_page(ordinal + 1, page.page_index))
            }
        })
        .buffered(concurrency.max(1))
        .enumerate()
        .map(move |(n, result)| {
            if let Some(ref cb) = progress {
                match &result {
                    Ok(page) => cb.on_page_complete(
                        n + 1,
                        total,
                        page.segments.iter().map(|s| s.text.len()).sum(),
                    ),
                    Err(e) => cb.on_page_error(n + 1, total, &e.to_string()),
                }
            }
            result
        })
        .scan(false, |failed, result| {
            if *failed {
                return futures::future::ready(None);
            }
            *failed = result.is_err();
            futures::future::ready(Some(result))
        })
}

async fn fetch_pages(
    transport: Arc<dyn Transport>,
    selected: Vec<(usize, PageDescriptor)>,
    config: &ExtractionConfig,
) -> Result<Vec<DecodedPage>, WenkuError> {
    let total = selected.len();
    let progress = config.progress_callback.clone();
    if let Some(ref cb) = progress {
        cb.on_extraction_start(total);
    }

    let mut stream = Box::pin(decoded_pages(
        transport,
        selected,
        config.concurrency,
        progress.clone(),
    ));
    let mut pages = Vec::with_capacity(total);
    let mut failure = None;
    while let Some(result) = stream.next().await {
        match result {
            Ok(page) => pages.push(page),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    if let Some(ref cb) = progress {
        cb.on_extraction_complete(total, pages.len());
    }
    match failure {
        Some(e) => Err(e),
        None => Ok(pages),
    }
}
