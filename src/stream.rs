//! Streaming extraction API: emit page texts as they are decoded.
//!
//! Large documents run to hundreds of pages. [`extract_stream`] yields one
//! [`PageText`] per page so callers can write to their own sink (stdout, a
//! file, a socket) without buffering the whole document.
//!
//! Pages are always yielded in manifest order, even with `concurrency > 1`.
//! Each item carries the configured page separator in
//! [`PageText::separator_before`]; writing `separator_before` then `text`
//! for every item reproduces what [`crate::extract::extract`] returns.
//! The stream is finite and cannot be restarted; it ends right after the
//! first error it yields.

use crate::config::ExtractionConfig;
use crate::error::WenkuError;
use crate::extract::{decoded_pages, resolve_transport, select_pages};
use crate::output::PageText;
use crate::pipeline::input::DocumentId;
use crate::pipeline::manifest;
use futures::stream::StreamExt;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of page texts.
pub type PageStream = Pin<Box<dyn Stream<Item = Result<PageText, WenkuError>> + Send>>;

/// Extract a document, streaming each page's text as it becomes available.
///
/// The view page and manifest are fetched before this returns; page
/// payloads are fetched lazily as the stream is polled.
///
/// # Returns
/// - `Ok(PageStream)` - a stream of `Result<PageText, WenkuError>`
/// - `Err(WenkuError)` - the input, view page, or manifest was unusable
///
/// # Example
/// ```rust,no_run
/// use wenku_extract::{extract_stream, ExtractionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let mut pages = extract_stream("136da9c702d276a200292ea0", &config).await?;
/// while let Some(page) = pages.next().await {
///     print!("{}", page?.text);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn extract_stream(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<PageStream, WenkuError> {
    let input = input.as_ref();
    info!("Starting streaming extraction: {}", input);

    let document_id = DocumentId::parse(input)?;
    let transport = resolve_transport(config)?;
    let manifest =
        manifest::load_manifest(transport.as_ref(), &document_id, &config.base_url).await?;
    let selected = select_pages(&manifest, &config.pages)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(selected.len());
    }

    let separator = config.page_separator.clone();
    let s = decoded_pages(
        transport,
        selected,
        config.concurrency,
        config.progress_callback.clone(),
    )
    .enumerate()
    .map(move |(n, result)| {
        result.map(|page| PageText::with_separator(&page, n == 0, &separator))
    });

    Ok(Box::pin(s))
}
