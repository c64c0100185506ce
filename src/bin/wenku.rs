//! CLI binary for wenku-extract.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use wenku_extract::{
    download_slides, extract, extract_to_file, inspect, ExtractionConfig,
    ExtractionProgressCallback, PageSelection, PageSeparator, ProgressCallback,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per page or slide.
struct CliProgressCallback {
    bar: ProgressBar,
    /// "pages" or "slides", used in the bar template and summary.
    unit: &'static str,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner only; the length is set by `on_extraction_start`.
    fn new_dynamic(unit: &'static str) -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Fetching document listing…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            unit,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let template = format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  \
             [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {}  \
             ⏱ {{elapsed_precise}}  ETA {{eta_precise}}",
            self.unit
        );
        let progress_style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Fetching");
        self.bar.reset_eta();
    }

    fn take_elapsed_ms(&self, page_num: usize) -> u128 {
        self.start_times
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&page_num)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0)
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Fetching {total_pages} {}…", self.unit))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(page_num, Instant::now());
        self.bar.set_message(format!("item {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, bytes: usize) {
        let elapsed_ms = self.take_elapsed_ms(page_num);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{bytes:>6} bytes")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let elapsed_ms = self.take_elapsed_ms(page_num);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_pages: usize, success_count: usize) {
        self.bar.finish_and_clear();

        if self.errors.load(Ordering::SeqCst) == 0 && success_count == total_pages {
            eprintln!(
                "{} {} {} fetched",
                green("✔"),
                bold(&success_count.to_string()),
                self.unit
            );
        } else {
            eprintln!(
                "{} aborted after {}/{} {}",
                red("✘"),
                bold(&success_count.to_string()),
                total_pages,
                self.unit
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Document text to stdout
  wenku 136da9c702d276a200292ea0

  # From a view URL, into a file
  wenku https://wenku.baidu.com/view/136da9c702d276a200292ea0.html -o doc.txt

  # First ten pages, with page markers
  wenku --pages 1-10 --separator comment 136da9c702d276a200292ea0

  # Show the page manifest only
  wenku --inspect-only --json 136da9c702d276a200292ea0

  # Presentation slides into ./slides/<id>/0.jpg, 1.jpg, …
  wenku --mode slides --out-dir slides 6c5b0a2f0066f5335a8121e2

ENVIRONMENT VARIABLES:
  RUST_LOG              Override the log filter (e.g. wenku_extract=debug)
  WENKU_BASE_URL        Platform base URL
  WENKU_CONCURRENCY     In-flight page requests
  WENKU_TIMEOUT         Per-request timeout in seconds
"#;

/// Reconstruct Baidu Wenku documents as plain text or slide images.
#[derive(Parser, Debug)]
#[command(
    name = "wenku",
    version,
    about = "Reconstruct Baidu Wenku documents as plain text or slide images",
    long_about = "Reconstruct a Baidu Wenku document from its id or view URL. Text documents \
are rebuilt page by page from the platform's per-page payloads; presentations are saved as \
one JPEG per slide.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document id or view URL (…/view/<id>.html).
    input: String,

    /// Which pipeline to run.
    #[arg(long, env = "WENKU_MODE", value_enum, default_value = "text")]
    mode: ModeArg,

    /// Write text to this file instead of stdout.
    #[arg(short, long, env = "WENKU_OUTPUT")]
    output: Option<PathBuf>,

    /// Parent directory for the slide folder.
    #[arg(long, env = "WENKU_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "WENKU_PAGES", default_value = "all")]
    pages: String,

    /// Page separator: none, hr, comment, or custom string.
    #[arg(long, env = "WENKU_SEPARATOR", default_value = "none")]
    separator: String,

    /// Number of requests in flight at once.
    #[arg(short, long, env = "WENKU_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Per-request timeout in seconds (0 disables).
    #[arg(long, env = "WENKU_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Platform base URL.
    #[arg(long, env = "WENKU_BASE_URL", default_value = wenku_extract::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// User-Agent header sent with every request.
    #[arg(long, env = "WENKU_USER_AGENT")]
    user_agent: Option<String>,

    /// Output structured JSON instead of plain text.
    #[arg(long, env = "WENKU_JSON")]
    json: bool,

    /// Print the page manifest only, no page fetches.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "WENKU_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WENKU_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "WENKU_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
    Text,
    Slides,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose is given.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let unit = match cli.mode {
        ModeArg::Text => "pages",
        ModeArg::Slides => "slides",
    };
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic(unit);
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let manifest = inspect(&cli.input, &config)
            .await
            .context("Failed to read document manifest")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&manifest).context("Failed to serialise manifest")?
            );
        } else {
            println!("Document:   {}", manifest.document_id);
            println!("View URL:   {}", manifest.view_url);
            println!("Pages:      {}", manifest.pages.len());
            for (n, page) in manifest.pages.iter().enumerate() {
                println!(
                    "  {:>4}  {}  {}",
                    n + 1,
                    dim(&format!("#{}", page.page_index)),
                    page.page_load_url
                );
            }
        }
        return Ok(());
    }

    match cli.mode {
        ModeArg::Slides => run_slides(&cli, &config).await,
        ModeArg::Text => run_text(&cli, &config, show_progress).await,
    }
}

async fn run_text(cli: &Cli, config: &ExtractionConfig, show_progress: bool) -> Result<()> {
    if let Some(ref output_path) = cli.output {
        let stats = extract_to_file(&cli.input, output_path, config)
            .await
            .context("Text extraction failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {}/{} pages  {}ms  →  {}",
                green("✔"),
                stats.fetched_pages,
                stats.manifest_pages,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    }

    let output = extract(&cli.input, config)
        .await
        .context("Text extraction failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        write_text(&mut io::stdout().lock(), &output.text)?;
    }

    if !cli.quiet && !cli.json && !show_progress {
        eprintln!(
            "Extracted {}/{} pages in {}ms",
            output.stats.fetched_pages, output.stats.manifest_pages, output.stats.total_duration_ms
        );
    }
    Ok(())
}

/// Emit the document exactly as reassembled.
fn write_text(out: &mut impl Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    out.flush().context("Failed to flush stdout")
}

async fn run_slides(cli: &Cli, config: &ExtractionConfig) -> Result<()> {
    let deck = download_slides(&cli.input, &cli.out_dir, config)
        .await
        .with_context(|| format!("Slide download failed (output root {:?})", cli.out_dir))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&deck).context("Failed to serialise slides")?;
        println!("{json}");
    } else if !cli.quiet {
        println!("dir: {}", deck.directory.display());
        eprintln!(
            "{}  {} slides  {}",
            green("✔"),
            deck.slides.len(),
            dim(&format!("{} bytes", deck.total_bytes())),
        );
    }
    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let pages = parse_pages(&cli.pages)?;
    let separator = parse_separator(&cli.separator);

    let mut builder = ExtractionConfig::builder()
        .base_url(cli.base_url.clone())
        .request_timeout_secs(cli.timeout)
        .concurrency(cli.concurrency)
        .pages(pages)
        .page_separator(separator);

    if let Some(ref ua) = cli.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages`: `all`, `5`, `3-15`, or `1,3,5,7` (1-based).
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }
    if let Some((start, end)) = s.split_once('-') {
        let (start, end) = (page_number(start)?, page_number(end)?);
        if start > end {
            anyhow::bail!("Invalid page range '{start}-{end}': start must be <= end");
        }
        return Ok(PageSelection::Range(start, end));
    }
    if s.contains(',') {
        let pages = s.split(',').map(page_number).collect::<Result<Vec<_>>>()?;
        return Ok(PageSelection::Set(pages));
    }
    page_number(&s).map(PageSelection::Single)
}

/// One 1-based page number.
fn page_number(raw: &str) -> Result<usize> {
    let raw = raw.trim();
    let page: usize = raw
        .parse()
        .with_context(|| format!("Invalid page number: '{raw}'"))?;
    if page == 0 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got 0)");
    }
    Ok(page)
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "none" => PageSeparator::None,
        "hr" | "---" => PageSeparator::HorizontalRule,
        "comment" => PageSeparator::Comment,
        _ => PageSeparator::Custom(s.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_parse_all_forms() {
        assert!(matches!(parse_pages("all").unwrap(), PageSelection::All));
        assert!(matches!(parse_pages(" 5 ").unwrap(), PageSelection::Single(5)));
        assert!(matches!(parse_pages("3-15").unwrap(), PageSelection::Range(3, 15)));
        match parse_pages("1,3,5").unwrap() {
            PageSelection::Set(v) => assert_eq!(v, vec![1, 3, 5]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pages_reject_zero_and_reversed() {
        assert!(parse_pages("0").is_err());
        assert!(parse_pages("9-2").is_err());
        assert!(parse_pages("1,0").is_err());
        assert!(parse_pages("x").is_err());
        assert!(parse_pages("0-4").is_err());
        assert!(parse_pages("2-x").is_err());
    }

    #[test]
    fn separator_keeps_custom_case() {
        assert!(matches!(parse_separator("HR"), PageSeparator::HorizontalRule));
        match parse_separator("*** Page ***") {
            PageSeparator::Custom(s) => assert_eq!(s, "*** Page ***"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn text_is_written_without_trailing_newline() {
        let mut buf = Vec::new();
        write_text(&mut buf, "no newline").unwrap();
        assert_eq!(buf, b"no newline");

        let mut buf = Vec::new();
        write_text(&mut buf, "para\n\n").unwrap();
        assert_eq!(buf, b"para\n\n");
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["wenku", "abc"]);
        assert_eq!(cli.mode, ModeArg::Text);
        assert_eq!(cli.concurrency, 1);
        assert_eq!(cli.out_dir, PathBuf::from("."));
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.base_url, wenku_extract::config::DEFAULT_BASE_URL);
    }
}
