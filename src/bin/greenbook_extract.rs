//! CLI binary for greenbook-extract.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints the question dataset as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use greenbook_extract::{
    extract, extract_to_file, ExtractionConfig, ExtractionProgressCallback, PageRange,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live page bar plus one log line per saved
/// figure crop.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of figure crops that failed to save.
    figure_errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set by `on_run_start`
    /// once the page count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            figure_errors: AtomicUsize::new(0),
        })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_pages: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Scanning {total_pages} pages…"))
        ));
    }

    fn on_page_complete(&self, page_index: usize, _total: usize, chars: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}  {}",
            green("✓"),
            page_index,
            dim(&format!("{chars:>5} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_figure_saved(&self, label: &str, path: &str) {
        self.bar.println(format!(
            "  {} {:<12}  {}",
            green("✓"),
            label,
            dim(path),
        ));
    }

    fn on_figure_error(&self, label: &str, error: &str) {
        self.figure_errors.fetch_add(1, Ordering::SeqCst);
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {:<12}  {}", red("✗"), label, red(&msg)));
    }

    fn on_run_complete(&self, questions: usize, hints: usize) {
        self.bar.finish_and_clear();
        let failed = self.figure_errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {} questions extracted ({} with hints available)",
                green("✔"),
                bold(&questions.to_string()),
                hints
            );
        } else {
            eprintln!(
                "{} {} questions extracted, {} figure crops failed",
                cyan("⚠"),
                bold(&questions.to_string()),
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract the default chapter (stdout)
  greenbook-extract resources/greenbook.pdf

  # Write the dataset to a file
  greenbook-extract resources/greenbook.pdf -o src/data/questions.json

  # Different page range, images elsewhere
  greenbook-extract --pages 74-119 --image-dir public/images book.pdf

  # Extract from a URL
  greenbook-extract https://example.com/greenbook.pdf -o questions.json

  # Another chapter with its own labels
  greenbook-extract --pages 120-150 --chapter Calculus --id-prefix calc \
      --anchor "Limits of a function" book.pdf

PAGE NUMBERS:
  --pages and --figure-pages take 0-indexed PDF page indices as an inclusive
  range, e.g. 74-119. These are positions in the PDF file, not the page
  numbers printed on the book's pages.

ENVIRONMENT VARIABLES:
  PDFIUM_DYNAMIC_LIB_PATH   Directory containing libpdfium
  RUST_LOG                  Tracing filter, overrides -v/-q
"#;

/// Extract a question/answer dataset from a scanned textbook chapter.
#[derive(Parser, Debug)]
#[command(
    name = "greenbook-extract",
    version,
    about = "Extract a question dataset from a textbook PDF",
    long_about = "Extract structured question records (title, problem text, hint, figure link) \
from a textbook chapter PDF. Text is rebuilt from positioned glyphs, math notation is rewritten \
as inline LaTeX, numbered hints are resolved, and figure regions are cropped to PNG files.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write the question array to this JSON file instead of stdout.
    #[arg(short, long, env = "GREENBOOK_OUTPUT")]
    output: Option<PathBuf>,

    /// Page range to read text from, 0-indexed inclusive (e.g. 74-119).
    #[arg(long, env = "GREENBOOK_PAGES", default_value = "74-119")]
    pages: String,

    /// Page range to scan for figures; defaults to --pages.
    #[arg(long, env = "GREENBOOK_FIGURE_PAGES")]
    figure_pages: Option<String>,

    /// Directory figure crops are written to.
    #[arg(long, env = "GREENBOOK_IMAGE_DIR", default_value = "public/images")]
    image_dir: PathBuf,

    /// URL prefix the dataset uses to reference saved crops.
    #[arg(long, env = "GREENBOOK_IMAGE_URL_PREFIX", default_value = "/images")]
    image_url_prefix: String,

    /// Figure rendering DPI (72–600).
    #[arg(long, env = "GREENBOOK_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Chapter label stamped on every record.
    #[arg(long, env = "GREENBOOK_CHAPTER", default_value = "Probability")]
    chapter: String,

    /// Record id prefix (records become prefix_1, prefix_2, …).
    #[arg(long, env = "GREENBOOK_ID_PREFIX", default_value = "prob")]
    id_prefix: String,

    /// Phrase marking the first question's title, matched case-insensitively.
    #[arg(long, env = "GREENBOOK_ANCHOR", default_value = "Coin toss game")]
    anchor: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "GREENBOOK_PASSWORD")]
    password: Option<String>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "GREENBOOK_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable the progress bar.
    #[arg(long, env = "GREENBOOK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "GREENBOOK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "GREENBOOK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs are suppressed while the progress bar is active;
    // the bar already prints per-page and per-figure lines.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = extract_to_file(&cli.input, output_path, &config)
            .await
            .context("Extraction failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} questions  {} figures  {}ms  →  {}",
                green("✔"),
                stats.questions_extracted,
                stats.figures_extracted,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let output = extract(&cli.input, &config)
            .await
            .context("Extraction failed")?;

        let json = serde_json::to_string_pretty(&output.questions)
            .context("Failed to serialise questions")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();

        if !cli.quiet && !show_progress {
            eprintln!(
                "Extracted {} questions from {} pages in {}ms",
                output.stats.questions_extracted,
                output.stats.pages_processed,
                output.stats.total_duration_ms
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let pages = parse_range(&cli.pages).context("Invalid --pages")?;

    let mut builder = ExtractionConfig::builder()
        .pages(pages)
        .image_dir(cli.image_dir.clone())
        .image_url_prefix(cli.image_url_prefix.clone())
        .figure_dpi(cli.dpi)
        .chapter_label(cli.chapter.clone())
        .id_prefix(cli.id_prefix.clone())
        .first_question_anchor(cli.anchor.clone())
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref s) = cli.figure_pages {
        builder = builder.figure_pages(parse_range(s).context("Invalid --figure-pages")?);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse "74-119" (or a single "74") into an inclusive 0-indexed range.
fn parse_range(s: &str) -> Result<PageRange> {
    let s = s.trim();
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start.trim().parse().context("Invalid start page")?;
        let end: usize = end.trim().parse().context("Invalid end page")?;
        if start > end {
            anyhow::bail!("Invalid page range '{start}-{end}': start must be <= end");
        }
        return Ok(PageRange::new(start, end));
    }
    let page: usize = s.parse().context("Invalid page number")?;
    Ok(PageRange::new(page, page))
}
