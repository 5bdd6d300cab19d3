//! # greenbook-extract
//!
//! Extract a question/answer dataset from a scanned probability textbook
//! chapter.
//!
//! ## Why this crate?
//!
//! Generic PDF-to-text tools flatten the page into a character dump: reading
//! order breaks around two-column hint sections, subscripts lose their
//! meaning, and figure references point at nothing. This crate rebuilds the
//! text from positioned glyphs, so baselines, word gaps, and subscripts
//! survive, then applies the book's own typographic conventions (the
//! `Solution:` delimiter, numbered hints, `Figure X.Y` captions) to produce
//! structured question records with linked hints and figure crops.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Glyphs   rebuild reading order from positioned characters
//!  │              (pdfium, CPU-bound, spawn_blocking)
//!  ├─ 3. Cleanup  strip page furniture, harvest numbered hints
//!  ├─ 4. Figures  crop the region above each `Figure X.Y` caption → PNG
//!  ├─ 5. LaTeX    rewrite plain-text math into inline LaTeX
//!  └─ 6. Segment  split on `Solution:`, attach hints and figure links
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use greenbook_extract::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let output = extract("resources/greenbook.pdf", &config).await?;
//!     for q in &output.questions {
//!         println!("{}: {}", q.id, q.title);
//!     }
//!     eprintln!("{} hints, {} figures",
//!         output.stats.hints_extracted,
//!         output.stats.figures_extracted);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `greenbook-extract` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! greenbook-extract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, PageRange};
pub use error::ExtractError;
pub use extract::{extract, extract_sync, extract_to_file};
pub use output::{
    ExtractionOutput, ExtractionStats, PageText, QuestionRecord, UNRESOLVED_SOLUTION,
};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
