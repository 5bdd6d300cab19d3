//! Configuration types for an extraction run.
//!
//! All behaviour is controlled through [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across threads and to diff two runs to
//! understand why their outputs differ.
//!
//! The defaults reproduce the original extraction of the probability chapter
//! of the "green book": PDF pages 74–119, figure page range identical, images
//! under `public/images` referenced as `/images/...`.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// An inclusive, 0-indexed page range within the PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    /// First page, 0-indexed.
    pub start: usize,
    /// Last page, 0-indexed, inclusive.
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Expand to the list of page indices that actually exist in a document
    /// with `total_pages` pages. May be empty if the range lies past the end.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        if total_pages == 0 || self.start >= total_pages {
            return Vec::new();
        }
        (self.start..=self.end.min(total_pages - 1)).collect()
    }
}

/// Configuration for a PDF-to-dataset extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use greenbook_extract::{ExtractionConfig, PageRange};
///
/// let config = ExtractionConfig::builder()
///     .pages(PageRange::new(74, 119))
///     .image_dir("public/images")
///     .chapter_label("Probability")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Page range processed for text (reading order, hints, questions).
    /// Default: 74..=119, the probability chapter.
    pub pages: PageRange,

    /// Page range scanned for figure anchors. Defaults to `pages`. The two
    /// ranges may differ: figures occasionally sit on pages whose text is
    /// not wanted.
    pub figure_pages: Option<PageRange>,

    /// Directory figure crops are written to. Created if missing.
    /// Default: `public/images`.
    pub image_dir: PathBuf,

    /// Public URL prefix the dataset uses to reference saved crops.
    /// Default: `/images`.
    pub image_url_prefix: String,

    /// Rendering DPI for figure crops. Range: 72–600. Default: 300.
    ///
    /// pdfium renders the full page at this resolution before the crop is
    /// taken, so very high values cost memory on large pages.
    pub figure_dpi: u32,

    /// Chapter label stamped on every record. Default: `Probability`.
    pub chapter_label: String,

    /// Record id prefix; records are numbered `{prefix}_1`, `{prefix}_2`, …
    /// Default: `prob`.
    pub id_prefix: String,

    /// Phrase that marks the first question's title in the text stream,
    /// matched case-insensitively. The segmenter cannot bootstrap without it
    /// because the first question is not preceded by a `Solution:` delimiter.
    /// Default: `Coin toss game`.
    pub first_question_anchor: String,

    /// Running header/footer titles removed from every page verbatim.
    pub running_titles: Vec<String>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback, driven per page and per figure.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pages: PageRange::new(74, 119),
            figure_pages: None,
            image_dir: PathBuf::from("public/images"),
            image_url_prefix: "/images".to_string(),
            figure_dpi: 300,
            chapter_label: "Probability".to_string(),
            id_prefix: "prob".to_string(),
            first_question_anchor: "Coin toss game".to_string(),
            running_titles: vec![
                "A Practical Guide To Quantitative Finance Interviews".to_string(),
                "Probability Theory".to_string(),
            ],
            password: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("pages", &self.pages)
            .field("figure_pages", &self.figure_pages)
            .field("image_dir", &self.image_dir)
            .field("image_url_prefix", &self.image_url_prefix)
            .field("figure_dpi", &self.figure_dpi)
            .field("chapter_label", &self.chapter_label)
            .field("id_prefix", &self.id_prefix)
            .field("first_question_anchor", &self.first_question_anchor)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
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

    /// The figure page range, falling back to the text page range.
    pub fn effective_figure_pages(&self) -> PageRange {
        self.figure_pages.unwrap_or(self.pages)
    }

    /// Scale factor applied when rendering pages for figure crops
    /// (PDF points are 72 per inch).
    pub fn render_scale(&self) -> f32 {
        self.figure_dpi as f32 / 72.0
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn pages(mut self, range: PageRange) -> Self {
        self.config.pages = range;
        self
    }

    pub fn figure_pages(mut self, range: PageRange) -> Self {
        self.config.figure_pages = Some(range);
        self
    }

    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.image_dir = dir.into();
        self
    }

    pub fn image_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.image_url_prefix = prefix.into();
        self
    }

    pub fn figure_dpi(mut self, dpi: u32) -> Self {
        self.config.figure_dpi = dpi.clamp(72, 600);
        self
    }

    pub fn chapter_label(mut self, label: impl Into<String>) -> Self {
        self.config.chapter_label = label.into();
        self
    }

    pub fn id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.id_prefix = prefix.into();
        self
    }

    pub fn first_question_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.config.first_question_anchor = anchor.into();
        self
    }

    pub fn running_titles(mut self, titles: Vec<String>) -> Self {
        self.config.running_titles = titles;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.pages.start > c.pages.end {
            return Err(ExtractError::InvalidConfig(format!(
                "Page range start {} is after end {}",
                c.pages.start, c.pages.end
            )));
        }
        if let Some(fp) = c.figure_pages {
            if fp.start > fp.end {
                return Err(ExtractError::InvalidConfig(format!(
                    "Figure page range start {} is after end {}",
                    fp.start, fp.end
                )));
            }
        }
        if c.first_question_anchor.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "First-question anchor phrase must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_range_clamps_to_document() {
        assert_eq!(PageRange::new(2, 4).to_indices(10), vec![2, 3, 4]);
        assert_eq!(PageRange::new(8, 20).to_indices(10), vec![8, 9]);
        assert_eq!(PageRange::new(10, 20).to_indices(10), Vec::<usize>::new());
        assert_eq!(PageRange::new(0, 0).to_indices(0), Vec::<usize>::new());
    }

    #[test]
    fn figure_pages_fall_back_to_text_pages() {
        let config = ExtractionConfig::default();
        assert_eq!(config.effective_figure_pages(), config.pages);

        let config = ExtractionConfig::builder()
            .figure_pages(PageRange::new(74, 90))
            .build()
            .unwrap();
        assert_eq!(config.effective_figure_pages(), PageRange::new(74, 90));
    }

    #[test]
    fn builder_rejects_inverted_range() {
        let err = ExtractionConfig::builder()
            .pages(PageRange::new(100, 50))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn builder_rejects_empty_anchor() {
        assert!(ExtractionConfig::builder()
            .first_question_anchor("  ")
            .build()
            .is_err());
    }

    #[test]
    fn dpi_is_clamped() {
        let config = ExtractionConfig::builder().figure_dpi(10_000).build().unwrap();
        assert_eq!(config.figure_dpi, 600);
        assert!((config.render_scale() - 600.0 / 72.0).abs() < 1e-6);
    }
}
