//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline works through the page range. The trait is
//! `Send + Sync` because the pipeline runs inside `spawn_blocking`; all
//! methods have default no-op implementations so callers only override what
//! they care about.

use std::sync::Arc;

/// Called by the extraction pipeline as it processes pages and figures.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before any page is read, with the number of pages in the
    /// text range.
    fn on_run_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page's text has been normalised and cleaned.
    ///
    /// `page_index` is 0-indexed within the PDF; `chars` is the length of the
    /// cleaned text.
    fn on_page_complete(&self, page_index: usize, total_pages: usize, chars: usize) {
        let _ = (page_index, total_pages, chars);
    }

    /// Called when a figure crop has been saved.
    fn on_figure_saved(&self, label: &str, path: &str) {
        let _ = (label, path);
    }

    /// Called when a figure anchor could not be rendered or persisted.
    /// The run continues without that entry.
    fn on_figure_error(&self, label: &str, error: &str) {
        let _ = (label, error);
    }

    /// Called once after segmentation, with the final record and hint counts.
    fn on_run_complete(&self, questions: usize, hints: usize) {
        let _ = (questions, hints);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tracking {
        pages: AtomicUsize,
        figures: AtomicUsize,
    }

    impl ExtractionProgressCallback for Tracking {
        fn on_page_complete(&self, _page: usize, _total: usize, _chars: usize) {
            self.pages.fetch_add(1, Ordering::SeqCst);
        }
        fn on_figure_saved(&self, _label: &str, _path: &str) {
            self.figures.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(46);
        cb.on_page_complete(74, 46, 1200);
        cb.on_figure_saved("Figure 4.7", "/images/figure_4_7.png");
        cb.on_figure_error("Figure 4.9", "render failed");
        cb.on_run_complete(30, 12);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let cb = Tracking {
            pages: AtomicUsize::new(0),
            figures: AtomicUsize::new(0),
        };
        cb.on_page_complete(74, 2, 100);
        cb.on_page_complete(75, 2, 200);
        cb.on_figure_saved("Figure 4.1", "/images/figure_4_1.png");
        assert_eq!(cb.pages.load(Ordering::SeqCst), 2);
        assert_eq!(cb.figures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ExtractionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_run_start(10);
        cb.on_run_complete(5, 3);
    }
}
