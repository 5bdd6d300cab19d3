//! Error types for the greenbook-extract library.
//!
//! Only *fatal* conditions are represented here: problems that prevent the
//! extraction run from producing any dataset at all (missing input, corrupt
//! PDF, unwritable output). Everything else in this pipeline is deliberately
//! best-effort:
//!
//! * A figure anchor whose crop cannot be rendered or saved is logged with
//!   `tracing::warn!` and simply omitted from the figure map.
//! * A heuristic that finds no match (hint scan, title split, figure
//!   reference lookup, math rewrite) produces no effect and is
//!   indistinguishable from "correctly absent" at runtime.
//!
//! No step is retried; the run either completes or aborts on one of the
//! variants below.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the greenbook-extract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source PDF was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The configured page range selects no pages in this document.
    #[error("Page range {start}..={end} selects no pages (document has {total} pages)")]
    EmptyPageRange {
        start: usize,
        end: usize,
        total: usize,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output dataset file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create the figure image directory.
    #[error("Failed to create image directory '{path}': {source}")]
    ImageDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_range_display() {
        let e = ExtractError::EmptyPageRange {
            start: 74,
            end: 119,
            total: 60,
        };
        let msg = e.to_string();
        assert!(msg.contains("74..=119"), "got: {msg}");
        assert!(msg.contains("60 pages"), "got: {msg}");
    }

    #[test]
    fn file_not_found_display() {
        let e = ExtractError::FileNotFound {
            path: PathBuf::from("resources/greenbook.pdf"),
        };
        assert!(e.to_string().contains("greenbook.pdf"));
    }

    #[test]
    fn not_a_pdf_display() {
        let e = ExtractError::NotAPdf {
            path: PathBuf::from("notes.txt"),
            magic: *b"Hell",
        };
        assert!(e.to_string().contains("notes.txt"));
    }
}
