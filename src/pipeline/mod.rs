//! Pipeline stages for PDF-to-dataset extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes every heuristic independently testable on synthetic input
//! without a PDF in sight.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ glyphs ──▶ cleanup ──▶ segment ──▶ records
//! (URL/path) (pdfium)  (hints)    (questions)
//!                └──▶ figures ──────┘
//!                     (crops)
//! ```
//!
//! 1. [`input`]   — canonicalise the user-supplied path or URL to a local
//!    file
//! 2. [`glyphs`]  — collect positioned characters from a page and rebuild
//!    reading order, word gaps, and subscript markers; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 3. [`cleanup`] — strip page furniture and harvest the numbered hint
//!    blocks from each page's text
//! 4. [`figures`] — locate `Figure X.Y` caption anchors, crop the region
//!    above each one, and save it as a PNG
//! 5. [`latex`]   — rewrite plain-text math notation into inline LaTeX
//! 6. [`segment`] — split the chapter stream into question records and
//!    attach hints and figure links

pub mod cleanup;
pub mod figures;
pub mod glyphs;
pub mod input;
pub mod latex;
pub mod segment;
