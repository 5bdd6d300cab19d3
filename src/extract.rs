//! Full-chapter extraction entry points.
//!
//! [`extract`] runs the whole pipeline: resolve the input, open the PDF,
//! save figure crops, rebuild each page's text, harvest hints, and segment
//! the result into question records. All pdfium work happens inside one
//! `tokio::task::spawn_blocking` call because pdfium is CPU-bound and not
//! async-safe; segmentation runs afterwards on the async task, it is pure
//! string work.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{ExtractionOutput, ExtractionStats, PageText};
use crate::pipeline::figures::FigureMap;
use crate::pipeline::{cleanup, figures, glyphs, input, segment};
use pdfium_render::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything the blocking pdfium pass produces.
struct PdfPassOutput {
    pages: Vec<PageText>,
    hints: HashMap<String, String>,
    figures: FigureMap,
    figure_duration_ms: u64,
    text_duration_ms: u64,
}

/// Extract the question dataset from a PDF file or URL.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input` — Local file path or HTTP/HTTPS URL to a PDF
/// * `config` — Extraction configuration
///
/// # Errors
/// Returns `Err(ExtractError)` only for fatal errors: missing or corrupt
/// input, an empty page range, an unwritable image directory. A figure
/// whose crop fails is logged and omitted; a question whose solution
/// boundary is never found keeps its placeholder.
pub async fn extract(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting extraction: {}", input);

    let resolved = input::resolve_input(input, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();

    let blocking_config = config.clone();
    let pass = tokio::task::spawn_blocking(move || run_pdf_pass(&pdf_path, &blocking_config))
        .await
        .map_err(|e| ExtractError::Internal(format!("Extraction task panicked: {}", e)))??;

    let questions = segment::segment_questions(&pass.pages, &pass.hints, &pass.figures, config);

    let stats = ExtractionStats {
        pages_processed: pass.pages.len(),
        hints_extracted: pass.hints.len(),
        figures_extracted: pass.figures.len(),
        questions_extracted: questions.len(),
        figure_duration_ms: pass.figure_duration_ms,
        text_duration_ms: pass.text_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} questions, {} hints, {} figures, {}ms total",
        stats.questions_extracted,
        stats.hints_extracted,
        stats.figures_extracted,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(stats.questions_extracted, stats.hints_extracted);
    }

    Ok(ExtractionOutput { questions, stats })
}

/// Extract and write the question dataset to a JSON file.
///
/// The output is the pretty-printed question array, written atomically
/// (temp file + rename) so a crash never leaves a truncated dataset behind.
pub async fn extract_to_file(
    input: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    let output = extract(input, config).await?;
    let path = output_path.as_ref();

    let json = serde_json::to_string_pretty(&output.questions)
        .map_err(|e| ExtractError::Internal(format!("JSON serialisation failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ExtractError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("Wrote {} questions to {}", output.questions.len(), path.display());
    Ok(output.stats)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input, config))
}

/// Blocking pdfium pass: open the document, save figure crops, then walk
/// the text page range rebuilding each page's reading order and harvesting
/// its hints.
fn run_pdf_pass(pdf_path: &Path, config: &ExtractionConfig) -> Result<PdfPassOutput, ExtractError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, config.password.as_deref())
        .map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if config.password.is_some() {
                    ExtractError::WrongPassword {
                        path: pdf_path.to_path_buf(),
                    }
                } else {
                    ExtractError::PasswordRequired {
                        path: pdf_path.to_path_buf(),
                    }
                }
            } else {
                ExtractError::CorruptPdf {
                    path: pdf_path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        return Err(ExtractError::EmptyPageRange {
            start: config.pages.start,
            end: config.pages.end,
            total: total_pages,
        });
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(page_indices.len());
    }

    let figure_start = Instant::now();
    let figure_map = figures::locate_and_save_figures(&document, config)?;
    let figure_duration_ms = figure_start.elapsed().as_millis() as u64;

    let text_start = Instant::now();
    let mut page_texts = Vec::with_capacity(page_indices.len());
    let mut hints: HashMap<String, String> = HashMap::new();

    for &idx in &page_indices {
        let page = match pages.get(idx as u16) {
            Ok(p) => p,
            Err(e) => {
                warn!("Skipping unreadable page {}: {:?}", idx, e);
                continue;
            }
        };

        let raw = glyphs::normalize(glyphs::collect_glyphs(&page));
        let (text, page_hints) = cleanup::clean_page(&raw, &config.running_titles);
        debug!(
            "Page {}: {} chars, {} hints",
            idx,
            text.len(),
            page_hints.len()
        );

        // A hint id recurring on a later page overwrites the earlier body.
        for (id, body) in page_hints {
            hints.insert(id, body);
        }

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(idx, page_indices.len(), text.len());
        }
        page_texts.push(PageText {
            page_index: idx,
            text,
        });
    }
    let text_duration_ms = text_start.elapsed().as_millis() as u64;

    Ok(PdfPassOutput {
        pages: page_texts,
        hints,
        figures: figure_map,
        figure_duration_ms,
        text_duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;

    #[tokio::test]
    async fn missing_input_is_fatal() {
        let config = ExtractionConfig::default();
        let err = extract("/no/such/file.pdf", &config).await.unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn extract_to_file_propagates_input_errors() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("questions.json");
        let config = ExtractionConfig::default();
        let err = extract_to_file("/no/such/file.pdf", &out, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
        assert!(!out.exists());
    }
}
