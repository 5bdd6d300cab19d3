//! Figure anchor location, cropping, and persistence.
//!
//! The book has no embedded image objects worth trusting; figures are drawn
//! inline above their captions. The reliable signal is the caption text
//! itself: a line containing `Figure <chapter>.<section>` (optionally with a
//! letter suffix, e.g. `Figure 4.2A`). Each anchor's bounding box, taken
//! from the glyphs that spell the caption, seeds a crop region: a block of
//! page above the caption plus a small margin below it.
//!
//! The padding is a page-independent heuristic with named overrides for
//! figures whose layout is known to be irregular (4.1–4.6 sit closer to
//! their captions; 4.8 is tall and has text crowding its caption). Anchors
//! near the very top of a page are caption-like text in running headers and
//! are skipped.
//!
//! A failure to render or save one crop is logged and skipped; it never
//! aborts the run.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::pipeline::glyphs::{collect_glyphs, Glyph};
use image::DynamicImage;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Anchor label → public image URL, built in page order.
///
/// A recurring label overwrites the earlier entry (last page wins). This is
/// an accepted lossy simplification; labels are expected to be unique in
/// the source document.
pub type FigureMap = BTreeMap<String, String>;

/// Caption anchor: `Figure 4.7`, `Figure 4.2A`.
static RE_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"Figure\s+\d+\.\d+[A-Za-z]?").unwrap());

/// Crop region above the anchor's top edge, in page points.
const DEFAULT_TOP_PADDING: f32 = 400.0;
/// Crop region below the anchor's bottom edge.
const DEFAULT_BOTTOM_PADDING: f32 = 50.0;
/// Horizontal inset from each page edge.
const HORIZONTAL_INSET: f32 = 50.0;
/// Anchors above this y position sit in the page header; skip them.
const HEADER_EXCLUSION: f32 = 50.0;

/// Labels in this group sit closer to their figures; less padding above.
const REDUCED_TOP_GROUP: [&str; 5] = ["4.1", "4.2", "4.3", "4.5", "4.6"];

/// Vertical padding (above, below) for a given anchor label.
///
/// `4.2` also catches `4.2A`; the `4.8` override wins over the group.
pub fn padding_for(label: &str) -> (f32, f32) {
    let mut top = DEFAULT_TOP_PADDING;
    let mut bottom = DEFAULT_BOTTOM_PADDING;
    if REDUCED_TOP_GROUP.iter().any(|id| label.contains(id)) {
        top = 250.0;
    }
    if label.contains("4.8") {
        top = 550.0;
        bottom = 10.0;
    }
    (top, bottom)
}

/// Filesystem-safe image file name for an anchor label:
/// `Figure 4.7` → `figure_4_7.png`.
pub fn safe_file_name(label: &str) -> String {
    format!("{}.png", label.to_lowercase().replace([' ', '.'], "_"))
}

/// A caption anchor located on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// The matched label text, e.g. `Figure 4.7`.
    pub label: String,
    /// Top edge of the caption glyphs (y-down page points).
    pub top: f32,
    /// Bottom edge of the caption glyphs.
    pub bottom: f32,
}

/// Find caption anchors in a page's glyph set.
///
/// Glyphs are grouped into lines the same way the normaliser does (sorted by
/// rounded top then left, new line when the vertical gap exceeds 5 pt), each
/// line's text is assembled with word gaps as spaces, and the anchor regex
/// runs per line. The anchor's bounding box is the union of the matched
/// glyph boxes.
pub fn find_anchors(glyphs: &[Glyph]) -> Vec<Anchor> {
    let mut sorted: Vec<&Glyph> = glyphs.iter().collect();
    sorted.sort_by(|a, b| {
        let ka = (a.top / 10.0).round() as i64;
        let kb = (b.top / 10.0).round() as i64;
        ka.cmp(&kb).then_with(|| {
            a.left
                .partial_cmp(&b.left)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    // One assembled line: text plus the byte offset of each glyph's char.
    let mut lines: Vec<(String, Vec<(usize, &Glyph)>)> = Vec::new();
    let mut current: (String, Vec<(usize, &Glyph)>) = (String::new(), Vec::new());
    let mut prev: Option<&Glyph> = None;

    for glyph in sorted {
        if let Some(last) = prev {
            if glyph.top - last.top > 5.0 {
                lines.push(std::mem::take(&mut current));
            } else if glyph.left > last.right + 2.0 {
                current.0.push(' ');
            }
        }
        current.1.push((current.0.len(), glyph));
        current.0.push(glyph.text);
        prev = Some(glyph);
    }
    if !current.1.is_empty() {
        lines.push(current);
    }

    let mut anchors = Vec::new();
    for (text, spans) in &lines {
        for m in RE_ANCHOR.find_iter(text) {
            let matched: Vec<&Glyph> = spans
                .iter()
                .filter(|(offset, _)| m.range().contains(offset))
                .map(|(_, g)| *g)
                .collect();
            if matched.is_empty() {
                continue;
            }
            let top = matched.iter().map(|g| g.top).fold(f32::INFINITY, f32::min);
            let bottom = matched
                .iter()
                .map(|g| g.bottom)
                .fold(f32::NEG_INFINITY, f32::max);
            anchors.push(Anchor {
                label: m.as_str().to_string(),
                top,
                bottom,
            });
        }
    }
    anchors
}

/// Scan the configured figure page range, crop each anchored region, save it
/// as a PNG under the image directory, and return the anchor → URL map.
///
/// Per-anchor render or save failures are logged and skipped.
pub fn locate_and_save_figures(
    document: &PdfDocument,
    config: &ExtractionConfig,
) -> Result<FigureMap, ExtractError> {
    std::fs::create_dir_all(&config.image_dir).map_err(|e| ExtractError::ImageDirFailed {
        path: config.image_dir.clone(),
        source: e,
    })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    let indices = config.effective_figure_pages().to_indices(total_pages);
    let scale = config.render_scale();
    let mut map = FigureMap::new();

    for idx in indices {
        let page = match pages.get(idx as u16) {
            Ok(p) => p,
            Err(e) => {
                warn!("Skipping page {} in figure scan: {:?}", idx, e);
                continue;
            }
        };

        let page_width = page.width().value;
        let page_height = page.height().value;
        let anchors = find_anchors(&collect_glyphs(&page));
        if anchors.is_empty() {
            continue;
        }

        // Render the page once; all crops on it share the bitmap.
        let rendered = match render_page(&page, scale) {
            Ok(img) => img,
            Err(e) => {
                warn!("Failed to render page {} for figures: {}", idx, e);
                continue;
            }
        };

        for anchor in anchors {
            if anchor.top < HEADER_EXCLUSION {
                debug!("Skipping header-area anchor '{}' on page {}", anchor.label, idx);
                continue;
            }

            let (top_padding, bottom_padding) = padding_for(&anchor.label);
            let crop_top = (anchor.top - top_padding).max(0.0);
            let crop_bottom = (anchor.bottom + bottom_padding).min(page_height);

            let file_name = safe_file_name(&anchor.label);
            let file_path = config.image_dir.join(&file_name);
            let crop = crop_region(
                &rendered,
                scale,
                HORIZONTAL_INSET,
                crop_top,
                page_width - HORIZONTAL_INSET,
                crop_bottom,
            );

            match crop.save(&file_path) {
                Ok(()) => {
                    let url = format!("{}/{}", config.image_url_prefix, file_name);
                    info!(
                        "Saved {} to {} (top padding {}, bottom padding {})",
                        anchor.label, file_name, top_padding, bottom_padding
                    );
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_figure_saved(&anchor.label, &url);
                    }
                    map.insert(anchor.label, url);
                }
                Err(e) => {
                    warn!(
                        "Failed to save crop for '{}' on page {}: {}",
                        anchor.label, idx, e
                    );
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_figure_error(&anchor.label, &e.to_string());
                    }
                }
            }
        }
    }

    info!("Figure scan complete: {} crops saved", map.len());
    Ok(map)
}

/// Rasterise a full page at the given scale factor.
fn render_page(page: &PdfPage, scale: f32) -> Result<DynamicImage, String> {
    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
    page.render_with_config(&render_config)
        .map(|bitmap| bitmap.as_image())
        .map_err(|e| format!("{:?}", e))
}

/// Crop a page-point rectangle out of a rendered page image, clamped to the
/// image bounds.
fn crop_region(
    image: &DynamicImage,
    scale: f32,
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
) -> DynamicImage {
    let (img_w, img_h) = (image.width(), image.height());
    let x = ((left * scale) as u32).min(img_w.saturating_sub(1));
    let y = ((top * scale) as u32).min(img_h.saturating_sub(1));
    let w = (((right - left) * scale) as u32).max(1).min(img_w - x);
    let h = (((bottom - top) * scale) as u32).max(1).min(img_h - y);
    image.crop_imm(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(text: char, left: f32, top: f32) -> Glyph {
        Glyph {
            text,
            left,
            right: left + 5.0,
            top,
            bottom: top + 10.0,
            height: 10.0,
            font_size: 10.0,
        }
    }

    /// Lay out a caption string as glyphs; spaces become word gaps.
    fn caption(text: &str, top: f32) -> Vec<Glyph> {
        let mut glyphs = Vec::new();
        let mut x = 0.0;
        for c in text.chars() {
            if c == ' ' {
                x += 10.0;
            } else {
                glyphs.push(g(c, x, top));
                x += 6.0;
            }
        }
        glyphs
    }

    #[test]
    fn default_padding() {
        assert_eq!(padding_for("Figure 5.1"), (400.0, 50.0));
    }

    #[test]
    fn figure_4_8_always_gets_override_padding() {
        assert_eq!(padding_for("Figure 4.8"), (550.0, 10.0));
    }

    #[test]
    fn figure_4_2a_falls_into_reduced_top_group() {
        assert_eq!(padding_for("Figure 4.2A"), (250.0, 50.0));
        assert_eq!(padding_for("Figure 4.2"), (250.0, 50.0));
        assert_eq!(padding_for("Figure 4.5"), (250.0, 50.0));
    }

    #[test]
    fn safe_file_names() {
        assert_eq!(safe_file_name("Figure 4.7"), "figure_4_7.png");
        assert_eq!(safe_file_name("Figure 4.2A"), "figure_4_2a.png");
    }

    #[test]
    fn anchor_found_in_glyph_line() {
        let glyphs = caption("Figure 4.7 Distribution of outcomes", 300.0);
        let anchors = find_anchors(&glyphs);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].label, "Figure 4.7");
        assert!((anchors[0].top - 300.0).abs() < 1e-6);
        assert!((anchors[0].bottom - 310.0).abs() < 1e-6);
    }

    #[test]
    fn anchor_with_letter_suffix() {
        let glyphs = caption("Figure 4.2A", 200.0);
        let anchors = find_anchors(&glyphs);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].label, "Figure 4.2A");
    }

    #[test]
    fn unrelated_text_yields_no_anchors() {
        let glyphs = caption("Consider the figure below", 200.0);
        assert!(find_anchors(&glyphs).is_empty());
    }

    #[test]
    fn anchors_on_separate_lines_are_both_found() {
        let mut glyphs = caption("Figure 4.1", 200.0);
        glyphs.extend(caption("Figure 4.3", 500.0));
        let labels: Vec<String> = find_anchors(&glyphs).into_iter().map(|a| a.label).collect();
        assert_eq!(labels, vec!["Figure 4.1", "Figure 4.3"]);
    }

    #[test]
    fn duplicate_labels_overwrite_in_page_order() {
        // Later page's entry wins for a recurring label.
        let mut map = FigureMap::new();
        map.insert("Figure 4.4".to_string(), "/images/figure_4_4_p80.png".to_string());
        map.insert("Figure 4.4".to_string(), "/images/figure_4_4_p85.png".to_string());
        assert_eq!(map.len(), 1);
        assert_eq!(map["Figure 4.4"], "/images/figure_4_4_p85.png");
    }

    #[test]
    fn crop_region_is_clamped_to_image() {
        let image = DynamicImage::new_rgb8(100, 100);
        let crop = crop_region(&image, 1.0, 50.0, 90.0, 200.0, 300.0);
        assert!(crop.width() <= 50);
        assert!(crop.height() <= 10);
    }
}
