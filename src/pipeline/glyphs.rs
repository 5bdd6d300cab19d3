//! Glyph collection and reading-order text reconstruction.
//!
//! pdfium hands back one positioned character at a time with no guaranteed
//! ordering, so the page text has to be rebuilt from geometry. The approach:
//! sort glyphs by a coarsely rounded vertical position (sub-pixel baseline
//! jitter would otherwise interleave characters from the same line), then by
//! horizontal position, and walk the sorted sequence once, inferring line
//! breaks, paragraph breaks, inter-word spaces, and subscripts from the gaps
//! between consecutive glyphs.
//!
//! Subscripts matter here because the book writes probability notation like
//! `p_1` with a genuinely lowered glyph; flattening it would destroy the
//! math translation downstream. A subscript is marked by prefixing the glyph
//! with [`SUBSCRIPT_MARKER`], which the math translator later rewrites into
//! `$x_{1}$` form.
//!
//! All coordinates are y-down page points: `top` grows toward the bottom of
//! the page, matching how the crop heuristics in the figure stage think.
//! pdfium's native y-up rectangles are flipped at collection time.

use pdfium_render::prelude::*;

/// Marker inserted before a glyph detected as a subscript.
pub const SUBSCRIPT_MARKER: char = '_';

/// Vertical gap (points) between consecutive glyphs that starts a new line.
const LINE_BREAK_GAP: f32 = 5.0;

/// A line gap larger than this multiple of the previous glyph's height is a
/// paragraph break.
const PARAGRAPH_GAP_FACTOR: f32 = 1.5;

/// Horizontal gap (points) that separates two words. Tuned so that
/// single-character function notation like `P(E)` is not merged or split.
const WORD_GAP: f32 = 2.0;

/// A glyph whose vertical midpoint sits more than this far below its
/// predecessor's (at equal or smaller font size) is a subscript.
const SUBSCRIPT_DROP: f32 = 2.0;

/// One rendered character on a page, in y-down page points.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// The character itself.
    pub text: char,
    /// Left edge.
    pub left: f32,
    /// Right edge.
    pub right: f32,
    /// Top edge (distance from the top of the page).
    pub top: f32,
    /// Bottom edge.
    pub bottom: f32,
    /// Glyph box height.
    pub height: f32,
    /// Font size in points.
    pub font_size: f32,
}

impl Glyph {
    fn midpoint(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

/// Collect all glyphs on a page, flipping pdfium's y-up rectangles into the
/// y-down space the rest of the pipeline uses. Pages without a text layer
/// yield an empty vector.
pub fn collect_glyphs(page: &PdfPage) -> Vec<Glyph> {
    let page_height = page.height().value;
    let text = match page.text() {
        Ok(t) => t,
        Err(_) => return Vec::new(),
    };

    let mut glyphs = Vec::new();
    for segment in text.segments().iter() {
        if let Ok(chars) = segment.chars() {
            for ch in chars.iter() {
                let Some(c) = ch.unicode_char() else {
                    continue;
                };
                let Ok(bounds) = ch.loose_bounds() else {
                    continue;
                };
                let font_size = ch.unscaled_font_size().value;
                glyphs.push(Glyph {
                    text: c,
                    left: bounds.left().value,
                    right: bounds.right().value,
                    top: page_height - bounds.top().value,
                    bottom: page_height - bounds.bottom().value,
                    height: bounds.height().value,
                    font_size,
                });
            }
        }
    }
    glyphs
}

/// Rebuild a page's text in reading order from its glyph set.
///
/// Single forward pass over the sorted glyphs; `O(n log n)` in the sort.
/// An empty glyph set yields an empty string.
pub fn normalize(mut glyphs: Vec<Glyph>) -> String {
    // Primary sort key is the top coordinate rounded to the nearest 10 pt,
    // so glyphs on the same baseline with slightly different boxes still
    // land on the same line; ties break left to right.
    glyphs.sort_by(|a, b| {
        let ka = (a.top / 10.0).round() as i64;
        let kb = (b.top / 10.0).round() as i64;
        ka.cmp(&kb).then_with(|| {
            a.left
                .partial_cmp(&b.left)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    let mut text = String::with_capacity(glyphs.len() * 2);
    let mut prev: Option<&Glyph> = None;

    for glyph in &glyphs {
        if let Some(last) = prev {
            let vertical_gap = glyph.top - last.top;

            if vertical_gap > LINE_BREAK_GAP {
                if vertical_gap > last.height * PARAGRAPH_GAP_FACTOR {
                    text.push_str("\n\n");
                } else {
                    text.push('\n');
                }
                text.push(glyph.text);
                prev = Some(glyph);
                continue;
            }

            if glyph.left > last.right + WORD_GAP {
                text.push(' ');
            }

            let is_subscript = last.text.is_alphanumeric()
                && glyph.text.is_alphanumeric()
                && glyph.midpoint() > last.midpoint() + SUBSCRIPT_DROP
                && glyph.font_size <= last.font_size;

            if is_subscript {
                text.push(SUBSCRIPT_MARKER);
            }
            text.push(glyph.text);
        } else {
            text.push(glyph.text);
        }
        prev = Some(glyph);
    }

    text
}
