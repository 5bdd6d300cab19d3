//! Question segmentation.
//!
//! Operates on the cleaned, concatenated chapter text. Pages are joined with
//! `<PAGE_n>` markers so page provenance survives concatenation, then the
//! stream is split on the `Solution:` delimiter. Each split point ends one
//! question's statement and begins its worked solution; the tricky part is
//! finding where, inside a segment, the solution of question N ends and the
//! title of question N+1 begins.
//!
//! That boundary is recovered with a backward scan for a title-shaped line:
//! short, starts with an uppercase letter, no trailing period or colon, no
//! comma, and preceded either by a blank line or by a line that ends a
//! sentence. Scanning backward matters because solution prose often contains
//! title-shaped lines of its own; the last candidate before the segment's
//! tail is the most likely true boundary.
//!
//! The first question has no preceding `Solution:`, so it is bootstrapped by
//! locating a configured anchor phrase in the opening segment.

use crate::config::ExtractionConfig;
use crate::output::{PageText, QuestionRecord, UNRESOLVED_SOLUTION};
use crate::pipeline::figures::FigureMap;
use crate::pipeline::latex::latexify;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Marks the start of a worked solution in the book's typesetting.
const SOLUTION_DELIMITER: &str = "Solution:";

/// Page provenance marker inserted between concatenated pages.
static RE_PAGE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<PAGE_\d+>").unwrap());

/// Trailing numeral on a title or body line, usually a hint reference.
static RE_TRAILING_NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\d+$").unwrap());

/// Hint reference at the end of a question body: final punctuation followed
/// by a bare number.
static RE_HINT_REF_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\?\.!]?\s*(\d+)$").unwrap());

/// Fallback hint reference: a number directly after a question mark
/// anywhere in the body.
static RE_HINT_REF_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?\s*(\d+)").unwrap());

/// Figure mention inside question or solution prose. Letter-suffixed panels
/// (`Figure 4.2A`) are deliberately not matched; prose refers to the parent
/// figure.
static RE_FIGURE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"Figure\s+\d+\.\d+").unwrap());

/// A line that could plausibly be a question title.
pub fn is_title_candidate(line: &str) -> bool {
    let len = line.chars().count();
    len > 3
        && len < 80
        && line.chars().next().is_some_and(char::is_uppercase)
        && !line.ends_with('.')
        && !line.ends_with(':')
        && !line.contains(',')
}

/// Whether the line before a title candidate permits a split there: a blank
/// line is a strong signal, a finished sentence a weak one.
pub fn is_valid_split(prev_line: &str) -> bool {
    prev_line.is_empty()
        || prev_line.ends_with('.')
        || prev_line.ends_with('?')
        || prev_line.ends_with('!')
        || prev_line.ends_with('"')
        || prev_line.ends_with(')')
        || prev_line.ends_with(']')
}

/// Remove page markers and surrounding whitespace.
fn strip_page_markers(text: &str) -> String {
    RE_PAGE_MARKER.replace_all(text, "").trim().to_string()
}

/// First figure mentioned in `text` that has a saved crop.
fn find_figure_url(text: &str, figures: &FigureMap) -> Option<String> {
    RE_FIGURE_REF
        .find_iter(text)
        .find_map(|m| figures.get(m.as_str()).cloned())
}

/// Hint body referenced from the end of a question body, if any. The lookup
/// happens before the trailing numeral is stripped from the body.
fn hint_for(body: &str, hints: &HashMap<String, String>) -> Option<String> {
    let captures = RE_HINT_REF_TAIL
        .captures(body)
        .or_else(|| RE_HINT_REF_INLINE.captures(body))?;
    hints.get(&captures[1]).map(|h| latexify(h))
}

/// Split the cleaned chapter text into question records.
///
/// Hints are resolved by trailing reference number, figure crops are linked
/// by `Figure X.Y` mention, and every text field goes through [`latexify`].
/// A question whose solution boundary is never found keeps the
/// [`UNRESOLVED_SOLUTION`] placeholder.
pub fn segment_questions(
    pages: &[PageText],
    hints: &HashMap<String, String>,
    figures: &FigureMap,
    config: &ExtractionConfig,
) -> Vec<QuestionRecord> {
    let mut combined = String::new();
    for page in pages {
        combined.push_str(&format!("\n<PAGE_{}>\n{}", page.page_index, page.text));
    }

    let segments: Vec<&str> = combined.split(SOLUTION_DELIMITER).collect();
    debug!("Segmenting {} solution-delimited blocks", segments.len());

    let mut questions: Vec<QuestionRecord> = Vec::new();
    let mut counter = 1usize;

    // The first question is not preceded by a delimiter; find it by anchor.
    let anchor_pattern = format!("(?i){}", regex::escape(&config.first_question_anchor));
    if let Some(m) = Regex::new(&anchor_pattern)
        .ok()
        .and_then(|re| re.find(segments[0]).map(|m| m.start()))
    {
        let opening = &segments[0][m..];
        let clean_lines: Vec<&str> = opening
            .trim()
            .split('\n')
            .filter(|l| !l.starts_with("<PAGE_"))
            .collect();
        if let Some((title_line, body_lines)) = clean_lines.split_first() {
            let title = RE_TRAILING_NUMERAL
                .replace(title_line.trim(), "")
                .to_string();
            let body = body_lines.join("\n").trim().to_string();
            let hint = hint_for(&body, hints);
            let body = latexify(RE_TRAILING_NUMERAL.replace(&body, "").trim());
            let graph_url = find_figure_url(&body, figures);
            questions.push(QuestionRecord {
                id: format!("{}_{}", config.id_prefix, counter),
                title,
                problem_text: body,
                solution: UNRESOLVED_SOLUTION.to_string(),
                hint,
                chapter: config.chapter_label.clone(),
                graph_url,
            });
            counter += 1;
        }
    } else {
        warn!(
            "First question anchor '{}' not found; the opening segment is dropped",
            config.first_question_anchor
        );
    }

    for (i, segment) in segments.iter().enumerate().skip(1) {
        let lines: Vec<&str> = segment.trim().split('\n').collect();

        let mut split_idx = None;
        if lines.len() >= 3 {
            for j in (1..=lines.len() - 2).rev() {
                let line = lines[j].trim();
                if is_title_candidate(line) && is_valid_split(lines[j - 1].trim()) {
                    split_idx = Some(j);
                    break;
                }
            }
        }

        match split_idx {
            // The last segment is solution tail only, even if it contains a
            // title-shaped line.
            Some(j) if i < segments.len() - 1 => {
                let solution = latexify(&strip_page_markers(&lines[..j].join("\n")));
                if let Some(prev) = questions.last_mut() {
                    if prev.graph_url.is_none() {
                        prev.graph_url = find_figure_url(&solution, figures);
                    }
                    prev.solution = solution;
                }

                let title = RE_TRAILING_NUMERAL
                    .replace(lines[j].trim(), "")
                    .to_string();
                let body = strip_page_markers(&lines[j + 1..].join("\n"));
                let hint = hint_for(&body, hints);
                let body = latexify(RE_TRAILING_NUMERAL.replace(&body, "").trim());
                let graph_url = find_figure_url(&body, figures);
                questions.push(QuestionRecord {
                    id: format!("{}_{}", config.id_prefix, counter),
                    title,
                    problem_text: body,
                    solution: UNRESOLVED_SOLUTION.to_string(),
                    hint,
                    chapter: config.chapter_label.clone(),
                    graph_url,
                });
                counter += 1;
            }
            _ => {
                let solution = latexify(&strip_page_markers(segment));
                if let Some(prev) = questions.last_mut() {
                    if prev.graph_url.is_none() {
                        prev.graph_url = find_figure_url(&solution, figures);
                    }
                    prev.solution = solution;
                }
            }
        }
    }

    debug!("Segmented {} questions", questions.len());
    questions
}
