//! Page-furniture removal and hint harvesting.
//!
//! Every page carries furniture that must not leak into question bodies:
//! a bare page number on its own line and one of two running titles. After
//! those are dropped, the page may still contain numbered hint blocks
//! (`3 Hint: Use Bayes' rule.`) that belong in a side table rather than the
//! text stream; they are harvested and removed here.
//!
//! A hint body runs from its marker to the next hint marker or the end of
//! the page text. The `regex` crate has no lookahead, so the block scan is
//! an explicit two-step pass: find all marker positions first, then slice
//! bodies between consecutive markers.

use once_cell::sync::Lazy;
use regex::Regex;

/// A line consisting solely of a number is a page number.
static RE_PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*\d+\s*$").unwrap());

/// Start of a hint block: newline, numeric id, the word "Hint:" (any case),
/// then whitespace. The leading newline keeps mid-line numerals (hint
/// *references* inside question bodies) from matching.
static RE_HINT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\n(\d+)\s+hint:\s+").unwrap());

/// Remove page furniture and harvest hint blocks from one page's raw text.
///
/// Returns the trimmed residual body text and the harvested `(id, body)`
/// pairs in document order. The caller merges pairs into the global hint
/// table with last-writer-wins semantics.
pub fn clean_page(text: &str, running_titles: &[String]) -> (String, Vec<(String, String)>) {
    let mut s = RE_PAGE_NUMBER.replace_all(text, "").into_owned();
    for title in running_titles {
        s = s.replace(title.as_str(), "");
    }
    let (s, hints) = harvest_hints(&s);
    (s.trim().to_string(), hints)
}

/// Extract hint blocks, returning the text with all blocks removed.
pub fn harvest_hints(text: &str) -> (String, Vec<(String, String)>) {
    let markers: Vec<(usize, usize, String)> = RE_HINT_MARKER
        .captures_iter(text)
        .map(|caps| {
            let m = caps.get(0).expect("regex match has a group 0");
            (m.start(), m.end(), caps[1].to_string())
        })
        .collect();

    if markers.is_empty() {
        return (text.to_string(), Vec::new());
    }

    let mut hints = Vec::with_capacity(markers.len());
    let mut cleaned = String::with_capacity(text.len());
    let mut cursor = 0usize;

    for (i, (start, end, id)) in markers.iter().enumerate() {
        // Body runs up to the next marker's leading newline, or end of text.
        let body_end = markers.get(i + 1).map(|m| m.0).unwrap_or(text.len());
        cleaned.push_str(&text[cursor..*start]);
        hints.push((id.clone(), text[*end..body_end].trim().to_string()));
        cursor = body_end;
    }
    cleaned.push_str(&text[cursor..]);

    (cleaned, hints)
}
