//! Output types: the extracted dataset and per-run statistics.

use serde::{Deserialize, Serialize};

/// Placeholder solution value used until a `Solution:` delimiter closes the
/// question. Survives into the output when the final segment never closes.
pub const UNRESOLVED_SOLUTION: &str = "TBD";

/// One question/solution record extracted from the book.
///
/// Field names mirror the JSON consumed downstream: `hint` and `graph_url`
/// serialise as `null` when absent rather than being omitted, so consumers
/// can rely on a fixed shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Sequential identifier, e.g. `prob_1`.
    pub id: String,
    /// Title line of the question. Never empty.
    pub title: String,
    /// Problem statement, with inline LaTeX markup. Never empty.
    pub problem_text: String,
    /// Solution text, or [`UNRESOLVED_SOLUTION`] if no delimiter closed it.
    pub solution: String,
    /// Hint body looked up from the hint table, if the problem referenced one.
    pub hint: Option<String>,
    /// Chapter label, constant across a run.
    pub chapter: String,
    /// URL of the figure crop referenced by the problem or solution, if any.
    pub graph_url: Option<String>,
}

/// A page index paired with its fully cleaned text.
///
/// Produced once per page by the normalise + cleanup stages; immutable
/// thereafter. The segmenter consumes these in ascending page order.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 0-indexed page number within the PDF.
    pub page_index: usize,
    /// Reconstructed text with furniture and hints removed.
    pub text: String,
}

/// Statistics for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the text range that were processed.
    pub pages_processed: usize,
    /// Hints harvested across all pages (after last-writer-wins merging).
    pub hints_extracted: usize,
    /// Figure crops rendered and saved.
    pub figures_extracted: usize,
    /// Question records emitted.
    pub questions_extracted: usize,
    /// Wall-clock time of the figure pass in milliseconds.
    pub figure_duration_ms: u64,
    /// Wall-clock time of the text pass in milliseconds.
    pub text_duration_ms: u64,
    /// Total run duration in milliseconds.
    pub total_duration_ms: u64,
}

/// Complete result of an extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Extracted records in document order.
    pub questions: Vec<QuestionRecord>,
    /// Run statistics.
    pub stats: ExtractionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serialises_nullable_fields() {
        let record = QuestionRecord {
            id: "prob_1".into(),
            title: "Coin toss game".into(),
            problem_text: "Two gamblers...".into(),
            solution: UNRESOLVED_SOLUTION.into(),
            hint: None,
            chapter: "Probability".into(),
            graph_url: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"hint\":null"), "got: {json}");
        assert!(json.contains("\"graph_url\":null"), "got: {json}");
        assert!(json.contains("\"solution\":\"TBD\""), "got: {json}");
    }

    #[test]
    fn record_round_trips() {
        let record = QuestionRecord {
            id: "prob_7".into(),
            title: "Birthday problem".into(),
            problem_text: "How many people...".into(),
            solution: "By the pigeonhole principle...".into(),
            hint: Some("Consider the complement.".into()),
            chapter: "Probability".into(),
            graph_url: Some("/images/figure_4_2.png".into()),
        };
        let json = serde_json::to_string_pretty(&record).unwrap();
        let back: QuestionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
