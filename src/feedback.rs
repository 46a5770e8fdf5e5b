#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Feedback line vocabulary, de-duplication and bucketing.
//!
//! Analyzers emit flat lists of lines whose leading glyph says what kind of
//! line it is. Combining de-duplicates them, lifts out the oracle's
//! elaboration block, and emits the rest grouped under fixed section headers.

/// Marks the line that precedes an oracle elaboration block.
pub const ELABORATION_SENTINEL: &str = "LLM Explanation:";

/// Leading glyph of a strength.
pub const STRENGTH: &str = "✓";
/// Leading glyph of an improvement suggestion.
pub const IMPROVEMENT: &str = "→";
/// Leading glyph of an issue.
pub const ISSUE: &str = "❌";
/// Alternative issue marker.
pub const ISSUE_ALT: &str = "[x]";
/// Leading glyph of an informational note.
pub const NOTE: &str = "ℹ";
/// Leading glyph of a warning. Warnings are not bucketed.
pub const WARNING: &str = "⚠️";

/// Header placed above the elaboration block.
pub const ELABORATION_HEADER: &str = "## AI Evaluator";
/// Header placed above strengths.
pub const STRENGTHS_HEADER: &str = "## Strengths";
/// Header placed above improvements.
pub const IMPROVEMENTS_HEADER: &str = "## Areas for Improvement";
/// Header placed above issues.
pub const ISSUES_HEADER: &str = "## Issues to Address";
/// Header placed above notes.
pub const NOTES_HEADER: &str = "## Additional Notes";

/// Returned when there is nothing to combine.
pub const NO_FEEDBACK: &str = "No feedback available.";

/// Prefixes that end an elaboration block.
const BLOCK_TERMINATORS: [&str; 7] = [STRENGTH, IMPROVEMENT, ISSUE, NOTE, "##", "[", "√"];

/// Prefixes that keep a line out of the unclassified bucket.
const CLASSIFIED_PREFIXES: [&str; 6] = [STRENGTH, IMPROVEMENT, ISSUE, NOTE, "##", "["];

/// Returns true for strength, improvement and issue lines, the deterministic
/// findings an elaboration explains.
pub fn is_finding(line: &str) -> bool {
    line.starts_with(STRENGTH) || line.starts_with(IMPROVEMENT) || line.starts_with(ISSUE)
}

/// Removes exact repeats, keeping the first occurrence of each line.
pub fn dedupe<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = std::collections::HashSet::new();
    lines
        .into_iter()
        .map(Into::into)
        .filter(|line| seen.insert(line.clone()))
        .collect()
}

/// Feedback lines grouped by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackBuckets {
    /// Oracle prose, in original order.
    pub elaboration:  Vec<String>,
    /// `✓` lines.
    pub strengths:    Vec<String>,
    /// `→` lines.
    pub improvements: Vec<String>,
    /// `❌` and `[x]` lines.
    pub issues:       Vec<String>,
    /// `ℹ` lines.
    pub notes:        Vec<String>,
    /// Everything else, warnings included.
    pub unclassified: Vec<String>,
}

impl FeedbackBuckets {
    /// Sorts already de-duplicated lines into buckets.
    ///
    /// Lines after an [`ELABORATION_SENTINEL`] line (or an
    /// [`ELABORATION_HEADER`] from an earlier pass) belong to the elaboration
    /// block until a blank line or a line that starts with a bucket glyph, a
    /// `##` header, `[` or `√`. The blank line that ends a block is dropped.
    pub fn from_lines(lines: &[String]) -> Self {
        let mut buckets = Self::default();
        let mut in_block = false;

        for line in lines {
            if line.contains(ELABORATION_SENTINEL) || line == ELABORATION_HEADER {
                in_block = true;
                continue;
            }
            if in_block {
                if line.trim().is_empty() {
                    in_block = false;
                    continue;
                }
                if BLOCK_TERMINATORS.iter().any(|p| line.starts_with(p)) {
                    in_block = false;
                } else {
                    buckets.elaboration.push(line.clone());
                    continue;
                }
            }

            if line.starts_with(STRENGTH) {
                buckets.strengths.push(line.clone());
            } else if line.starts_with(IMPROVEMENT) {
                buckets.improvements.push(line.clone());
            } else if line.starts_with(ISSUE) || line.starts_with(ISSUE_ALT) {
                buckets.issues.push(line.clone());
            } else if line.starts_with(NOTE) {
                buckets.notes.push(line.clone());
            } else if !CLASSIFIED_PREFIXES.iter().any(|p| line.starts_with(p)) {
                buckets.unclassified.push(line.clone());
            }
        }

        buckets
    }

    /// Returns true if no bucket holds a line.
    pub fn is_empty(&self) -> bool {
        self.elaboration.is_empty()
            && self.strengths.is_empty()
            && self.improvements.is_empty()
            && self.issues.is_empty()
            && self.notes.is_empty()
            && self.unclassified.is_empty()
    }

    /// Emits the buckets in fixed order, each non-empty section under its
    /// header. The elaboration block comes first, followed by a blank spacer
    /// line; unclassified lines come last without a header.
    pub fn into_lines(self) -> Vec<String> {
        let mut out = Vec::new();

        if !self.elaboration.is_empty() {
            out.push(ELABORATION_HEADER.to_string());
            out.extend(self.elaboration);
            out.push(String::new());
        }
        for (header, lines) in [
            (STRENGTHS_HEADER, self.strengths),
            (IMPROVEMENTS_HEADER, self.improvements),
            (ISSUES_HEADER, self.issues),
            (NOTES_HEADER, self.notes),
        ] {
            if !lines.is_empty() {
                out.push(header.to_string());
                out.extend(lines);
            }
        }
        out.extend(self.unclassified);

        out
    }
}

/// De-duplicates and organises feedback from one or more analyzers.
///
/// Empty input yields a single [`NO_FEEDBACK`] line. If nothing can be
/// bucketed the de-duplicated lines are returned as they are.
pub fn combine(lines: Vec<String>) -> Vec<String> {
    if lines.is_empty() {
        return vec![NO_FEEDBACK.to_string()];
    }

    let unique = dedupe(lines);
    let buckets = FeedbackBuckets::from_lines(&unique);
    if buckets.is_empty() {
        unique
    } else {
        buckets.into_lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn elaboration_block_ends_at_a_glyph() {
        let input = lines(&[
            "✓ Good names.",
            "LLM Explanation:",
            "**Summary**: sorts numbers.",
            "Consider edge cases.",
            "→ Add comments.",
            "⚠️ Looks copied.",
        ]);
        let buckets = FeedbackBuckets::from_lines(&input);
        assert_eq!(
            buckets.elaboration,
            lines(&["**Summary**: sorts numbers.", "Consider edge cases."])
        );
        assert_eq!(buckets.strengths, lines(&["✓ Good names."]));
        assert_eq!(buckets.improvements, lines(&["→ Add comments."]));
        assert_eq!(buckets.unclassified, lines(&["⚠️ Looks copied."]));
    }

    #[test]
    fn headers_and_brackets_are_not_unclassified() {
        let buckets =
            FeedbackBuckets::from_lines(&lines(&["## Old header", "[x] broken", "[note]"]));
        assert_eq!(buckets.issues, lines(&["[x] broken"]));
        assert!(buckets.unclassified.is_empty());
    }

    #[test]
    fn combining_twice_changes_nothing() {
        let once = combine(lines(&[
            "→ Add comments.",
            "✓ Good names.",
            "LLM Explanation:",
            "Nice work overall.",
            "ℹ Neutral approach.",
            "⚠️ Looks copied.",
            "✓ Good names.",
        ]));
        assert_eq!(once[0], ELABORATION_HEADER);
        assert_eq!(combine(once.clone()), once);
    }

    #[test]
    fn warning_after_elaboration_survives_a_second_combine() {
        let warning = "⚠️ LLM determined content is irrelevant to the prompt. Score: 0.";
        let once = combine(lines(&[warning, "LLM Explanation:", "**Summary**: off topic."]));
        assert_eq!(
            once,
            lines(&[ELABORATION_HEADER, "**Summary**: off topic.", "", warning])
        );
        assert_eq!(combine(once.clone()), once);
    }

    #[test]
    fn unbucketable_input_is_returned_deduplicated() {
        assert_eq!(combine(lines(&["## A", "## A", "[b]"])), lines(&["## A", "[b]"]));
        assert_eq!(combine(Vec::new()), lines(&[NO_FEEDBACK]));
    }
}
