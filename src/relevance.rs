#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Keyword-ratio relevance gate shared by both analyzers.
//!
//! The gate answers one question before any quality scoring happens: is the
//! submission even attempting the assigned task? An oracle verdict, when one
//! is available, is authoritative. The keyword ratio refines it, and stands in
//! for it when the verdict is [`Verdict::Uncertain`].

use crate::{
    constants::{
        CODE_STOPWORDS, FALLBACK_APPROACH, FALLBACK_MATCHES, FALLBACK_RATIO, ORACLE_HIGH_MATCHES,
        ORACLE_HIGH_RATIO, ORACLE_MID_RATIO,
    },
    text::concept_words,
    types::Verdict,
};

/// Which concepts of a candidate set occur in a submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordMatch {
    /// Concepts that appear in the submission, in candidate order.
    pub matched: Vec<String>,
    /// Concepts that do not appear, in candidate order.
    pub missing: Vec<String>,
}

impl KeywordMatch {
    /// Matches each concept as a case-insensitive substring of `submission`.
    pub fn compute<S: AsRef<str>>(concepts: &[S], submission: &str) -> Self {
        let haystack = submission.to_lowercase();
        let (matched, missing): (Vec<String>, Vec<String>) = concepts
            .iter()
            .map(|c| c.as_ref().to_string())
            .partition(|c| haystack.contains(&c.to_lowercase()));

        Self { matched, missing }
    }

    /// Number of candidate concepts.
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }

    /// Number of matched concepts.
    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }

    /// Fraction of candidates that matched, 0 when there are no candidates.
    pub fn ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.matched.len() as f64 / total as f64,
        }
    }

    /// Percentage of candidates that matched.
    pub fn percent(&self) -> f64 {
        self.ratio() * 100.0
    }

    /// Returns true if there was nothing to compare against.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Candidate concepts for a code submission: the problem statement's long word
/// tokens minus generic programming vocabulary.
pub fn code_candidates(problem_statement: &str) -> Vec<String> {
    concept_words(problem_statement)
        .into_iter()
        .filter(|word| !CODE_STOPWORDS.contains(&word.as_str()))
        .collect()
}

/// Approach score awarded by the gate for a code submission.
///
/// * `IRRELEVANT` always yields 0.
/// * `RELEVANT`/`PARTIAL` are refined by the ratio: 100/80 for a strong
///   overlap, 90/60 for a moderate one, 80/30 otherwise.
/// * `UNCERTAIN` fails closed: a weak overlap yields 0.
pub fn approach_score(verdict: Verdict, keywords: &KeywordMatch) -> f64 {
    let ratio = keywords.ratio();
    let matched = keywords.matched_count();

    match verdict {
        Verdict::Irrelevant => 0.0,
        Verdict::Relevant | Verdict::Partial => {
            let relevant = verdict == Verdict::Relevant;
            if ratio >= ORACLE_HIGH_RATIO || matched >= ORACLE_HIGH_MATCHES {
                if relevant { 100.0 } else { 80.0 }
            } else if ratio >= ORACLE_MID_RATIO {
                if relevant { 90.0 } else { 60.0 }
            } else if relevant {
                80.0
            } else {
                30.0
            }
        }
        Verdict::Uncertain => {
            if ratio >= FALLBACK_RATIO || matched >= FALLBACK_MATCHES {
                FALLBACK_APPROACH
            } else {
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(matched: usize, missing: usize) -> KeywordMatch {
        KeywordMatch {
            matched: (0..matched).map(|i| format!("hit{i}")).collect(),
            missing: (0..missing).map(|i| format!("miss{i}")).collect(),
        }
    }

    #[test]
    fn compute_is_case_insensitive() {
        let m =
            KeywordMatch::compute(&["Fibonacci", "memo", "graph"], "def fibonacci(n): MEMO = {}");
        assert_eq!(m.matched, vec!["Fibonacci", "memo"]);
        assert_eq!(m.missing, vec!["graph"]);
        assert!((m.ratio() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn code_candidates_drop_generic_terms() {
        let words = code_candidates("Write a function that computes the factorial of a number");
        assert_eq!(words, vec!["computes", "factorial"]);
    }

    #[test]
    fn oracle_bands() {
        assert_eq!(approach_score(Verdict::Relevant, &keywords(3, 20)), 100.0);
        assert_eq!(approach_score(Verdict::Partial, &keywords(3, 20)), 80.0);
        assert_eq!(approach_score(Verdict::Relevant, &keywords(1, 5)), 90.0);
        assert_eq!(approach_score(Verdict::Partial, &keywords(1, 5)), 60.0);
        assert_eq!(approach_score(Verdict::Relevant, &keywords(0, 5)), 80.0);
        assert_eq!(approach_score(Verdict::Partial, &keywords(0, 5)), 30.0);
        assert_eq!(approach_score(Verdict::Irrelevant, &keywords(5, 0)), 0.0);
    }

    #[test]
    fn fallback_fails_closed() {
        assert_eq!(approach_score(Verdict::Uncertain, &keywords(2, 20)), 75.0);
        assert_eq!(approach_score(Verdict::Uncertain, &keywords(1, 3)), 75.0);
        assert_eq!(approach_score(Verdict::Uncertain, &keywords(1, 4)), 0.0);
        assert_eq!(approach_score(Verdict::Uncertain, &keywords(0, 0)), 0.0);
    }
}
