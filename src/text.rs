#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Small text helpers shared by the analyzers.

use std::{sync::LazyLock, time::Duration};

use itertools::Itertools;
use regex::Regex;
use similar::TextDiff;

use crate::constants::MIN_CONCEPT_LEN;

/// Matches word tokens of at least [`MIN_CONCEPT_LEN`] word characters.
static CONCEPT_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b\w{{{MIN_CONCEPT_LEN},}}\b")).expect("concept word regex is valid")
});

/// Upper bound on the time spent diffing a submission against its prompt.
const SIMILARITY_TIMEOUT: Duration = Duration::from_millis(500);

/// Returns the lowercase word tokens of `text` that are long enough to be
/// concepts, de-duplicated in first-seen order.
pub fn concept_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    CONCEPT_WORD
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .unique()
        .collect()
}

/// Returns true if `haystack` contains any of `needles` (both compared as
/// given; callers lowercase first).
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Counts how many of `needles` occur at least once in `haystack`.
pub fn count_present(haystack: &str, needles: &[&str]) -> usize {
    needles
        .iter()
        .filter(|needle| haystack.contains(**needle))
        .count()
}

/// Character-level similarity ratio in `0.0..=1.0` between two texts.
///
/// Empty input on either side yields 0.
pub fn similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    TextDiff::configure()
        .timeout(SIMILARITY_TIMEOUT)
        .diff_chars(a, b)
        .ratio()
}

/// Truncates `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
