#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Key-concept extraction for written submissions.

use itertools::Itertools;

use super::ContentGuide;
use crate::{
    constants::{
        MAX_REFERENCE_CONCEPTS, MAX_TASK_CONCEPTS, TASK_STOPWORDS, TECHNICAL_CONCEPT_ALLOWLIST,
        WEAK_CONCEPT_SUFFIXES,
    },
    text::concept_words,
};

/// Returns true if `word` looks like a domain concept rather than a verb,
/// adverb or abstract noun.
fn is_strong_concept(word: &str) -> bool {
    if WEAK_CONCEPT_SUFFIXES.iter().any(|suffix| word.ends_with(suffix)) {
        TECHNICAL_CONCEPT_ALLOWLIST.contains(&word)
    } else {
        true
    }
}

/// Auto-extracts up to [`MAX_TASK_CONCEPTS`] concepts from a problem
/// statement.
pub fn task_concepts(problem_statement: &str) -> Vec<String> {
    concept_words(problem_statement)
        .into_iter()
        .filter(|word| !TASK_STOPWORDS.contains(&word.as_str()))
        .filter(|word| is_strong_concept(word))
        .take(MAX_TASK_CONCEPTS)
        .collect()
}

/// The first [`MAX_REFERENCE_CONCEPTS`] distinct long words of a reference
/// text.
pub fn reference_concepts(reference: &str) -> Vec<String> {
    concept_words(reference)
        .into_iter()
        .take(MAX_REFERENCE_CONCEPTS)
        .collect()
}

/// Picks the concepts a submission is checked against.
///
/// Declared concepts and criteria come first, then reference words. Only
/// when both are absent are concepts extracted from the problem statement.
/// The result is de-duplicated in first-seen order.
pub fn key_concepts(
    guide: &ContentGuide,
    reference: Option<&str>,
    problem_statement: &str,
) -> Vec<String> {
    let mut concepts: Vec<String> = guide
        .concepts
        .iter()
        .chain(&guide.criteria)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    if let Some(reference) = reference.filter(|r| !r.trim().is_empty()) {
        concepts.extend(reference_concepts(reference));
    }

    if concepts.is_empty() && !problem_statement.trim().is_empty() {
        concepts = task_concepts(problem_statement);
    }

    concepts.into_iter().unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_concepts_skip_boilerplate_and_weak_words() {
        let concepts = task_concepts(
            "Write a detailed report explaining retrieval pipelines, chunking and vector \
             embedding for the proposed solution.",
        );
        assert_eq!(
            concepts,
            vec!["write", "retrieval", "pipelines", "vector", "embedding"]
        );
    }

    #[test]
    fn declared_concepts_win_over_the_problem_statement() {
        let guide = ContentGuide {
            concepts: vec!["photosynthesis".into(), "chlorophyll".into()],
            ..ContentGuide::default()
        };
        let concepts = key_concepts(&guide, None, "Explain mitochondria in detail");
        assert_eq!(concepts, vec!["photosynthesis", "chlorophyll"]);
    }

    #[test]
    fn reference_words_are_capped() {
        let reference = (0..20).map(|i| format!("word{i:02}")).join(" ");
        let concepts = key_concepts(&ContentGuide::default(), Some(&reference), "ignored");
        assert_eq!(concepts.len(), MAX_REFERENCE_CONCEPTS);
        assert_eq!(concepts[0], "word00");
    }
}
