#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Heuristic scoring of written submissions.
//!
//! Concept coverage carries most of the weight and doubles as the relevance
//! gate: a submission that mentions none of the key concepts scores 0 no
//! matter how well it is written. Alignment, flow and completeness refine the
//! score of submissions that pass.

/// Key-concept extraction.
pub mod concepts;

use std::collections::BTreeMap;

use bon::Builder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    constants::{
        ALIGNMENT_WEIGHT, COMPLETENESS_WEIGHT, COPY_SCORE_CAP, COPY_SIMILARITY_THRESHOLD,
        COVERAGE_WEIGHT, EXAMPLE_INDICATORS, FLOW_WEIGHT, NO_CONCEPTS_COVERAGE,
        REASONING_INDICATORS, REQUIRED_SECTION_RATIO, TRANSITION_WORDS,
    },
    feedback::{ELABORATION_SENTINEL, is_finding},
    oracle::{ElaborationRequest, OracleGate},
    relevance::KeywordMatch,
    rubric::Dimension,
    text::{contains_any, count_present, similarity},
    types::{Analyzer, AnalyzerResult, SubmissionKind, Verdict, round_score},
};

/// Name of the concept coverage criterion.
pub const COVERAGE: &str = "coverage";
/// Name of the rubric alignment criterion.
pub const ALIGNMENT: &str = "alignment";
/// Name of the logical flow criterion.
pub const FLOW: &str = "flow";
/// Name of the completeness criterion.
pub const COMPLETENESS: &str = "completeness";

/// Maximum score of a content evaluation.
pub const CONTENT_MAX_SCORE: f64 = 100.0;

/// Line recorded when the oracle rejects a submission outright.
pub const IRRELEVANT_FEEDBACK: &str =
    "⚠️ LLM determined content is irrelevant to the prompt. Score: 0.";

/// Line recorded when no key concept appears in the submission.
pub const NO_CONCEPTS_FOUND_FEEDBACK: &str =
    "⚠️ Irrelevant submission: No key concepts from the prompt were found.";

/// Base score of alignment, flow and completeness before bonuses.
const BASE_SCORE: f64 = 50.0;

/// What a written submission is expected to cover, usually taken from the
/// rubric's `content` dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentGuide {
    /// Concepts the submission should mention.
    #[serde(default)]
    pub concepts:            Vec<String>,
    /// Further named criteria that double as concepts.
    #[serde(default)]
    pub criteria:            Vec<String>,
    /// Learning objectives to look for.
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    /// Section titles the submission should contain.
    #[serde(default)]
    pub required_sections:   Vec<String>,
}

impl ContentGuide {
    /// Builds a guide from the concepts, objectives and sections a rubric
    /// dimension declares.
    ///
    /// The dimension's scoring criteria are not treated as concepts.
    pub fn from_dimension(dimension: &Dimension) -> Self {
        Self {
            concepts:            dimension.concepts.clone(),
            criteria:            Vec::new(),
            learning_objectives: dimension.learning_objectives.clone(),
            required_sections:   dimension.required_sections.clone(),
        }
    }

    /// Returns true if the guide declares nothing.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
            && self.criteria.is_empty()
            && self.learning_objectives.is_empty()
            && self.required_sections.is_empty()
    }

    /// Short description for the elaboration request.
    fn context(&self) -> String {
        let mut parts = vec![format!(
            "{COVERAGE} {COVERAGE_WEIGHT:.2}, {ALIGNMENT} {ALIGNMENT_WEIGHT:.2}, {FLOW} \
             {FLOW_WEIGHT:.2}, {COMPLETENESS} {COMPLETENESS_WEIGHT:.2}"
        )];
        if !self.learning_objectives.is_empty() {
            parts.push(format!("objectives: {}", self.learning_objectives.join(", ")));
        }
        if !self.required_sections.is_empty() {
            parts.push(format!("sections: {}", self.required_sections.join(", ")));
        }
        parts.join("; ")
    }
}

/// One written submission and the context it is graded in.
#[derive(Debug, Clone, Default, Builder)]
#[builder(on(String, into))]
pub struct ContentSubmission {
    /// The assignment prompt.
    #[builder(default)]
    pub problem_statement: String,
    /// The student's text.
    pub content:           String,
    /// Optional model answer.
    pub reference:         Option<String>,
    /// Declared expectations.
    #[builder(default)]
    pub guide:             ContentGuide,
}

/// Scores written submissions.
#[derive(Debug, Clone, Default)]
pub struct ContentAnalyzer {
    /// Access to the optional semantic oracle.
    gate: OracleGate,
}

/// Concept coverage score and its feedback. `None` means there were no
/// concepts to compare against.
fn score_coverage(
    keywords: Option<&KeywordMatch>,
    hints: bool,
    feedback: &mut Vec<String>,
) -> f64 {
    let Some(keywords) = keywords else {
        feedback.push("ℹ No key concepts specified for comparison.".to_string());
        return NO_CONCEPTS_COVERAGE;
    };

    let found = format!("{}/{}", keywords.matched_count(), keywords.total());
    let missing = |n: usize| keywords.missing.iter().take(n).join(", ");
    let percent = keywords.percent();

    if percent >= 80.0 {
        feedback.push(format!("✓ Excellent concept coverage ({found} concepts)."));
        if hints && !keywords.missing.is_empty() {
            feedback.push(format!("→ Missing: {}", missing(5)));
        }
        90.0
    } else if percent >= 60.0 {
        feedback.push(format!("→ Good coverage ({found} concepts)."));
        if hints {
            feedback.push(format!("→ Missing: {}", missing(5)));
        }
        70.0
    } else if percent >= 40.0 {
        feedback.push(format!("→ Partial coverage ({found} concepts)."));
        if hints {
            feedback.push(format!("→ Missing key concepts: {}", missing(7)));
        }
        50.0
    } else if percent >= 20.0 {
        feedback.push(format!("→ Low coverage ({found} concepts)."));
        20.0
    } else {
        feedback.push(format!("❌ Very low concept coverage ({found} concepts)."));
        if hints {
            feedback.push(format!("❌ Missing critical concepts: {}", missing(10)));
        }
        0.0
    }
}

/// Rubric alignment: +30 for any learning objective, +20 when most required
/// sections are present.
fn score_alignment(content: &str, guide: &ContentGuide, feedback: &mut Vec<String>) -> f64 {
    let mut score = BASE_SCORE;
    let lowered = content.to_lowercase();
    let present = |items: &[String]| {
        items
            .iter()
            .filter(|item| lowered.contains(&item.to_lowercase()))
            .count()
    };

    if !guide.learning_objectives.is_empty() {
        let matched = present(&guide.learning_objectives);
        if matched > 0 {
            score += 30.0;
            feedback.push(format!("✓ Addresses {matched} learning objectives."));
        } else {
            feedback.push("→ Content should align with stated learning objectives.".to_string());
        }
    }

    if !guide.required_sections.is_empty() {
        let total = guide.required_sections.len();
        let matched = present(&guide.required_sections);
        if matched as f64 >= total as f64 * REQUIRED_SECTION_RATIO {
            score += 20.0;
            feedback.push(format!("✓ Includes most required sections ({matched}/{total})."));
        } else {
            feedback.push(format!(
                "→ Missing some required sections. Found {matched}/{total}."
            ));
        }
    }

    score.min(100.0)
}

/// Logical flow: paragraphing, sentence length and transitions.
fn score_flow(content: &str, feedback: &mut Vec<String>) -> f64 {
    let mut score = BASE_SCORE;

    let paragraphs = content.lines().filter(|line| !line.trim().is_empty()).count();
    if paragraphs > 3 {
        score += 25.0;
        feedback.push(format!("✓ Well-organized ({paragraphs} distinct sections)."));
    } else if paragraphs > 1 {
        score += 15.0;
        feedback.push("→ Consider organizing content into more distinct sections.".to_string());
    } else {
        feedback.push("→ Break content into multiple paragraphs for clarity.".to_string());
    }

    let sentences: Vec<&str> = content
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let average_words = if sentences.is_empty() {
        0.0
    } else {
        sentences
            .iter()
            .map(|s| s.split_whitespace().count())
            .sum::<usize>() as f64
            / sentences.len() as f64
    };

    if average_words > 10.0 && average_words < 25.0 {
        score += 15.0;
        feedback.push("✓ Sentence structure is clear and varied.".to_string());
    } else if average_words > 30.0 {
        feedback.push("→ Some sentences are too long. Break them for clarity.".to_string());
    } else if average_words < 5.0 {
        feedback.push("→ Sentences are too short. Expand with more detail.".to_string());
    }

    let transitions = count_present(&content.to_lowercase(), TRANSITION_WORDS);
    if transitions >= 3 {
        score += 10.0;
        feedback.push("✓ Good use of transitions for logical flow.".to_string());
    } else if transitions > 0 {
        feedback.push("→ Add more transition words to improve flow between ideas.".to_string());
    }

    score.min(100.0)
}

/// Completeness: length, examples and reasoning.
fn score_completeness(content: &str, feedback: &mut Vec<String>) -> f64 {
    let mut score = BASE_SCORE;
    let lowered = content.to_lowercase();

    let words = content.split_whitespace().count();
    if words > 300 {
        score += 30.0;
        feedback.push(format!("✓ Substantial content ({words} words)."));
    } else if words > 150 {
        score += 15.0;
        feedback.push(format!("→ Content is moderate ({words} words). Add more detail."));
    } else {
        feedback.push(format!(
            "→ Content is brief ({words} words). Expand with examples and explanations."
        ));
    }

    if contains_any(&lowered, EXAMPLE_INDICATORS) {
        score += 10.0;
        feedback.push("✓ Includes examples or specific details.".to_string());
    } else {
        feedback.push("→ Add concrete examples to support your concepts.".to_string());
    }

    if contains_any(&lowered, REASONING_INDICATORS) {
        score += 10.0;
        feedback.push("✓ Includes reasoning or evidence.".to_string());
    } else {
        feedback.push("→ Add reasoning or evidence to strengthen claims.".to_string());
    }

    score.min(100.0)
}

impl ContentAnalyzer {
    /// Creates an analyzer that consults `gate` for relevance and elaboration.
    pub fn new(gate: OracleGate) -> Self {
        Self { gate }
    }

    /// Appends the oracle's elaboration, if it gives one.
    async fn elaborate(
        &self,
        input: &ContentSubmission,
        findings: Vec<String>,
        missing_concepts: Vec<String>,
        relevance: Verdict,
        feedback: &mut Vec<String>,
    ) {
        if !self.gate.is_enabled() {
            return;
        }

        let request = ElaborationRequest::builder()
            .kind(SubmissionKind::Content)
            .problem_statement(input.problem_statement.clone())
            .submission(input.content.clone())
            .rubric_context(input.guide.context())
            .findings(findings)
            .missing_concepts(missing_concepts)
            .relevance(relevance)
            .build();
        let lines = self.gate.elaborate(&request).await;
        if !lines.is_empty() {
            feedback.push(ELABORATION_SENTINEL.to_string());
            feedback.extend(lines);
        }
    }
}

impl Analyzer for ContentAnalyzer {
    type Input = ContentSubmission;

    async fn evaluate(&self, input: &ContentSubmission) -> AnalyzerResult {
        let mut feedback = Vec::new();
        let concepts = concepts::key_concepts(
            &input.guide,
            input.reference.as_deref(),
            &input.problem_statement,
        );

        let mut verdict = if self.gate.is_enabled() {
            self.gate
                .check_relevance(&input.problem_statement, &input.content, SubmissionKind::Content)
                .await
        } else {
            Verdict::Uncertain
        };

        match verdict {
            Verdict::Irrelevant => {
                feedback.push(IRRELEVANT_FEEDBACK.to_string());
                let findings = feedback.clone();
                self.elaborate(input, findings, Vec::new(), verdict, &mut feedback)
                    .await;
                debug!(%verdict, "Content rejected by the oracle");
                return AnalyzerResult::builder()
                    .max_score(CONTENT_MAX_SCORE)
                    .feedback(feedback)
                    .relevance(verdict)
                    .build();
            }
            Verdict::Partial => feedback.push(
                "⚠️ LLM found partial relevance. Proceeding with reduced scoring.".to_string(),
            ),
            Verdict::Relevant => {
                feedback.push("✓ LLM verified content is relevant to the prompt.".to_string())
            }
            Verdict::Uncertain => {}
        }

        let copied = if input.problem_statement.is_empty() || input.content.is_empty() {
            false
        } else {
            let ratio = similarity(&input.problem_statement, &input.content);
            debug!(ratio, "Prompt similarity");
            if ratio > COPY_SIMILARITY_THRESHOLD {
                feedback.push(format!(
                    "⚠️ Content is too similar to the problem statement ({}% match). Score \
                     penalized.",
                    (ratio * 100.0) as u32
                ));
                verdict = Verdict::Irrelevant;
                true
            } else {
                false
            }
        };

        let keywords =
            (!concepts.is_empty()).then(|| KeywordMatch::compute(&concepts, &input.content));
        let missing = keywords
            .as_ref()
            .map(|k| k.missing.clone())
            .unwrap_or_default();
        let coverage = score_coverage(keywords.as_ref(), !self.gate.is_enabled(), &mut feedback);
        debug!(
            concepts = concepts.len(),
            matched = keywords.as_ref().map(KeywordMatch::matched_count),
            coverage,
            copied,
            "Content coverage gate"
        );

        if coverage == 0.0 {
            feedback.push(NO_CONCEPTS_FOUND_FEEDBACK.to_string());
            let findings = feedback.clone();
            self.elaborate(input, findings, missing.clone(), Verdict::Irrelevant, &mut feedback)
                .await;
            return AnalyzerResult::builder()
                .max_score(CONTENT_MAX_SCORE)
                .feedback(feedback)
                .criteria(BTreeMap::from([(COVERAGE.to_string(), 0.0)]))
                .missing_concepts(missing)
                .relevance(verdict)
                .build();
        }

        let criteria = BTreeMap::from([
            (COVERAGE.to_string(), coverage),
            (ALIGNMENT.to_string(), score_alignment(&input.content, &input.guide, &mut feedback)),
            (FLOW.to_string(), score_flow(&input.content, &mut feedback)),
            (COMPLETENESS.to_string(), score_completeness(&input.content, &mut feedback)),
        ]);

        let mut score = [
            (COVERAGE, COVERAGE_WEIGHT),
            (ALIGNMENT, ALIGNMENT_WEIGHT),
            (FLOW, FLOW_WEIGHT),
            (COMPLETENESS, COMPLETENESS_WEIGHT),
        ]
        .iter()
        .map(|(name, weight)| criteria.get(*name).copied().unwrap_or(0.0) * weight)
        .sum::<f64>();
        if copied {
            score = score.min(COPY_SCORE_CAP);
        }
        let score = round_score(score).clamp(0.0, CONTENT_MAX_SCORE);

        let findings = feedback.iter().filter(|f| is_finding(f)).cloned().collect();
        self.elaborate(input, findings, missing.clone(), verdict, &mut feedback)
            .await;

        AnalyzerResult::builder()
            .score(score)
            .max_score(CONTENT_MAX_SCORE)
            .feedback(feedback)
            .criteria(criteria)
            .missing_concepts(missing)
            .relevance(verdict)
            .build()
    }
}
