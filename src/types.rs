#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Records passed between the analyzers, the aggregator and callers.

use std::{collections::BTreeMap, fmt::Display, future::Future, str::FromStr};

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::GradingError;

/// Rounds a score to two decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Which analyzer a submission is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    /// Source code.
    #[default]
    Code,
    /// Written text.
    Content,
}

impl SubmissionKind {
    /// Returns the lowercase name used in prompts and result records.
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionKind::Code => "code",
            SubmissionKind::Content => "content",
        }
    }
}

impl Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Relevance verdict returned by the semantic oracle.
///
/// `Uncertain` stands in whenever the oracle is disabled, unreachable, or
/// answered in a way that could not be parsed. Callers treat it as "no
/// opinion" and fall back to their own heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// The submission genuinely attempts the task.
    Relevant,
    /// The submission touches the task but is incomplete or off-track.
    Partial,
    /// The submission is for a different task or is boilerplate.
    Irrelevant,
    /// No usable verdict.
    #[default]
    Uncertain,
}

impl Verdict {
    /// Returns the uppercase wire name of the verdict.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Relevant => "RELEVANT",
            Verdict::Partial => "PARTIAL",
            Verdict::Irrelevant => "IRRELEVANT",
            Verdict::Uncertain => "UNCERTAIN",
        }
    }

    /// Extracts a verdict from a free-text oracle answer.
    ///
    /// An explicit `Verdict: X` line wins. Otherwise the bare words are
    /// scanned, with `IRRELEVANT` checked before `RELEVANT` since the latter is
    /// a substring of the former. Returns `None` if nothing matches.
    pub fn parse_response(text: &str) -> Option<Verdict> {
        let text = text.trim().to_uppercase();

        for verdict in
            [Verdict::Relevant, Verdict::Partial, Verdict::Irrelevant, Verdict::Uncertain]
        {
            let spaced = format!("VERDICT: {}", verdict.as_str());
            let tight = format!("VERDICT:{}", verdict.as_str());
            if text.contains(&spaced) || text.contains(&tight) {
                return Some(verdict);
            }
        }

        if text.contains("RELEVANT") && !text.contains("IRRELEVANT") && !text.contains("PARTIAL")
        {
            return Some(Verdict::Relevant);
        }
        if text.contains("IRRELEVANT") {
            return Some(Verdict::Irrelevant);
        }
        if text.contains("PARTIAL") {
            return Some(Verdict::Partial);
        }

        None
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of a single analyzer run over one submission.
#[derive(Debug, Clone, Default, Builder, Serialize, Deserialize)]
pub struct AnalyzerResult {
    /// Weighted score, `0 <= score <= max_score`.
    #[builder(default)]
    pub score:            f64,
    /// Maximum attainable score for this analyzer.
    pub max_score:        f64,
    /// Ordered feedback lines.
    #[builder(default)]
    pub feedback:         Vec<String>,
    /// Final score of each sub-criterion after gating.
    #[builder(default)]
    pub criteria:         BTreeMap<String, f64>,
    /// Concepts the submission did not mention, for the elaboration request.
    #[builder(default)]
    pub missing_concepts: Vec<String>,
    /// Relevance verdict used while scoring.
    #[builder(default)]
    pub relevance:        Verdict,
}

impl AnalyzerResult {
    /// Returns the score normalised to a 0-100 scale.
    ///
    /// A zero `max_score` normalises to 0.
    pub fn normalized(&self) -> f64 {
        if self.max_score == 0.0 {
            0.0
        } else {
            self.score / self.max_score * 100.0
        }
    }
}

/// A stateless scorer for one kind of submission.
///
/// Evaluation never fails: malformed input and oracle outages degrade into
/// the returned result.
pub trait Analyzer {
    /// Everything needed to score one submission.
    type Input: Sync;

    /// Scores one submission.
    fn evaluate(&self, input: &Self::Input) -> impl Future<Output = AnalyzerResult> + Send;
}

/// Combined score and organised feedback for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Curved final score on a 0-100 scale.
    pub final_score:       f64,
    /// Always 100.
    pub max_score:         f64,
    /// De-duplicated, bucketed feedback.
    pub combined_feedback: Vec<String>,
}

/// How the submissions of an assignment are graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    /// Every submission is code.
    Code,
    /// Every submission is written content.
    Content,
    /// Students hand in code and/or content, graded jointly.
    Mixed,
}

impl AssignmentType {
    /// Returns the lowercase name of the assignment type.
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentType::Code => "code",
            AssignmentType::Content => "content",
            AssignmentType::Mixed => "mixed",
        }
    }
}

impl FromStr for AssignmentType {
    type Err = GradingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" => Ok(AssignmentType::Code),
            "content" => Ok(AssignmentType::Content),
            "mixed" => Ok(AssignmentType::Mixed),
            _ => Err(GradingError::InvalidAssignmentType(s.to_string())),
        }
    }
}

impl Display for AssignmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final record for one student, keyed by student identifier in the
/// orchestrator output.
///
/// Field names are stable; downstream exporters rely on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentResult {
    /// Curved final score.
    pub final_score:       f64,
    /// Always 100.
    pub max_score:         f64,
    /// Organised feedback.
    pub combined_feedback: Vec<String>,
    /// Assignment type the result was produced under.
    pub assignment_type:   AssignmentType,
    /// Source file name, absent for mixed results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file:              Option<String>,
    /// Number of analyzer outputs that were aggregated.
    pub analyzer_count:    usize,
}

impl StudentResult {
    /// Wraps an aggregated result with its provenance.
    pub fn new(
        aggregated: AggregatedResult,
        assignment_type: AssignmentType,
        file: Option<String>,
        analyzer_count: usize,
    ) -> Self {
        Self {
            final_score: aggregated.final_score,
            max_score: aggregated.max_score,
            combined_feedback: aggregated.combined_feedback,
            assignment_type,
            file,
            analyzer_count,
        }
    }

    /// Returns the final score as a percentage of the maximum.
    pub fn percentage(&self) -> f64 {
        if self.max_score > 0.0 {
            self.final_score / self.max_score * 100.0
        } else {
            0.0
        }
    }
}

/// Aggregate statistics over a batch of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of graded students.
    pub total_submissions:  usize,
    /// Mean final score.
    pub average_score:      f64,
    /// Mean percentage of the maximum score.
    pub average_percentage: f64,
    /// Highest final score.
    pub highest_score:      f64,
    /// Lowest final score.
    pub lowest_score:       f64,
}

impl Summary {
    /// Computes summary statistics, or `None` for an empty batch.
    pub fn from_results<'a, I>(results: I) -> Option<Summary>
    where
        I: IntoIterator<Item = &'a StudentResult>,
    {
        let results: Vec<&StudentResult> = results.into_iter().collect();
        if results.is_empty() {
            return None;
        }

        let count = results.len() as f64;
        let scores = results.iter().map(|r| r.final_score);

        Some(Summary {
            total_submissions:  results.len(),
            average_score:      round_score(scores.clone().sum::<f64>() / count),
            average_percentage: round_score(
                results.iter().map(|r| round_score(r.percentage())).sum::<f64>() / count,
            ),
            highest_score:      scores.clone().fold(f64::MIN, f64::max),
            lowest_score:       scores.fold(f64::MAX, f64::min),
        })
    }
}
