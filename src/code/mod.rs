#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Heuristic scoring of code submissions.
//!
//! Four criteria are scored out of 100 each: approach (does the code address
//! the problem at all), readability, structure and effort. Approach doubles
//! as the relevance gate: a zero approach caps or zeroes everything else.

/// Python/C++ dialect detection.
pub mod dialect;
/// Tree-sitter parser wrapper.
pub mod parser;
/// Pattern scans for C++ sources.
pub mod patterns;
/// Tree-sitter queries for Python sources.
pub mod queries;

use std::collections::BTreeMap;

use anyhow::Result;
use bon::Builder;
use itertools::Itertools;
use tracing::{debug, warn};

pub use self::{dialect::Dialect, parser::Parser};
use self::queries::{
    ASSIGNMENT_QUERY, CONTROL_FLOW_QUERY, DEFINITION_QUERY, LEGACY_STATEMENT_QUERY,
};
use crate::{
    constants::{
        FALLBACK_APPROACH, IRRELEVANT_READABILITY_CAP, MAX_LINE_LEN, RELEVANCE_SATURATION,
    },
    feedback::{ELABORATION_SENTINEL, is_finding},
    oracle::{ElaborationRequest, OracleGate},
    relevance::{KeywordMatch, approach_score, code_candidates},
    types::{Analyzer, AnalyzerResult, SubmissionKind, Verdict, round_score},
};

/// Name of the approach criterion.
pub const APPROACH: &str = "approach";
/// Name of the readability criterion.
pub const READABILITY: &str = "readability";
/// Name of the structure criterion.
pub const STRUCTURE: &str = "structure";
/// Name of the effort criterion.
pub const EFFORT: &str = "effort";

/// The single feedback line of a submission that does not parse.
pub const SYNTAX_ERROR_FEEDBACK: &str = "❌ Code has syntax errors. Review and fix them.";

/// Number of missing concepts listed when no oracle explains them.
const MISSING_CONCEPT_HINTS: usize = 3;

/// Criterion weights used when the caller supplies none.
pub fn default_weights() -> BTreeMap<String, f64> {
    BTreeMap::from([
        (APPROACH.to_string(), 0.4),
        (READABILITY.to_string(), 0.2),
        (STRUCTURE.to_string(), 0.2),
        (EFFORT.to_string(), 0.2),
    ])
}

/// One code submission and the context it is graded in.
#[derive(Debug, Clone, Default, Builder)]
#[builder(on(String, into))]
pub struct CodeSubmission {
    /// The assignment prompt.
    #[builder(default)]
    pub problem_statement: String,
    /// The student's source code.
    pub code:              String,
    /// File name, used as the dialect hint.
    pub filename:          Option<String>,
    /// Criterion weights by name; empty means [`default_weights`].
    #[builder(default)]
    pub weights:           BTreeMap<String, f64>,
}

/// Scores code submissions.
///
/// Holds no per-submission state, so one analyzer can score many submissions
/// concurrently.
#[derive(Debug, Clone, Default)]
pub struct CodeAnalyzer {
    /// Access to the optional semantic oracle.
    gate: OracleGate,
}

/// Structural facts gathered from a submission before scoring.
#[derive(Debug, Clone, Default, PartialEq)]
struct CodeFacts {
    /// Lines longer than [`MAX_LINE_LEN`] after trimming.
    long_lines:      usize,
    /// Comment lines or blocks.
    comments:        usize,
    /// Function definitions (C++: function-like declarations).
    functions:       usize,
    /// Class definitions.
    classes:         usize,
    /// Whether the code assigns variables (Python only).
    assignments:     bool,
    /// Whether the code uses namespaces (C++ only).
    namespaces:      bool,
    /// Whether the code has an include guard (C++ only).
    include_guard:   bool,
    /// Non-empty, non-comment lines.
    code_lines:      usize,
    /// Branches and loops.
    control_flow:    usize,
    /// Points awarded for any control flow.
    control_credit:  f64,
    /// Whether the facts came from a syntax tree rather than pattern scans.
    tree_based:      bool,
}

/// Outcome of inspecting a submission.
enum Inspection {
    /// The Python source does not parse.
    SyntaxError,
    /// Facts ready for scoring.
    Facts(CodeFacts),
}

/// Gathers the dialect-independent line statistics.
fn line_facts(code: &str, dialect: Dialect) -> CodeFacts {
    let long_lines = code
        .lines()
        .filter(|line| line.trim().chars().count() > MAX_LINE_LEN)
        .count();
    let code_lines = code
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !dialect.is_comment_line(line))
        .count();

    CodeFacts {
        long_lines,
        code_lines,
        ..CodeFacts::default()
    }
}

/// Inspects a submission in its dialect.
fn inspect(code: &str, dialect: Dialect) -> Result<Inspection> {
    let mut facts = line_facts(code, dialect);

    match dialect {
        Dialect::Python => {
            let parser = Parser::new(code)?;
            if parser.has_syntax_errors() {
                debug!(line = ?parser.first_error_line(), "Python submission has syntax errors");
                return Ok(Inspection::SyntaxError);
            }
            if parser.count_matches(LEGACY_STATEMENT_QUERY)? > 0 {
                debug!("Python submission uses Python 2 statements");
                return Ok(Inspection::SyntaxError);
            }

            facts.comments = code
                .lines()
                .filter(|line| line.trim_start().starts_with('#'))
                .count();
            facts.functions = parser.count_matches(DEFINITION_QUERY)?;
            facts.assignments = parser.count_matches(ASSIGNMENT_QUERY)? > 0;
            facts.control_flow = parser.count_matches(CONTROL_FLOW_QUERY)?;
            facts.control_credit = 40.0;
            facts.tree_based = true;
        }
        Dialect::Cpp => {
            facts.comments = patterns::comment_count(code);
            facts.functions = patterns::function_count(code);
            facts.classes = patterns::class_count(code);
            facts.namespaces = patterns::uses_namespaces(code);
            facts.include_guard = patterns::has_include_guard(code);
            facts.control_flow = patterns::control_flow_count(code);
            facts.control_credit = 20.0;
        }
    }

    Ok(Inspection::Facts(facts))
}

/// Raw readability: short lines (+60) and comments (+40).
fn score_readability(facts: &CodeFacts, feedback: &mut Vec<String>) -> f64 {
    let mut score = 0.0;

    if facts.long_lines == 0 {
        score += 60.0;
        feedback.push("✓ Line length is appropriate for readability.".to_string());
    } else {
        feedback.push(format!(
            "→ {} lines exceed {MAX_LINE_LEN} characters. Break them into shorter lines.",
            facts.long_lines
        ));
    }

    if facts.comments > 0 {
        score += 40.0;
        feedback.push(format!("✓ Code includes comments ({} found).", facts.comments));
    } else {
        feedback.push("→ Add comments to explain your logic.".to_string());
    }

    score
}

/// Raw structure: definitions (+60) and assignments, namespaces or include
/// guards (+40).
fn score_structure(facts: &CodeFacts, feedback: &mut Vec<String>) -> f64 {
    let mut score = 0.0;
    let definitions = facts.functions + facts.classes;

    if definitions > 0 {
        score += 60.0;
        if facts.tree_based {
            feedback.push(format!(
                "✓ Code is organized with functions or classes ({definitions} found)."
            ));
        } else {
            feedback.push(format!(
                "✓ Code is organized with {} function(s) and {} class(es).",
                facts.functions, facts.classes
            ));
        }
    } else {
        feedback.push("→ Consider organizing code with functions or classes.".to_string());
    }

    if facts.tree_based {
        if facts.assignments {
            score += 40.0;
            feedback.push("✓ Code uses variable assignments (structured logic).".to_string());
        } else {
            feedback.push("→ Store intermediate results in well-named variables.".to_string());
        }
    } else if facts.namespaces {
        score += 40.0;
        feedback.push("✓ Code uses namespaces (good C++ practice).".to_string());
    } else if facts.include_guard {
        score += 40.0;
        feedback.push("✓ Header guards detected (good practice).".to_string());
    } else {
        feedback.push("→ Use namespaces or header guards to organize declarations.".to_string());
    }

    score
}

/// Raw effort: line count (+60 or +30) and control flow (+40 Python, +20
/// C++).
fn score_effort(facts: &CodeFacts, feedback: &mut Vec<String>) -> f64 {
    let mut score = 0.0;

    if facts.code_lines > 5 {
        score += 60.0;
        feedback.push(format!("✓ Substantial code submission ({} lines).", facts.code_lines));
    } else if facts.code_lines > 0 {
        score += 30.0;
        feedback
            .push("→ Your solution is brief. Consider adding more logic or cases.".to_string());
    } else {
        feedback.push("→ Your solution is very minimal. Add more implementation.".to_string());
    }

    if facts.control_flow > 0 {
        score += facts.control_credit;
        feedback.push(format!(
            "✓ Code includes control flow ({} conditions/loops).",
            facts.control_flow
        ));
    } else {
        feedback.push("→ Add conditions or loops where the problem calls for them.".to_string());
    }

    score
}

/// Appends a "Missing: ..." hint listing the first few missing concepts.
fn with_missing_hint(line: String, missing: &[String]) -> String {
    if missing.is_empty() {
        line
    } else {
        format!(
            "{line} Missing: {}",
            missing.iter().take(MISSING_CONCEPT_HINTS).join(", ")
        )
    }
}

/// Formats criterion weights for the elaboration request.
fn rubric_context(weights: &BTreeMap<String, f64>) -> String {
    weights
        .iter()
        .map(|(name, weight)| format!("{name} (weight {weight:.2})"))
        .join(", ")
}

impl CodeAnalyzer {
    /// Creates an analyzer that consults `gate` for relevance and elaboration.
    pub fn new(gate: OracleGate) -> Self {
        Self { gate }
    }

    /// Decides the approach score and writes its feedback.
    ///
    /// When the problem statement yields no candidate concepts the approach
    /// gets the neutral fallback for every verdict except `IRRELEVANT`, so a
    /// `RELEVANT` or `PARTIAL` answer on a vague prompt still scores 75.
    async fn approach(
        &self,
        input: &CodeSubmission,
        keywords: &KeywordMatch,
        feedback: &mut Vec<String>,
    ) -> (f64, Verdict) {
        let verdict = if input.problem_statement.trim().is_empty() {
            Verdict::Uncertain
        } else {
            self.gate
                .check_relevance(&input.problem_statement, &input.code, SubmissionKind::Code)
                .await
        };
        let hints = !self.gate.is_enabled();
        let found = format!("{}/{}", keywords.matched_count(), keywords.total());

        let approach = match verdict {
            Verdict::Irrelevant => {
                feedback.push(
                    "❌ Semantic check: the code does not address the problem statement."
                        .to_string(),
                );
                0.0
            }
            _ if keywords.is_empty() => {
                feedback.push(
                    "ℹ No problem concepts available for comparison; approach scored on a \
                     neutral default."
                        .to_string(),
                );
                FALLBACK_APPROACH
            }
            _ => {
                match verdict {
                    Verdict::Relevant => {
                        feedback.push("✓ Code is relevant to the problem statement.".to_string())
                    }
                    Verdict::Partial => feedback.push(
                        "→ Code only partially addresses the problem statement.".to_string(),
                    ),
                    _ => {}
                }

                let score = approach_score(verdict, keywords);
                let missing: &[String] = if hints { &keywords.missing } else { &[] };
                if score == 0.0 {
                    feedback.push(with_missing_hint(
                        format!(
                            "❌ Code does not appear to address the problem statement ({found} \
                             concepts found)."
                        ),
                        missing,
                    ));
                } else if keywords.matched_count() > 0 {
                    feedback.push(with_missing_hint(
                        format!("✓ Code addresses problem concepts ({found} matches)."),
                        missing,
                    ));
                } else {
                    feedback.push(
                        "→ Ensure your solution directly addresses the problem statement."
                            .to_string(),
                    );
                }
                score
            }
        };

        debug!(
            %verdict,
            ratio = keywords.ratio(),
            matched = keywords.matched_count(),
            approach,
            "Code relevance gate"
        );
        (approach, verdict)
    }
}

impl Analyzer for CodeAnalyzer {
    type Input = CodeSubmission;

    async fn evaluate(&self, input: &CodeSubmission) -> AnalyzerResult {
        let weights = if input.weights.is_empty() {
            default_weights()
        } else {
            input.weights.clone()
        };
        let max_score = round_score(weights.values().sum::<f64>() * 100.0);
        let dialect = Dialect::detect(input.filename.as_deref(), &input.code);
        debug!(file = ?input.filename, %dialect, "Scoring code submission");

        let facts = match inspect(&input.code, dialect) {
            Ok(Inspection::Facts(facts)) => facts,
            Ok(Inspection::SyntaxError) => {
                return AnalyzerResult::builder()
                    .max_score(max_score)
                    .feedback(vec![SYNTAX_ERROR_FEEDBACK.to_string()])
                    .build();
            }
            Err(e) => {
                warn!(error = %e, file = ?input.filename, "Could not inspect code submission");
                return AnalyzerResult::builder()
                    .max_score(max_score)
                    .feedback(vec![SYNTAX_ERROR_FEEDBACK.to_string()])
                    .build();
            }
        };

        let mut feedback = Vec::new();
        let candidates = code_candidates(&input.problem_statement);
        let keywords = KeywordMatch::compute(&candidates, &input.code);
        let (approach, verdict) = self.approach(input, &keywords, &mut feedback).await;

        let mut criteria = BTreeMap::from([(APPROACH.to_string(), approach)]);
        if approach == 0.0 {
            let readability =
                score_readability(&facts, &mut feedback).min(IRRELEVANT_READABILITY_CAP);
            feedback.push(
                "❌ Structure and effort earn no credit until the code addresses the problem."
                    .to_string(),
            );
            criteria.insert(READABILITY.to_string(), readability);
            criteria.insert(STRUCTURE.to_string(), 0.0);
            criteria.insert(EFFORT.to_string(), 0.0);
        } else {
            let multiplier = approach.min(RELEVANCE_SATURATION) / RELEVANCE_SATURATION;
            let readability = score_readability(&facts, &mut feedback) * multiplier;
            let structure = score_structure(&facts, &mut feedback) * multiplier;
            let effort = score_effort(&facts, &mut feedback) * multiplier;
            criteria.insert(READABILITY.to_string(), round_score(readability));
            criteria.insert(STRUCTURE.to_string(), round_score(structure));
            criteria.insert(EFFORT.to_string(), round_score(effort));
        }

        let score = weights
            .iter()
            .map(|(name, weight)| criteria.get(name).copied().unwrap_or(0.0) * weight)
            .sum::<f64>();
        let score = round_score(score).clamp(0.0, max_score.max(0.0));

        if self.gate.is_enabled() {
            let request = ElaborationRequest::builder()
                .kind(SubmissionKind::Code)
                .problem_statement(input.problem_statement.clone())
                .submission(input.code.clone())
                .rubric_context(rubric_context(&weights))
                .findings(feedback.iter().filter(|f| is_finding(f)).cloned().collect())
                .missing_concepts(keywords.missing.clone())
                .relevance(verdict)
                .build();
            let lines = self.gate.elaborate(&request).await;
            if !lines.is_empty() {
                feedback.push(ELABORATION_SENTINEL.to_string());
                feedback.extend(lines);
            }
        }

        AnalyzerResult::builder()
            .score(score)
            .max_score(max_score)
            .feedback(feedback)
            .criteria(criteria)
            .missing_concepts(keywords.missing)
            .relevance(verdict)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_facts_come_from_the_tree() {
        let code = r#"# add two numbers
def add(a, b):
    total = a + b
    if total > 0:
        return total
    return 0
"#;
        let Inspection::Facts(facts) = inspect(code, Dialect::Python).unwrap() else {
            panic!("expected facts");
        };
        assert_eq!(facts.functions, 1);
        assert!(facts.assignments);
        assert_eq!(facts.control_flow, 1);
        assert_eq!(facts.comments, 1);
        assert_eq!(facts.code_lines, 5);
    }

    #[test]
    fn malformed_python_is_a_syntax_error() {
        assert!(matches!(
            inspect("def broken(:\n    pass", Dialect::Python).unwrap(),
            Inspection::SyntaxError
        ));
    }

    #[test]
    fn annotations_are_not_assignments() {
        for code in ["x: int\n", "count: int = 0\n"] {
            let Inspection::Facts(facts) = inspect(code, Dialect::Python).unwrap() else {
                panic!("expected facts for {code:?}");
            };
            assert!(!facts.assignments, "{code:?}");
        }
        let Inspection::Facts(facts) = inspect("x = 1\n", Dialect::Python).unwrap() else {
            panic!("expected facts");
        };
        assert!(facts.assignments);
    }

    #[test]
    fn python2_statements_are_syntax_errors() {
        for code in ["print \"hello\"\n", "exec \"x = 1\"\n"] {
            assert!(
                matches!(inspect(code, Dialect::Python).unwrap(), Inspection::SyntaxError),
                "{code:?}"
            );
        }
        assert!(matches!(
            inspect("print(\"hello\")\n", Dialect::Python).unwrap(),
            Inspection::Facts(_)
        ));
    }

    #[test]
    fn control_flow_credit_differs_by_dialect() {
        let mut python = CodeFacts {
            control_flow: 1,
            control_credit: 40.0,
            code_lines: 6,
            ..CodeFacts::default()
        };
        assert_eq!(score_effort(&python, &mut Vec::new()), 100.0);
        python.control_credit = 20.0;
        assert_eq!(score_effort(&python, &mut Vec::new()), 80.0);
    }
}
