//! Tests for the code analyzer and its relevance gate.

mod common;

use common::{FailingOracle, ScriptedOracle, SlowOracle, gate};
use rubricate::{
    Analyzer, CodeAnalyzer, CodeSubmission, OracleGate, Verdict,
    code::{APPROACH, EFFORT, READABILITY, STRUCTURE, SYNTAX_ERROR_FEEDBACK},
    feedback::ELABORATION_SENTINEL,
};
use std::sync::Arc;

const FACTORIAL_PROBLEM: &str = "Compute the factorial of a given integer recursively";

const FACTORIAL_CODE: &str = r#"# factorial of an integer
def factorial(n):
    if n <= 1:
        return 1
    return n * factorial(n - 1)
"#;

const GREETING_CODE: &str = r#"# greet the user
def greet(name):
    message = "Hello " + name
    print(message)
"#;

fn submission(code: &str, filename: &str) -> CodeSubmission {
    CodeSubmission::builder()
        .problem_statement(FACTORIAL_PROBLEM)
        .code(code)
        .filename(filename.to_string())
        .build()
}

fn criterion(result: &rubricate::AnalyzerResult, name: &str) -> f64 {
    *result.criteria.get(name).expect("criterion present")
}

#[tokio::test]
async fn syntax_error_scores_zero_with_one_line() {
    let result = CodeAnalyzer::default()
        .evaluate(&submission("def broken(:\n    pass", "broken.py"))
        .await;

    assert_eq!(result.score, 0.0);
    assert_eq!(result.max_score, 100.0);
    assert_eq!(result.feedback, vec![SYNTAX_ERROR_FEEDBACK.to_string()]);
}

#[tokio::test]
async fn python2_statements_score_zero_with_one_line() {
    let sources = [
        "# factorial of an integer\nprint \"factorial\"\n",
        "def factorial(n):\n    print n\n    return 1\n",
        "exec \"factorial = 1\"\n",
    ];
    for code in sources {
        let result = CodeAnalyzer::default()
            .evaluate(&submission(code, "legacy.py"))
            .await;

        assert_eq!(result.score, 0.0, "{code:?}");
        assert_eq!(result.feedback, vec![SYNTAX_ERROR_FEEDBACK.to_string()], "{code:?}");
    }
}

#[tokio::test]
async fn keyword_fallback_passes_with_two_matches() {
    let result = CodeAnalyzer::default()
        .evaluate(&submission(FACTORIAL_CODE, "fact.py"))
        .await;

    assert_eq!(result.relevance, Verdict::Uncertain);
    assert_eq!(criterion(&result, APPROACH), 75.0);
    assert_eq!(criterion(&result, READABILITY), 100.0);
    assert_eq!(criterion(&result, STRUCTURE), 60.0);
    assert_eq!(criterion(&result, EFFORT), 70.0);
    assert_eq!(result.score, 76.0);
    assert!(result.missing_concepts.contains(&"compute".to_string()));
}

#[tokio::test]
async fn unrelated_code_fails_closed_without_an_oracle() {
    let result = CodeAnalyzer::default()
        .evaluate(&submission(GREETING_CODE, "greet.py"))
        .await;

    assert_eq!(criterion(&result, APPROACH), 0.0);
    assert!(criterion(&result, READABILITY) <= 10.0);
    assert_eq!(criterion(&result, STRUCTURE), 0.0);
    assert_eq!(criterion(&result, EFFORT), 0.0);
    assert!(result.score <= 2.0);
    assert!(
        result
            .feedback
            .iter()
            .any(|line| line.starts_with("❌") && line.contains("Missing:"))
    );
}

#[tokio::test]
async fn empty_problem_statement_uses_neutral_approach() {
    let input = CodeSubmission::builder()
        .code(FACTORIAL_CODE)
        .filename("fact.py".to_string())
        .build();
    let result = CodeAnalyzer::default().evaluate(&input).await;

    assert_eq!(criterion(&result, APPROACH), 75.0);
    assert!(result.feedback.iter().any(|line| line.starts_with("ℹ")));
}

#[tokio::test]
async fn vague_problem_is_neutral_for_any_accepting_verdict() {
    for verdict in [Verdict::Relevant, Verdict::Partial] {
        let oracle = ScriptedOracle::new(verdict, &[]);
        let input = CodeSubmission::builder()
            .problem_statement("Write a program")
            .code(FACTORIAL_CODE)
            .filename("fact.py".to_string())
            .build();
        let result = CodeAnalyzer::new(gate(oracle.clone())).evaluate(&input).await;

        assert_eq!(oracle.relevance_calls(), 1);
        assert_eq!(result.relevance, verdict);
        assert_eq!(criterion(&result, APPROACH), 75.0, "{verdict}");
        assert!(result.feedback.iter().any(|line| line.starts_with("ℹ")));
        assert!(result.missing_concepts.is_empty());
    }
}

#[tokio::test]
async fn cpp_is_scanned_with_patterns() {
    let code = r#"#include <vector>
// bubble sort over integers
namespace demo {
void bubble(std::vector<int>& values) {
    for (size_t i = 0; i + 1 < values.size(); i++) {
        if (values[i] > values[i + 1]) {
            std::swap(values[i], values[i + 1]);
        }
    }
}
}
"#;
    let input = CodeSubmission::builder()
        .problem_statement("Sort an array of integers using bubble sort")
        .code(code)
        .filename("sort.cpp".to_string())
        .build();
    let result = CodeAnalyzer::default().evaluate(&input).await;

    assert_ne!(result.feedback, vec![SYNTAX_ERROR_FEEDBACK.to_string()]);
    assert_eq!(criterion(&result, APPROACH), 75.0);
    assert!(result.feedback.iter().any(|line| line.contains("namespaces")));
    assert!(result.score > 0.0 && result.score <= result.max_score);
}

#[tokio::test]
async fn cpp_is_detected_from_content() {
    let input = CodeSubmission::builder()
        .code("#include <iostream>\nint main() { std::cout << 1; }")
        .build();
    let result = CodeAnalyzer::default().evaluate(&input).await;

    assert_ne!(result.feedback, vec![SYNTAX_ERROR_FEEDBACK.to_string()]);
}

#[tokio::test]
async fn oracle_irrelevant_zeroes_the_approach() {
    let oracle = ScriptedOracle::new(Verdict::Irrelevant, &["This solves another task."]);
    let analyzer = CodeAnalyzer::new(gate(oracle.clone()));
    let result = analyzer
        .evaluate(&submission(FACTORIAL_CODE, "fact.py"))
        .await;

    assert_eq!(criterion(&result, APPROACH), 0.0);
    assert_eq!(criterion(&result, STRUCTURE), 0.0);
    assert_eq!(result.relevance, Verdict::Irrelevant);
    assert_eq!(oracle.relevance_calls(), 1);
    assert_eq!(oracle.elaboration_calls(), 1);

    let sentinel = result
        .feedback
        .iter()
        .position(|line| line == ELABORATION_SENTINEL)
        .expect("elaboration appended");
    assert_eq!(result.feedback[sentinel + 1], "This solves another task.");
}

#[tokio::test]
async fn oracle_relevant_with_strong_overlap_earns_full_approach() {
    let oracle = ScriptedOracle::new(Verdict::Relevant, &[]);
    let result = CodeAnalyzer::new(gate(oracle.clone()))
        .evaluate(&submission(FACTORIAL_CODE, "fact.py"))
        .await;

    assert_eq!(criterion(&result, APPROACH), 100.0);
    assert_eq!(result.score, 86.0);
    assert!(!result.feedback.iter().any(|line| line.contains("Missing:")));
    assert!(!result.feedback.iter().any(|line| line == ELABORATION_SENTINEL));
}

#[tokio::test]
async fn oracle_partial_caps_dependent_criteria() {
    let oracle = ScriptedOracle::new(Verdict::Partial, &[]);
    let result = CodeAnalyzer::new(gate(oracle))
        .evaluate(&submission(GREETING_CODE, "greet.py"))
        .await;

    assert_eq!(criterion(&result, APPROACH), 30.0);
    assert_eq!(criterion(&result, READABILITY), 50.0);
}

#[tokio::test]
async fn failing_oracle_degrades_to_keywords() {
    let oracle = Arc::new(FailingOracle::default());
    let result = CodeAnalyzer::new(gate(oracle.clone()))
        .evaluate(&submission(FACTORIAL_CODE, "fact.py"))
        .await;

    assert_eq!(result.relevance, Verdict::Uncertain);
    assert_eq!(criterion(&result, APPROACH), 75.0);
    assert_eq!(result.score, 76.0);
    // Two relevance attempts and two elaboration attempts.
    assert_eq!(oracle.calls(), 4);
}

#[tokio::test]
async fn slow_oracle_times_out() {
    let oracle = Arc::new(SlowOracle::default());
    let result = CodeAnalyzer::new(gate(oracle))
        .evaluate(&submission(FACTORIAL_CODE, "fact.py"))
        .await;

    assert_eq!(result.relevance, Verdict::Uncertain);
    assert_eq!(result.score, 76.0);
}

#[tokio::test]
async fn scores_stay_within_bounds() {
    let analyzer = CodeAnalyzer::new(OracleGate::disabled());
    for (code, name) in [
        (FACTORIAL_CODE, "a.py"),
        (GREETING_CODE, "b.py"),
        ("", "c.py"),
        ("int main() { return 0; }", "d.cpp"),
    ] {
        let result = analyzer.evaluate(&submission(code, name)).await;
        assert!(result.score >= 0.0, "{name}");
        assert!(result.score <= result.max_score, "{name}");
    }
}
