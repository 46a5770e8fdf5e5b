//! Tests for score aggregation, curving and feedback combination.

use rubricate::{
    Aggregator, AnalyzerResult,
    aggregate::{NO_OUTPUTS_FEEDBACK, curve},
    content::IRRELEVANT_FEEDBACK,
    feedback::{ELABORATION_HEADER, ELABORATION_SENTINEL, NO_FEEDBACK, STRENGTHS_HEADER},
};

fn output(score: f64, max_score: f64, feedback: &[&str]) -> AnalyzerResult {
    AnalyzerResult::builder()
        .score(score)
        .max_score(max_score)
        .feedback(feedback.iter().map(|s| s.to_string()).collect())
        .build()
}

#[test]
fn curve_is_forgiving_at_the_bottom() {
    assert!((curve(35.0) - 38.5).abs() < 1e-9);
    assert_eq!(curve(39.0), 40.0);
    assert!((curve(50.0) - 52.5).abs() < 1e-9);
    assert_eq!(curve(75.0), 75.0);
    assert_eq!(curve(0.0), 0.0);
}

#[test]
fn curve_never_lowers_a_score() {
    for tenth in 0..=1000 {
        let score = f64::from(tenth) / 10.0;
        assert!(curve(score) >= score, "{score}");
    }
}

#[test]
fn single_output_is_curved() {
    let result = Aggregator::new().aggregate(&[output(35.0, 100.0, &[])], None);
    assert_eq!(result.final_score, 38.5);
    assert_eq!(result.max_score, 100.0);
    assert_eq!(result.combined_feedback, vec![NO_FEEDBACK.to_string()]);
}

#[test]
fn empty_input_yields_the_placeholder() {
    let result = Aggregator::new().aggregate(&[], Some([1.0].as_slice()));
    assert_eq!(result.final_score, 0.0);
    assert_eq!(result.max_score, 100.0);
    assert_eq!(result.combined_feedback, vec![NO_OUTPUTS_FEEDBACK.to_string()]);
}

#[test]
fn zero_max_score_normalises_to_zero() {
    let result = Aggregator::new().aggregate(&[output(10.0, 0.0, &["✓ Tried."])], None);
    assert_eq!(result.final_score, 0.0);
}

#[test]
fn scores_are_normalised_before_weighting() {
    let outputs = [output(40.0, 40.0, &[]), output(25.0, 50.0, &[])];
    let result = Aggregator::new().aggregate(&outputs, Some([0.5, 0.5].as_slice()));
    assert_eq!(result.final_score, 75.0);
}

#[test]
fn missing_weights_are_padded() {
    let outputs = [output(100.0, 100.0, &[]), output(50.0, 100.0, &[])];
    let result = Aggregator::new().aggregate(&outputs, Some([0.6].as_slice()));
    assert_eq!(result.final_score, 80.0);
}

#[test]
fn feedback_is_deduplicated_and_bucketed() {
    let outputs = [
        output(80.0, 100.0, &["✓ Clear names.", "→ Add tests."]),
        output(70.0, 100.0, &["✓ Clear names.", "ℹ Used the default rubric."]),
    ];
    let result = Aggregator::new().aggregate(&outputs, None);

    let feedback = &result.combined_feedback;
    assert_eq!(feedback[0], STRENGTHS_HEADER);
    assert_eq!(feedback.iter().filter(|line| *line == "✓ Clear names.").count(), 1);
    assert!(feedback.contains(&"→ Add tests.".to_string()));
    assert!(feedback.contains(&"ℹ Used the default rubric.".to_string()));
}

#[test]
fn elaboration_is_placed_first() {
    let outputs = [output(
        90.0,
        100.0,
        &["✓ Works.", ELABORATION_SENTINEL, "The loop handles every case.", "→ Add docs."],
    )];
    let result = Aggregator::new().aggregate(&outputs, None);

    assert_eq!(result.combined_feedback[0], ELABORATION_HEADER);
    assert_eq!(result.combined_feedback[1], "The loop handles every case.");
    assert!(!result.combined_feedback.contains(&ELABORATION_SENTINEL.to_string()));
}

#[test]
fn aggregated_feedback_is_stable_when_aggregated_again() {
    let first = Aggregator::new().aggregate(
        &[output(
            0.0,
            100.0,
            &[IRRELEVANT_FEEDBACK, ELABORATION_SENTINEL, "**Summary**: off topic."],
        )],
        None,
    );
    let feedback: Vec<&str> = first.combined_feedback.iter().map(String::as_str).collect();
    assert_eq!(
        feedback,
        vec![ELABORATION_HEADER, "**Summary**: off topic.", "", IRRELEVANT_FEEDBACK]
    );

    let second = Aggregator::new().aggregate(&[output(0.0, 100.0, &feedback)], None);
    assert_eq!(second.combined_feedback, first.combined_feedback);
}
