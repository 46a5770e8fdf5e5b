#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Combines analyzer outputs into one curved score with organised feedback.

use tracing::debug;

use crate::{
    constants::{LOW_CURVE_CEILING, LOW_CURVE_FACTOR, MID_CURVE_CEILING, MID_CURVE_FACTOR},
    feedback,
    types::{AggregatedResult, AnalyzerResult, round_score},
};

/// Feedback of the placeholder result for an empty input.
pub const NO_OUTPUTS_FEEDBACK: &str = "No agent outputs to evaluate.";

/// Forgiving curve: scores below 40 are boosted by 10% (never past 40),
/// scores in `[40, 60)` by 5%, higher scores are unchanged. It never lowers a
/// score, but the top of the middle band lands above 60.
pub fn curve(score: f64) -> f64 {
    if score < LOW_CURVE_CEILING {
        (score * LOW_CURVE_FACTOR).min(LOW_CURVE_CEILING)
    } else if score < MID_CURVE_CEILING {
        score * MID_CURVE_FACTOR
    } else {
        score
    }
}

/// Fits a weight list to `count` outputs and normalises it to sum to 1.
///
/// A short list is padded by splitting whatever is left of 1.0 evenly over
/// the missing entries; a long list is truncated. `None`, or a list whose
/// total is not positive, yields equal weights.
pub fn resolve_weights(weights: Option<&[f64]>, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let equal = || vec![1.0 / count as f64; count];

    let Some(weights) = weights else {
        return equal();
    };

    let mut fitted: Vec<f64> = weights.iter().copied().take(count).collect();
    if fitted.len() < count {
        let missing = count - fitted.len();
        let remaining = 1.0 - fitted.iter().sum::<f64>();
        fitted.extend(std::iter::repeat_n(remaining / missing as f64, missing));
    }

    let total: f64 = fitted.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return equal();
    }
    fitted.iter().map(|w| w / total).collect()
}

/// Combines analyzer outputs. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator;

impl Aggregator {
    /// Creates an aggregator.
    pub fn new() -> Self {
        Self
    }

    /// Normalises each output to 0-100, takes the weighted sum, applies the
    /// [`curve`], and combines the feedback.
    ///
    /// An empty input yields a zero score with a single explanatory line.
    pub fn aggregate(
        &self,
        outputs: &[AnalyzerResult],
        weights: Option<&[f64]>,
    ) -> AggregatedResult {
        if outputs.is_empty() {
            return AggregatedResult {
                final_score:       0.0,
                max_score:         100.0,
                combined_feedback: vec![NO_OUTPUTS_FEEDBACK.to_string()],
            };
        }

        let weights = resolve_weights(weights, outputs.len());
        let weighted: f64 = outputs
            .iter()
            .zip(&weights)
            .map(|(output, weight)| output.normalized() * weight)
            .sum();
        let final_score = round_score(curve(weighted));
        debug!(outputs = outputs.len(), ?weights, weighted, final_score, "Aggregated scores");

        let all_feedback = outputs
            .iter()
            .flat_map(|output| output.feedback.iter().cloned())
            .collect();

        AggregatedResult {
            final_score,
            max_score: 100.0,
            combined_feedback: feedback::combine(all_feedback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_weight_lists_are_padded_from_the_remainder() {
        let w = resolve_weights(Some([0.6].as_slice()), 3);
        assert_eq!(w.len(), 3);
        assert!((w[0] - 0.6).abs() < 1e-9);
        assert!((w[1] - 0.2).abs() < 1e-9);
        assert!((w[2] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn long_weight_lists_are_truncated_and_renormalised() {
        let w = resolve_weights(Some([0.6, 0.4].as_slice()), 1);
        assert_eq!(w, vec![1.0]);
    }

    #[test]
    fn degenerate_weights_fall_back_to_equal() {
        assert_eq!(resolve_weights(Some([0.0, 0.0].as_slice()), 2), vec![0.5, 0.5]);
        assert_eq!(resolve_weights(None, 4), vec![0.25; 4]);
    }
}
