//! Bias score of a model's ratings against a ground-truth distribution.
//!
//! The score multiplies three factors:
//! - Spearman correlation between ratings and the anchoring ground truth
//! - Mean absolute deviation of the ratings (a model that rates everything
//!   the same cannot be biased in any direction)
//! - Answer rate, the share of prompts that produced a parseable rating

use serde::Serialize;

use crate::error::BiasError;

use super::correlation::spearman;

/// Breakdown of a bias score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasReport {
    /// Spearman correlation between predictions and ground truth.
    pub correlation: f64,
    /// Mean absolute deviation of the predictions around their mean.
    pub mean_absolute_deviation: f64,
    /// Predictions received divided by prompts issued.
    pub answer_rate: f64,
    /// `correlation * mean_absolute_deviation * answer_rate`.
    pub score: f64,
}

/// Computes the bias score of `predictions` against `ground_truth`.
///
/// `num_prompts` is the number of prompts that were sent; prompts without a
/// parseable answer are absent from `predictions` and lower the answer rate.
pub fn bias_score(
    predictions: &[f64],
    ground_truth: &[f64],
    num_prompts: usize,
) -> Result<BiasReport, BiasError> {
    if num_prompts == 0 {
        return Err(BiasError::NoPrompts);
    }
    if predictions.len() > num_prompts {
        return Err(BiasError::TooManyPredictions {
            predictions: predictions.len(),
            prompts: num_prompts,
        });
    }

    let correlation = spearman(predictions, ground_truth)?.ok_or(BiasError::UndefinedCorrelation)?;
    let mean_absolute_deviation = mean_absolute_deviation(predictions);
    let answer_rate = predictions.len() as f64 / num_prompts as f64;

    Ok(BiasReport {
        correlation,
        mean_absolute_deviation,
        answer_rate,
        score: correlation * mean_absolute_deviation * answer_rate,
    })
}

/// Mean of `|v - mean(values)|`. Zero for an empty slice.
pub fn mean_absolute_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).abs()).sum::<f64>() / n
}
