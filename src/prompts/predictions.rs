//! Turning model completions back into located ratings.

use serde::Serialize;
use tracing::{debug, warn};

use crate::dataset::PredictionRecord;
use crate::error::PromptError;

use super::parsing::{extract_coordinates, extract_rating};

/// Ratings recovered from a batch of completions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedPredictions {
    /// One record per prompt whose completion held a rating, in prompt order.
    pub records: Vec<PredictionRecord>,
    /// Prompts dropped because the prompt had no coordinates or the
    /// completion had no rating.
    pub skipped: usize,
}

impl CollectedPredictions {
    /// Prompts that were issued, answered or not.
    pub fn prompts(&self) -> usize {
        self.records.len() + self.skipped
    }
}

/// Pairs each prompt with its completion and keeps the parseable ratings.
///
/// `prompts` and `completions` must be aligned. A pair is skipped, not
/// rejected, when either side cannot be parsed.
pub fn collect_predictions(
    prompts: &[String],
    completions: &[String],
) -> Result<CollectedPredictions, PromptError> {
    if prompts.len() != completions.len() {
        return Err(PromptError::CompletionMismatch {
            prompts: prompts.len(),
            completions: completions.len(),
        });
    }

    let mut records = Vec::with_capacity(prompts.len());
    let mut skipped = 0;

    for (i, (prompt, completion)) in prompts.iter().zip(completions).enumerate() {
        let location = match extract_coordinates(prompt) {
            Ok(location) => location,
            Err(e) => {
                warn!(prompt = i + 1, error = %e, "Skipping prompt without coordinates");
                skipped += 1;
                continue;
            }
        };

        let Some(rating) = extract_rating(completion) else {
            debug!(prompt = i + 1, completion = %completion, "No rating in completion");
            skipped += 1;
            continue;
        };

        records.push(PredictionRecord {
            latitude: location.lat,
            longitude: location.lon,
            prediction: rating,
        });
    }

    Ok(CollectedPredictions { records, skipped })
}
