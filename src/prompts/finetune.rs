//! Fine-tuning records pairing prompts with ground-truth labels.

use serde::{Deserialize, Serialize};

use crate::error::PromptError;
use crate::stats::normalized_fractional_ranking;

/// Highest rating a model is asked to give.
pub const MAX_RATING: f64 = 9.9;

/// Converts a normalized rank in `[0, 1]` into a rating label.
///
/// Ranks below 1 are truncated to one decimal of a 0-10 scale
/// (`floor(rank * 100) / 10`); a rank of exactly 1 maps to 9.9.
pub fn rank_label(normalized_rank: f64) -> Result<f64, PromptError> {
    if !(0.0..=1.0).contains(&normalized_rank) {
        return Err(PromptError::InvalidRank(normalized_rank));
    }
    if normalized_rank < 1.0 {
        Ok((normalized_rank * 100.0).floor() / 10.0)
    } else {
        Ok(MAX_RATING)
    }
}

/// The answer string a model is expected to produce for `label`.
pub fn answer_text(label: f64) -> String {
    format!("My answer is {label:.1}.")
}

/// One chat message of a fine-tuning record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat-format fine-tuning record: the prompt and its expected answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineTuneRecord {
    pub messages: Vec<ChatMessage>,
}

impl FineTuneRecord {
    pub fn new(prompt: impl Into<String>, label: f64) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.into(),
                },
                ChatMessage {
                    role: "assistant".to_string(),
                    content: answer_text(label),
                },
            ],
        }
    }
}

/// Builds one record per prompt, labelled by the rank of its ground truth.
///
/// `prompts` and `ground_truth` must be aligned.
pub fn build_finetune_records(
    prompts: &[String],
    ground_truth: &[f64],
) -> Result<Vec<FineTuneRecord>, PromptError> {
    if prompts.len() != ground_truth.len() {
        return Err(PromptError::LengthMismatch {
            prompts: prompts.len(),
            labels: ground_truth.len(),
        });
    }

    let ranks = normalized_fractional_ranking(ground_truth)?;

    prompts
        .iter()
        .zip(ranks)
        .map(|(prompt, rank)| rank_label(rank).map(|label| FineTuneRecord::new(prompt.clone(), label)))
        .collect()
}
