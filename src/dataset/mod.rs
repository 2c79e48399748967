//! Dataset readers and writers.
//!
//! - [`tabular`] - CSV candidates, predictions and ground-truth columns
//! - [`jsonl`] - JSONL prompt templates, completions and fine-tuning records

pub mod jsonl;
pub mod tabular;

pub use jsonl::{read_completions, read_prompt_templates, write_jsonl, write_prompts, PromptLine};
pub use tabular::{
    read_candidates, read_column, read_predictions, write_predictions, write_records,
    CandidateRow, CandidateTable, PredictionRecord, GROUNDTRUTH_COLUMN, LATITUDE_COLUMN,
    LONGITUDE_COLUMN, PREDICTIONS_COLUMN, WEIGHT_COLUMN,
};
