//! Error types for geobias operations.
//!
//! Defines error types for the major subsystems:
//! - Diverse subset selection
//! - Rank statistics and bias scoring
//! - Prompt construction and parsing
//! - Dataset I/O (CSV, JSONL)
//! - Configuration loading

use thiserror::Error;

/// Errors that can occur while selecting a spread-out subset of points.
#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("Candidate set is empty")]
    EmptyCandidates,

    #[error("Target count must be at least 1, got {0}")]
    InvalidTargetCount(usize),

    #[error("Sample size must be at least 1, got {0}")]
    InvalidSampleSize(usize),

    #[error("Points count ({points}) does not match weights count ({weights})")]
    LengthMismatch { points: usize, weights: usize },

    #[error("Weight at index {index} must be non-negative, got {weight}")]
    NegativeWeight { index: usize, weight: f64 },

    #[error("Point at index {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },

    #[error("No unselected candidate left after selecting {selected} of {target} points")]
    Exhausted { selected: usize, target: usize },
}

/// Errors that can occur while ranking values or correlating rankings.
#[derive(Debug, Error, PartialEq)]
pub enum RankingError {
    #[error("Value at index {0} is NaN")]
    NotANumber(usize),

    #[error("Series lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("At least {required} samples are required, got {actual}")]
    TooFewSamples { required: usize, actual: usize },
}

/// Errors that can occur while computing a bias score.
#[derive(Debug, Error, PartialEq)]
pub enum BiasError {
    #[error("Number of prompts must be greater than 0")]
    NoPrompts,

    #[error("{predictions} predictions exceed the {prompts} prompts issued")]
    TooManyPredictions { predictions: usize, prompts: usize },

    #[error("Correlation is undefined: predictions or ground truth have zero rank variance")]
    UndefinedCorrelation,

    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),
}

/// Errors that can occur while building or parsing prompts.
#[derive(Debug, Error, PartialEq)]
pub enum PromptError {
    #[error("No 'Coordinates: (lat, lon)' block found in prompt")]
    MissingCoordinates,

    #[error("Invalid coordinate value '{0}'")]
    InvalidCoordinate(String),

    #[error("Normalized rank must lie in [0, 1], got {0}")]
    InvalidRank(f64),

    #[error("Prompts count ({prompts}) does not match labels count ({labels})")]
    LengthMismatch { prompts: usize, labels: usize },

    #[error("{prompts} prompts but {completions} completions; files must be line-aligned")]
    CompletionMismatch { prompts: usize, completions: usize },

    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),
}

/// Errors that can occur while reading or writing datasets.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Column '{column}' not found in '{path}'")]
    MissingColumn { path: String, column: String },

    #[error("Invalid number '{value}' in column '{column}' at row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Invalid JSONL record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
