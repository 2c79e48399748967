//! geobias: geospatial bias probing for large language models.
//!
//! This library selects spread-out, population-weighted coordinates for
//! prompting, builds and parses the prompts, and compares model ratings with
//! ground truth using rank statistics.

// Core modules
pub mod cli;
pub mod config;
pub mod dataset;
pub mod diversity;
pub mod error;
pub mod location;
pub mod prompts;
pub mod stats;

// Re-export commonly used error types
pub use error::{BiasError, ConfigError, DatasetError, PromptError, RankingError, SelectionError};
