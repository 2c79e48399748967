//! Command-line interface for geobias.
//!
//! Provides commands for spread-out coordinate selection, rank statistics,
//! bias scoring and fine-tuning data preparation.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
