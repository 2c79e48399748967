//! Rank statistics for comparing model ratings with ground truth.
//!
//! - **Ranking** - fractional ranks with tie averaging, optionally normalized
//! - **Correlation** - Spearman correlation built on those ranks
//! - **Bias** - bias score combining correlation, spread and answer rate

pub mod bias;
pub mod correlation;
pub mod ranking;

pub use bias::{bias_score, mean_absolute_deviation, BiasReport};
pub use correlation::{pearson, spearman};
pub use ranking::{fractional_ranks, normalized_fractional_ranking};
