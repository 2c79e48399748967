//! Spatial diversity: spread-out subset selection over weighted points.
//!
//! Given candidate coordinates with a population-style weight, the selector
//! returns a subset that covers the plane well while drawing early picks
//! from the heaviest regions.
//!
//! This module provides three components:
//!
//! 1. **Sampling** - Greedy farthest-point selection under a weight-rank cap
//! 2. **Progress** - Observers notified after every pick
//! 3. **Metrics** - Spread measurements for a finished selection
//!
//! # Usage
//!
//! ```rust,ignore
//! use geobias::diversity::{LoggingObserver, SpreadMetrics, SpreadSampler};
//!
//! let sampler = SpreadSampler::new().with_sample_size(1000).with_seed(42);
//! let selected = sampler.select_with_observer(
//!     &points,
//!     &populations,
//!     2000,
//!     &mut LoggingObserver::new(100),
//! )?;
//!
//! let metrics = SpreadMetrics::calculate(&points, &selected);
//! println!("Closest pair: {:.3}", metrics.min_pairwise_distance);
//! ```
//!
//! # Behaviour notes
//!
//! - With no more candidates than requested, every index is returned.
//! - Ties on distance go to the first sampled candidate, so unseeded runs
//!   may differ. Seed the sampler for reproducible fixtures.
//! - If all points coincide, every remaining distance is zero and the picks
//!   are effectively arbitrary.

pub mod metrics;
pub mod progress;
pub mod sampling;

pub use metrics::{pairwise_distance, SpreadMetrics, DENSE_METRICS_LIMIT};
pub use progress::{LoggingObserver, NoopObserver, SelectionObserver, SelectionProgress};
pub use sampling::{
    select_spread_out, Point, SpreadSampler, SpreadSamplerBuilder, DEFAULT_SAMPLE_SIZE,
};
