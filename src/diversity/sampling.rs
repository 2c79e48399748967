//! Spread-out subset selection for weighted point sets.
//!
//! Picks a geographically diverse subset of candidate coordinates while
//! favouring densely populated regions. The selector runs greedy
//! farthest-point sampling over a pool of candidates that is capped by
//! weight rank: early picks only see the heaviest candidates, and the pool
//! widens every iteration until lighter regions become eligible too.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SelectionError;

use super::progress::{NoopObserver, SelectionObserver, SelectionProgress};

/// Default cap on the number of candidates examined per iteration.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// A point in a 2-D plane.
///
/// Geographic callers store `(lat, lon)` in `(x, y)`. Distances are plain
/// Euclidean on those numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Selects spread-out, weight-biased subsets of a candidate set.
///
/// # Example
///
/// ```rust,ignore
/// use geobias::diversity::{Point, SpreadSampler};
///
/// let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(4.0, 0.0)];
/// let weights = vec![5.0, 4.0, 1.0];
///
/// let sampler = SpreadSampler::new().with_seed(42);
/// let selected = sampler.select(&points, &weights, 2)?;
/// assert_eq!(selected[0], 0);
/// ```
#[derive(Debug, Clone)]
pub struct SpreadSampler {
    /// Maximum number of candidates scored per iteration.
    sample_size: usize,

    /// Random seed for reproducibility (None = non-deterministic).
    seed: Option<u64>,
}

impl Default for SpreadSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpreadSampler {
    /// Creates a sampler with the default sample size and no fixed seed.
    pub fn new() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
        }
    }

    /// Sets the cap on candidates scored per iteration.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Sets a random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Selects `k` spread-out indices from `points`.
    ///
    /// # Arguments
    ///
    /// * `points` - Candidate coordinates.
    /// * `weights` - Non-negative importance per candidate, same order as `points`.
    /// * `k` - Number of indices to return.
    ///
    /// # Returns
    ///
    /// Indices into `points` in selection order. When there are no more
    /// candidates than `k`, every index is returned in input order.
    pub fn select(
        &self,
        points: &[Point],
        weights: &[f64],
        k: usize,
    ) -> Result<Vec<usize>, SelectionError> {
        self.select_with_observer(points, weights, k, &mut NoopObserver)
    }

    /// Same as [`select`](Self::select), reporting each pick to `observer`.
    ///
    /// If the observer breaks, the indices picked so far are returned.
    pub fn select_with_observer<O>(
        &self,
        points: &[Point],
        weights: &[f64],
        k: usize,
        observer: &mut O,
    ) -> Result<Vec<usize>, SelectionError>
    where
        O: SelectionObserver + ?Sized,
    {
        validate(points, weights, k)?;
        if self.sample_size == 0 {
            return Err(SelectionError::InvalidSampleSize(self.sample_size));
        }

        let n = points.len();
        if n <= k {
            return Ok((0..n).collect());
        }

        let ranked = rank_by_weight(weights);
        let mut rng = self.create_rng();

        let mut selected: Vec<usize> = Vec::with_capacity(k);
        let mut is_selected = vec![false; n];
        selected.push(ranked[0]);
        is_selected[ranked[0]] = true;

        let interval = n / k;
        let mut cap = interval;

        debug!(n, k, interval, sample_size = self.sample_size, "Starting spread-out selection");

        while selected.len() < k {
            let eligible = &ranked[..cap.min(n)];
            cap = cap.saturating_add(interval);

            // A sample made only of selected indices falls back to the whole pool.
            let pick = self
                .farthest_in_sample(points, eligible, &selected, &is_selected, &mut rng)
                .or_else(|| {
                    farthest_candidate(points, eligible.iter().copied(), &selected, &is_selected)
                });

            let Some((candidate, min_distance)) = pick else {
                // Guard only: with n > k a full pool always holds an unselected index.
                debug_assert!(eligible.len() < n, "full pool without an unselected candidate");
                if eligible.len() == n {
                    return Err(SelectionError::Exhausted {
                        selected: selected.len(),
                        target: k,
                    });
                }
                continue;
            };

            selected.push(candidate);
            is_selected[candidate] = true;

            let progress = SelectionProgress {
                selected: selected.len(),
                target: k,
                candidate,
                min_distance,
                eligible: eligible.len(),
            };
            if observer.on_pick(&progress).is_break() {
                debug!(selected = selected.len(), target = k, "Selection stopped by observer");
                break;
            }
        }

        Ok(selected)
    }

    /// Scores a uniform sample of the eligible pool.
    fn farthest_in_sample(
        &self,
        points: &[Point],
        eligible: &[usize],
        selected: &[usize],
        is_selected: &[bool],
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64)> {
        if eligible.len() <= self.sample_size {
            return farthest_candidate(points, eligible.iter().copied(), selected, is_selected);
        }

        let sampled = rand::seq::index::sample(rng, eligible.len(), self.sample_size);
        farthest_candidate(
            points,
            sampled.into_iter().map(|i| eligible[i]),
            selected,
            is_selected,
        )
    }

    /// Creates a random number generator.
    fn create_rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}

/// Selects `k` spread-out indices with an unseeded sampler.
///
/// Shorthand for `SpreadSampler::new().with_sample_size(sample_size).select(..)`.
pub fn select_spread_out(
    points: &[Point],
    weights: &[f64],
    k: usize,
    sample_size: usize,
) -> Result<Vec<usize>, SelectionError> {
    SpreadSampler::new()
        .with_sample_size(sample_size)
        .select(points, weights, k)
}

fn validate(points: &[Point], weights: &[f64], k: usize) -> Result<(), SelectionError> {
    if points.is_empty() {
        return Err(SelectionError::EmptyCandidates);
    }
    if k == 0 {
        return Err(SelectionError::InvalidTargetCount(k));
    }
    if points.len() != weights.len() {
        return Err(SelectionError::LengthMismatch {
            points: points.len(),
            weights: weights.len(),
        });
    }
    if let Some((index, &weight)) = weights.iter().enumerate().find(|(_, w)| !(**w >= 0.0)) {
        return Err(SelectionError::NegativeWeight { index, weight });
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(SelectionError::NonFiniteCoordinate { index });
    }
    Ok(())
}

/// Indices sorted by weight, heaviest first. Equal weights keep input order.
fn rank_by_weight(weights: &[f64]) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..weights.len()).collect();
    ranked.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));
    ranked
}

/// Finds the unselected candidate farthest from its nearest selected point.
///
/// The first candidate reaching the running maximum wins ties.
fn farthest_candidate(
    points: &[Point],
    candidates: impl Iterator<Item = usize>,
    selected: &[usize],
    is_selected: &[bool],
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for i in candidates.filter(|&i| !is_selected[i]) {
        let min_dist = selected
            .iter()
            .map(|&s| points[i].distance(&points[s]))
            .fold(f64::INFINITY, f64::min);

        match best {
            Some((_, best_dist)) if min_dist <= best_dist => {}
            _ => best = Some((i, min_dist)),
        }
    }

    best
}

/// Builder for creating a SpreadSampler with custom settings.
#[derive(Debug, Clone, Default)]
pub struct SpreadSamplerBuilder {
    sample_size: Option<usize>,
    seed: Option<u64>,
}

impl SpreadSamplerBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-iteration sample size.
    pub fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the SpreadSampler.
    pub fn build(self) -> SpreadSampler {
        let mut sampler = SpreadSampler::new();

        if let Some(sample_size) = self.sample_size {
            sampler = sampler.with_sample_size(sample_size);
        }
        if let Some(seed) = self.seed {
            sampler = sampler.with_seed(seed);
        }

        sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngExt;
    use std::collections::HashSet;
    use std::ops::ControlFlow;

    fn line_points(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, 0.0)).collect()
    }

    fn random_points(n: usize, seed: u64) -> (Vec<Point>, Vec<f64>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = (0..n)
            .map(|_| Point::new(rng.random_range(-90.0..90.0), rng.random_range(-180.0..180.0)))
            .collect();
        let weights = (0..n).map(|_| rng.random_range(0.0..10_000.0)).collect();
        (points, weights)
    }

    fn assert_unique(indices: &[usize]) {
        let unique: HashSet<_> = indices.iter().collect();
        assert_eq!(unique.len(), indices.len(), "All selected should be unique");
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert_eq!(Point::from((1.0, 2.0)), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_sampler_defaults() {
        let sampler = SpreadSampler::new();
        assert_eq!(sampler.sample_size(), DEFAULT_SAMPLE_SIZE);
        assert!(sampler.seed().is_none());
    }

    #[test]
    fn test_builder() {
        let sampler = SpreadSamplerBuilder::new().sample_size(64).seed(123).build();
        assert_eq!(sampler.sample_size(), 64);
        assert_eq!(sampler.seed(), Some(123));

        let sampler = SpreadSamplerBuilder::default().build();
        assert_eq!(sampler.sample_size(), DEFAULT_SAMPLE_SIZE);
        assert!(sampler.seed().is_none());
    }

    #[test]
    fn test_fewer_points_than_target_returns_all() {
        let sampler = SpreadSampler::new();
        let points = vec![Point::new(3.0, 3.0)];
        assert_eq!(sampler.select(&points, &[1.0], 5).unwrap(), vec![0]);

        let points = line_points(4);
        let weights = vec![1.0, 4.0, 2.0, 3.0];
        assert_eq!(
            sampler.select(&points, &weights, 4).unwrap(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn test_five_points_on_a_line() {
        let sampler = SpreadSampler::new().with_seed(42);
        let points = line_points(5);
        let weights = vec![5.0, 4.0, 3.0, 2.0, 1.0];

        let selected = sampler.select(&points, &weights, 3).unwrap();
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0], 0);
        assert!(selected.iter().all(|&i| i < 5));
        assert_unique(&selected);
    }

    #[test]
    fn test_seed_is_heaviest_point() {
        let sampler = SpreadSampler::new().with_seed(1);
        let points = line_points(6);
        let weights = vec![1.0, 2.0, 9.0, 3.0, 0.0, 4.0];

        let selected = sampler.select(&points, &weights, 3).unwrap();
        assert_eq!(selected[0], 2);
    }

    #[test]
    fn test_population_cap_favours_dense_cluster_first() {
        // Cluster A near the origin outweighs cluster B far away.
        let mut points: Vec<Point> = (0..10).map(|i| Point::new(i as f64 * 0.1, 0.0)).collect();
        points.extend((0..10).map(|i| Point::new(100.0 + i as f64 * 0.1, 100.0)));
        let weights: Vec<f64> = (0..20).map(|i| (20 - i) as f64).collect();

        let sampler = SpreadSampler::new().with_seed(7);
        let selected = sampler.select(&points, &weights, 4).unwrap();

        // Pool sizes are 5, 10, 15: two picks inside A before B becomes eligible.
        assert_eq!(selected, vec![0, 4, 9, 14]);
    }

    #[test]
    fn test_size_and_uniqueness_on_random_input() {
        let (points, weights) = random_points(500, 3);
        let sampler = SpreadSampler::new().with_sample_size(50).with_seed(11);

        for k in [1, 2, 17, 100, 499] {
            let selected = sampler.select(&points, &weights, k).unwrap();
            assert_eq!(selected.len(), k);
            assert_unique(&selected);
        }
    }

    #[test]
    fn test_reproducible_with_seed() {
        let (points, weights) = random_points(400, 5);

        let first = SpreadSampler::new()
            .with_sample_size(30)
            .with_seed(42)
            .select(&points, &weights, 25)
            .unwrap();
        let second = SpreadSampler::new()
            .with_sample_size(30)
            .with_seed(42)
            .select(&points, &weights, 25)
            .unwrap();

        assert_eq!(first, second, "Results should be reproducible with same seed");
    }

    #[test]
    fn test_uniform_weights() {
        let (points, _) = random_points(200, 9);
        let weights = vec![1.0; 200];
        let sampler = SpreadSampler::new().with_sample_size(20).with_seed(3);

        let selected = sampler.select(&points, &weights, 40).unwrap();
        assert_eq!(selected.len(), 40);
        assert_eq!(selected[0], 0);
        assert_unique(&selected);
    }

    #[test]
    fn test_identical_points_still_fill_target() {
        let points = vec![Point::new(2.0, 2.0); 10];
        let weights = vec![1.0; 10];
        let sampler = SpreadSampler::new().with_seed(5);

        let selected = sampler.select(&points, &weights, 4).unwrap();
        assert_eq!(selected.len(), 4);
        assert_unique(&selected);
    }

    #[test]
    fn test_one_spare_candidate_never_exhausts() {
        let (points, weights) = random_points(31, 4);

        for seed in 0..20 {
            let sampler = SpreadSampler::new().with_sample_size(1).with_seed(seed);
            let selected = sampler.select(&points, &weights, 30).unwrap();
            assert_eq!(selected.len(), 30);
            assert_unique(&selected);
        }
    }

    #[test]
    fn test_sample_size_one() {
        let (points, weights) = random_points(60, 1);
        let sampler = SpreadSampler::new().with_sample_size(1).with_seed(8);

        let selected = sampler.select(&points, &weights, 50).unwrap();
        assert_eq!(selected.len(), 50);
        assert_unique(&selected);
    }

    #[test]
    fn test_observer_receives_every_pick() {
        let points = line_points(30);
        let weights: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let sampler = SpreadSampler::new().with_seed(2);

        let mut events = Vec::new();
        let mut observer = |p: &SelectionProgress| {
            events.push((p.selected, p.candidate));
            ControlFlow::Continue(())
        };
        let selected = sampler
            .select_with_observer(&points, &weights, 6, &mut observer)
            .unwrap();

        // The seed point is not reported, every later pick is.
        assert_eq!(events.len(), 5);
        let reported: Vec<usize> = events.iter().map(|&(_, c)| c).collect();
        assert_eq!(&selected[1..], reported.as_slice());
        assert_eq!(events.last().map(|&(s, _)| s), Some(6));
    }

    #[test]
    fn test_observer_can_stop_early() {
        let (points, weights) = random_points(100, 4);
        let sampler = SpreadSampler::new().with_seed(2);

        let mut observer = |p: &SelectionProgress| {
            if p.selected >= 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };
        let selected = sampler
            .select_with_observer(&points, &weights, 10, &mut observer)
            .unwrap();

        assert_eq!(selected.len(), 3);
        assert_unique(&selected);
    }

    #[test]
    fn test_validation_errors() {
        let sampler = SpreadSampler::new();
        let points = line_points(3);

        assert_eq!(
            sampler.select(&[], &[], 2),
            Err(SelectionError::EmptyCandidates)
        );
        assert_eq!(
            sampler.select(&points, &[1.0, 2.0, 3.0], 0),
            Err(SelectionError::InvalidTargetCount(0))
        );
        assert_eq!(
            sampler.select(&points, &[1.0, 2.0], 2),
            Err(SelectionError::LengthMismatch {
                points: 3,
                weights: 2
            })
        );
        assert_eq!(
            sampler.select(&points, &[1.0, -2.0, 3.0], 2),
            Err(SelectionError::NegativeWeight {
                index: 1,
                weight: -2.0
            })
        );
        assert!(matches!(
            sampler.select(&points, &[1.0, f64::NAN, 3.0], 2),
            Err(SelectionError::NegativeWeight { index: 1, .. })
        ));
        assert_eq!(
            sampler.select(&[Point::new(f64::NAN, 0.0)], &[1.0], 1),
            Err(SelectionError::NonFiniteCoordinate { index: 0 })
        );
        assert_eq!(
            SpreadSampler::new()
                .with_sample_size(0)
                .select(&points, &[1.0, 2.0, 3.0], 2),
            Err(SelectionError::InvalidSampleSize(0))
        );
    }

    #[test]
    fn test_select_spread_out_shorthand() {
        let points = line_points(10);
        let weights = vec![1.0; 10];
        let selected = select_spread_out(&points, &weights, 3, 1000).unwrap();
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0], 0);
    }
}
