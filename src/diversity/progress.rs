//! Progress reporting for long-running subset selections.
//!
//! Selecting thousands of points out of a dense raster can take a while, so
//! the sampler reports every pick to an injected observer. Observers may also
//! stop the selection early; the prefix chosen so far is still a valid
//! spread-out subset.

use std::ops::ControlFlow;

use tracing::info;

/// Snapshot of selector state right after a point was picked.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionProgress {
    /// Number of points selected so far, including the seed point.
    pub selected: usize,
    /// Number of points the caller asked for.
    pub target: usize,
    /// Index of the point that was just picked.
    pub candidate: usize,
    /// Distance from the picked point to its nearest previously selected point.
    pub min_distance: f64,
    /// Size of the weight-ranked pool that was eligible for this pick.
    pub eligible: usize,
}

impl SelectionProgress {
    /// Fraction of the target reached, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.target == 0 {
            return 1.0;
        }
        (self.selected as f64 / self.target as f64).min(1.0)
    }

    /// Whether the selection has reached its target size.
    pub fn is_complete(&self) -> bool {
        self.selected >= self.target
    }
}

/// Receives a callback after every point the sampler picks.
///
/// Returning [`ControlFlow::Break`] stops the selection after the current pick.
pub trait SelectionObserver {
    fn on_pick(&mut self, progress: &SelectionProgress) -> ControlFlow<()>;
}

impl<F> SelectionObserver for F
where
    F: FnMut(&SelectionProgress) -> ControlFlow<()>,
{
    fn on_pick(&mut self, progress: &SelectionProgress) -> ControlFlow<()> {
        self(progress)
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SelectionObserver for NoopObserver {
    fn on_pick(&mut self, _progress: &SelectionProgress) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Observer that logs selection progress through `tracing`.
///
/// Emits one line every `every` picks and one when the target is reached.
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    every: usize,
}

impl LoggingObserver {
    /// Creates a logging observer. An interval of 0 only logs completion.
    pub fn new(every: usize) -> Self {
        Self { every }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new(100)
    }
}

impl SelectionObserver for LoggingObserver {
    fn on_pick(&mut self, progress: &SelectionProgress) -> ControlFlow<()> {
        let on_interval = self.every > 0 && progress.selected % self.every == 0;
        if on_interval || progress.is_complete() {
            info!(
                selected = progress.selected,
                target = progress.target,
                eligible = progress.eligible,
                min_distance = progress.min_distance,
                "Selecting farthest points: {:.1}%",
                progress.fraction() * 100.0
            );
        }
        ControlFlow::Continue(())
    }
}
