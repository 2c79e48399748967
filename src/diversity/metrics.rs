//! Spread metrics for selected point subsets.
//!
//! Used to report how well a selection covers the plane: the tighter the
//! closest pair, the more redundant the subset.

use ndarray::Array2;
use serde::Serialize;

use super::sampling::Point;

/// Largest subset measured through a dense distance matrix. Bigger subsets
/// use a pairwise scan that keeps one running minimum per point.
pub const DENSE_METRICS_LIMIT: usize = 2048;

/// Spatial spread of a subset of points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadMetrics {
    /// Number of points measured.
    pub count: usize,

    /// Smallest distance between any two measured points.
    /// Zero when fewer than two points are measured.
    pub min_pairwise_distance: f64,

    /// Mean distance from each point to its nearest neighbour.
    pub mean_nearest_neighbor_distance: f64,

    /// Area of the axis-aligned bounding box.
    pub bounding_box_area: f64,
}

impl SpreadMetrics {
    /// Calculates spread metrics for `points[indices]`.
    ///
    /// Out-of-range indices are ignored.
    pub fn calculate(points: &[Point], indices: &[usize]) -> Self {
        let subset: Vec<Point> = indices
            .iter()
            .filter_map(|&i| points.get(i).copied())
            .collect();

        Self::calculate_all(&subset)
    }

    /// Calculates spread metrics over every point in `points`.
    pub fn calculate_all(points: &[Point]) -> Self {
        let count = points.len();
        if count < 2 {
            return Self {
                count,
                min_pairwise_distance: 0.0,
                mean_nearest_neighbor_distance: 0.0,
                bounding_box_area: 0.0,
            };
        }

        let nearest = if count <= DENSE_METRICS_LIMIT {
            nearest_from_matrix(&pairwise_distance(points))
        } else {
            nearest_streaming(points)
        };

        let min_pairwise_distance = nearest.iter().copied().fold(f64::INFINITY, f64::min);
        let mean_nearest_neighbor_distance = nearest.iter().sum::<f64>() / count as f64;

        Self {
            count,
            min_pairwise_distance,
            mean_nearest_neighbor_distance,
            bounding_box_area: bounding_box_area(points),
        }
    }
}

/// Computes the symmetric pairwise Euclidean distance matrix.
pub fn pairwise_distance(points: &[Point]) -> Array2<f64> {
    let n = points.len();
    let mut distance_matrix = Array2::zeros((n, n));

    for i in 0..n {
        for j in (i + 1)..n {
            let dist = points[i].distance(&points[j]);
            distance_matrix[[i, j]] = dist;
            distance_matrix[[j, i]] = dist;
        }
    }

    distance_matrix
}

/// Nearest-neighbour distance per row of a distance matrix.
fn nearest_from_matrix(distances: &Array2<f64>) -> Vec<f64> {
    distances
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &d)| d)
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// Nearest-neighbour distance per point without materializing the matrix.
fn nearest_streaming(points: &[Point]) -> Vec<f64> {
    let mut nearest = vec![f64::INFINITY; points.len()];
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let dist = points[i].distance(&points[j]);
            if dist < nearest[i] {
                nearest[i] = dist;
            }
            if dist < nearest[j] {
                nearest[j] = dist;
            }
        }
    }
    nearest
}

fn bounding_box_area(points: &[Point]) -> f64 {
    let (min_x, max_x, min_y, max_y) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), p| {
            (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
        },
    );
    (max_x - min_x) * (max_y - min_y)
}
