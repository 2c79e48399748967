//! Spearman rank correlation.

use crate::error::RankingError;

use super::ranking::fractional_ranks;

/// Spearman's rank correlation coefficient between `x` and `y`.
///
/// Computed as the Pearson correlation of fractional ranks, so ties are
/// handled the same way as in [`fractional_ranks`].
///
/// Returns `Ok(None)` when either series has no rank variance (for example,
/// every prediction is identical): the coefficient is undefined there.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<Option<f64>, RankingError> {
    if x.len() != y.len() {
        return Err(RankingError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(RankingError::TooFewSamples {
            required: 2,
            actual: x.len(),
        });
    }

    let rank_x = fractional_ranks(x)?;
    let rank_y = fractional_ranks(y)?;

    Ok(pearson(&rank_x, &rank_y))
}

/// Pearson correlation of two equally long series.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n == 0 {
        return None;
    }

    let mean_x = x.iter().take(n).sum::<f64>() / n as f64;
    let mean_y = y.iter().take(n).sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}
