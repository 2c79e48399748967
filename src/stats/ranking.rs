//! Fractional ranking with tie averaging.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use crate::error::RankingError;

/// Returns 1-based fractional ranks of `values`.
///
/// Equal values share the mean of the ranks they occupy, so `[10, 20, 20, 30]`
/// ranks as `[1.0, 2.5, 2.5, 4.0]`.
pub fn fractional_ranks(values: &[f64]) -> Result<Vec<f64>, RankingError> {
    if let Some(index) = values.iter().position(|v| v.is_nan()) {
        return Err(RankingError::NotANumber(index));
    }

    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    // value -> (sum of ranks, count)
    let mut accumulated: BTreeMap<OrderedFloat<f64>, (f64, usize)> = BTreeMap::new();
    for (rank, value) in sorted.into_iter().enumerate() {
        let entry = accumulated.entry(OrderedFloat(value)).or_insert((0.0, 0));
        entry.0 += (rank + 1) as f64;
        entry.1 += 1;
    }

    Ok(values
        .iter()
        .map(|v| {
            let (sum, count) = accumulated[&OrderedFloat(*v)];
            sum / count as f64
        })
        .collect())
}

/// Fractional ranks rescaled to `[0, 1)` as `(rank - 1) / n`.
///
/// Used both to colour predictions and to turn ground truth into
/// fine-tuning labels.
pub fn normalized_fractional_ranking(values: &[f64]) -> Result<Vec<f64>, RankingError> {
    let n = values.len() as f64;
    Ok(fractional_ranks(values)?
        .into_iter()
        .map(|rank| (rank - 1.0) / n)
        .collect())
}
