//! Weighted selection primitives
//!
//! Pure functions of their inputs: randomness is injected as a single draw so
//! selection can be tested without a network or a seeded RNG.

/// Scale weights so they sum to 1.0.
///
/// An all-zero (or empty-sum) vector is treated as uniform.
pub fn normalize_weights(weights: &[f64]) -> Vec<f64> {
    if weights.is_empty() {
        return Vec::new();
    }

    let total: f64 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        let uniform = 1.0 / weights.len() as f64;
        return vec![uniform; weights.len()];
    }

    weights.iter().map(|w| w / total).collect()
}

/// Pick an index from normalized weights using one uniform draw `r` in `[0, 1)`.
///
/// Walks the weights accumulating a running sum and returns the first index
/// whose running sum exceeds `r`. Float rounding can leave the final sum a
/// hair under 1.0, in which case the last positively weighted index is used.
pub fn pick_weighted(normalized: &[f64], r: f64) -> Option<usize> {
    let mut running = 0.0;
    for (index, weight) in normalized.iter().enumerate() {
        running += weight;
        if running > r {
            return Some(index);
        }
    }

    normalized
        .iter()
        .rposition(|w| *w > 0.0)
        .or_else(|| normalized.len().checked_sub(1))
}

/// Indices in descending weight order, ties kept in configured order,
/// excluding `skip`.
pub fn descending_order(weights: &[f64], skip: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).filter(|i| *i != skip).collect();
    order.sort_by(|a, b| weights[*b].total_cmp(&weights[*a]));
    order
}
