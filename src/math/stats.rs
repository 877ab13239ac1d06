//! Small statistical primitives shared by the profiling steps.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64], mean_val: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let var = values
        .iter()
        .map(|v| {
            let d = v - mean_val;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    var.sqrt()
}

/// Index of the first element whose running sum reaches `target`.
///
/// The cumulative sum is taken in slice order; returns `None` only for an
/// empty slice. A non-positive target resolves to index 0.
pub fn cumulative_threshold_index(values: &[f64], target: f64) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    let mut acc = 0.0;
    for (i, v) in values.iter().enumerate() {
        acc += v;
        if acc >= target {
            return Some(i);
        }
    }
    Some(values.len() - 1)
}
