//! Statistical primitives shared by every detector and remediation step.
//!
//! Variance and standard deviation are always the population form (divide by
//! N). Quantiles use the simple rank method: the value at `floor(q * n)` of the
//! ascending-sorted sample, clamped to the last element.

use std::collections::HashMap;
use std::hash::Hash;

/// Arithmetic mean. `None` for an empty sample.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance. `None` for an empty sample.
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(sum_sq / values.len() as f64)
}

/// Population standard deviation. `None` for an empty sample.
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    population_variance(values).map(f64::sqrt)
}

/// Sort a copy of `values` ascending using a total order.
pub fn sort_ascending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Median of an unsorted sample (mean of the two middle values for even n).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sort_ascending(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Rank quantile of an already sorted sample: `sorted[floor(q * n)]`.
///
/// `q` is a fraction in `[0, 1]`; the index is clamped to the last element.
pub fn rank_quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let index = (q.clamp(0.0, 1.0) * sorted.len() as f64).floor() as usize;
    Some(sorted[index.min(sorted.len() - 1)])
}

/// Z-score of `value`; 0 when the standard deviation is 0.
pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        0.0
    } else {
        (value - mean) / std_dev
    }
}

/// Most frequent key; ties go to the key encountered first.
pub fn mode_by<T, K, I>(values: I, key: impl Fn(&T) -> K) -> Option<T>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash,
{
    let mut counts: HashMap<K, (usize, usize)> = HashMap::new();
    let mut firsts: Vec<T> = Vec::new();
    for value in values {
        let k = key(&value);
        match counts.get_mut(&k) {
            Some((count, _)) => *count += 1,
            None => {
                counts.insert(k, (1, firsts.len()));
                firsts.push(value);
            }
        }
    }
    let (_, best_position) = counts
        .into_values()
        .max_by(|(count_a, pos_a), (count_b, pos_b)| {
            count_a.cmp(count_b).then_with(|| pos_b.cmp(pos_a))
        })?;
    firsts.into_iter().nth(best_position)
}

/// Most frequent numeric value; ties go to the value encountered first.
pub fn numeric_mode(values: &[f64]) -> Option<f64> {
    mode_by(values.iter().copied(), |v| v.to_bits())
}
