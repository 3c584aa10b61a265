//! Small numeric toolbox shared by the per-unit statistics and the aggregator.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Success performance of one data row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessPerformance {
    /// Sum of all evaluations divided by the number of successes.
    pub value: f64,
    pub success_rate: f64,
    pub successes: usize,
}

/// Success performance ("SP1") of `data`, where failed entries already carry
/// their exhausted budget. Infinite when nothing succeeded.
pub fn sp(data: &[f64], successful: &[bool]) -> SuccessPerformance {
    debug_assert_eq!(data.len(), successful.len());
    let successes = successful.iter().filter(|s| **s).count();
    let total: f64 = data.iter().sum();

    let value = if successes == 0 {
        f64::INFINITY
    } else {
        total / successes as f64
    };
    let success_rate = if data.is_empty() {
        0.0
    } else {
        successes as f64 / data.len() as f64
    };

    SuccessPerformance {
        value,
        success_rate,
        successes,
    }
}

/// Total order on floats with every NaN placed after all numbers.
pub fn cmp_nan_last(a: &f64, b: &f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
    }
}

pub fn sort_nan_last(values: &mut [f64]) {
    values.sort_by(cmp_nan_last);
}

/// Indices that sort `values` ascending with NaN last. Stable for ties.
pub fn argsort_nan_last(values: &[f64]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| cmp_nan_last(&values[a], &values[b]));
    idx
}

/// Percentiles with midpoint interpolation: the k-th of `n` sorted values
/// sits at percentile `100 * (k + 0.5) / n`.
///
/// With `ignore_nan` NaN entries are dropped first; otherwise they sort last
/// and take part in the interpolation. An empty input yields NaN.
pub fn prctile(data: &[f64], percentiles: &[f64], ignore_nan: bool) -> Vec<f64> {
    let mut x: Vec<f64> = if ignore_nan {
        data.iter().copied().filter(|v| !v.is_nan()).collect()
    } else {
        data.to_vec()
    };
    if x.is_empty() {
        return vec![f64::NAN; percentiles.len()];
    }
    sort_nan_last(&mut x);

    let n = x.len() as f64;
    percentiles
        .iter()
        .map(|p| {
            let i = -0.5 + p / 100.0 * n;
            if i <= 0.0 {
                x[0]
            } else if i >= n - 1.0 {
                x[x.len() - 1]
            } else {
                let ii = i.floor() as usize;
                let d = i - ii as f64;
                let (lo, hi) = (x[ii], x[ii + 1]);
                // inf * 0 would turn an exact hit into NaN
                if d == 0.0 || lo == hi {
                    lo
                } else {
                    (1.0 - d) * lo + d * hi
                }
            }
        })
        .collect()
}

/// Minimum ignoring NaN; NaN when every entry is NaN or `values` is empty.
pub fn nanmin<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(f64::NAN, |acc, v| if acc.is_nan() || v < acc { v } else { acc })
}

/// Elementwise minimum that ignores NaN on either side.
pub fn fmin(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, _) => b,
        (_, true) => a,
        _ => a.min(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sp_counts_failures_at_budget() {
        let res = sp(&[50.0, 100.0, 48.0], &[true, false, true]);
        assert_eq!(res.value, 99.0);
        assert_eq!(res.successes, 2);
        assert!((res.success_rate - 2.0 / 3.0).abs() < 1e-12);

        let none = sp(&[100.0, 100.0], &[false, false]);
        assert!(none.value.is_infinite());
    }

    #[test]
    fn nan_sorts_last() {
        let mut v = vec![3.0, f64::NAN, 1.0, f64::INFINITY, 2.0];
        sort_nan_last(&mut v);
        assert_eq!(&v[..4], &[1.0, 2.0, 3.0, f64::INFINITY]);
        assert!(v[4].is_nan());

        let idx = argsort_nan_last(&[f64::NAN, 2.0, 1.0]);
        assert_eq!(idx, vec![2, 1, 0]);
    }

    #[test]
    fn prctile_interpolates_between_midpoints() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(prctile(&x, &[0.0], true), vec![1.0]);
        assert_eq!(prctile(&x, &[100.0], true), vec![4.0]);
        // i = -0.5 + 0.5 * 4 = 1.5
        assert_eq!(prctile(&x, &[50.0], true), vec![2.5]);
        assert!(prctile(&[], &[5.0], true)[0].is_nan());
    }

    #[test]
    fn prctile_with_infinite_neighbours() {
        let x = [1.0, f64::INFINITY, f64::INFINITY, f64::INFINITY];
        assert_eq!(prctile(&x, &[60.0], false), vec![f64::INFINITY]);
        let with_nan = [1.0, 2.0, f64::NAN];
        assert_eq!(prctile(&with_nan, &[100.0], true), vec![2.0]);
        assert!(prctile(&with_nan, &[100.0], false)[0].is_nan());
    }

    #[test]
    fn nan_aware_minimum() {
        assert_eq!(nanmin([f64::NAN, 3.0, 2.0]), 2.0);
        assert!(nanmin([f64::NAN]).is_nan());
        assert_eq!(fmin(f64::NAN, 1.0), 1.0);
        assert_eq!(fmin(2.0, f64::NAN), 2.0);
        assert_eq!(fmin(2.0, 1.0), 1.0);
    }
}
