//! The `Targets` seam and plain, problem-independent target values.

use serde::{Deserialize, Serialize};
use ek_engine::stats::cmp_nan_last;
use ek_types::{EkResult, ProblemId};

use crate::labels::num2str;

/// Number of grid points per decade used by discretization.
const POINTS_PER_DECADE: f64 = 5.0;

/// A resolver of target values for a problem.
pub trait Targets {
    /// Target values for `problem`, easiest first.
    fn resolve(&self, problem: ProblemId) -> EkResult<Vec<f64>>;

    /// Number of targets returned per problem.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `i`-th defining value as a short string.
    fn label(&self, i: usize) -> Option<String>;

    /// `log10` of the `i`-th defining value as a short string.
    fn loglabel(&self, i: usize, decimals: usize) -> Option<String>;

    fn labels(&self) -> Vec<String> {
        (0..self.len()).filter_map(|i| self.label(i)).collect()
    }

    fn loglabels(&self, decimals: usize) -> Vec<String> {
        (0..self.len()).filter_map(|i| self.loglabel(i, decimals)).collect()
    }

    /// Axis name of the defining values.
    fn label_name(&self) -> String;

    fn short_info(&self) -> String;
}

/// Fixed target values, sorted descending. NaN values come first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetValues {
    values: Vec<f64>,
}

impl TargetValues {
    pub fn new<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut values: Vec<f64> = values.into_iter().collect();
        values.sort_by(|a, b| cmp_nan_last(b, a));
        Self { values }
    }

    /// Targets snapped to the five-per-decade log grid.
    pub fn discretized<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let sorted = Self::new(values);
        Self {
            values: discretize(&sorted.values),
        }
    }

    /// Conversion that leaves existing `TargetValues` untouched.
    pub fn cast<T: Into<TargetValues>>(targets: T) -> Self {
        targets.into()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The stored values; the problem is ignored.
    pub fn call(&self, _problem: Option<ProblemId>) -> Vec<f64> {
        self.values.clone()
    }

    pub fn call_discretized(&self) -> Vec<f64> {
        discretize(&self.values)
    }
}

impl From<Vec<f64>> for TargetValues {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<&[f64]> for TargetValues {
    fn from(values: &[f64]) -> Self {
        Self::new(values.iter().copied())
    }
}

impl<const N: usize> From<[f64; N]> for TargetValues {
    fn from(values: [f64; N]) -> Self {
        Self::new(values)
    }
}

impl Targets for TargetValues {
    fn resolve(&self, _problem: ProblemId) -> EkResult<Vec<f64>> {
        Ok(self.values.clone())
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn label(&self, i: usize) -> Option<String> {
        self.values.get(i).map(|&v| num2str(v, 2))
    }

    fn loglabel(&self, i: usize, decimals: usize) -> Option<String> {
        self.values.get(i).map(|&v| num2str(v.log10(), decimals + 1))
    }

    fn label_name(&self) -> String {
        "Df".to_string()
    }

    fn short_info(&self) -> String {
        "absolute targets".to_string()
    }
}

/// Round each value to the nearest `10^(k/5)`.
pub fn discretize(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&t| 10f64.powf((POINTS_PER_DECADE * t.log10()).round() / POINTS_PER_DECADE))
        .collect()
}
