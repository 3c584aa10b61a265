//! Best observed data over all algorithms of a problem.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use ek_engine::{fmin, sort_nan_last};
use ek_targets::Targets;
use ek_types::{EkResult, ProblemId};

use crate::rld::DistributionAggregator;

/// Per target, the winning trial row and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestDataLines {
    /// `None` where no algorithm scored below infinity.
    pub lines: Vec<Option<Vec<f64>>>,
    pub scores: Vec<f64>,
}

impl BestDataLines {
    pub fn has_missing(&self) -> bool {
        self.lines.iter().any(Option::is_none)
    }
}

impl DistributionAggregator<'_> {
    /// Per target, the `number` smallest instance-wise best evaluations over
    /// all algorithms on the problem, ascending.
    pub fn det_best_data(
        &self,
        targets: &dyn Targets,
        function: u32,
        dimension: u32,
        number: usize,
    ) -> EkResult<Vec<Vec<f64>>> {
        let problem = ProblemId::new(function, dimension);
        let targets = targets.resolve(problem)?;
        Ok(self.best_data_at(&targets, problem, number))
    }

    pub(crate) fn best_data_at(&self, targets: &[f64], problem: ProblemId, number: usize) -> Vec<Vec<f64>> {
        let mut best: Vec<BTreeMap<u32, f64>> = vec![BTreeMap::new(); targets.len()];
        for unit in self.collection.units_for(problem) {
            for (i, row) in unit.det_evals(targets).iter().enumerate() {
                for (&instance, &evals) in unit.instance_numbers().iter().zip(row) {
                    let entry = best[i].entry(instance).or_insert(f64::INFINITY);
                    *entry = fmin(*entry, evals);
                }
            }
        }

        best.into_iter()
            .map(|per_instance| {
                let mut line: Vec<f64> = per_instance.into_values().collect();
                sort_nan_last(&mut line);
                line.truncate(number);
                line
            })
            .collect()
    }

    /// Per target, the trial row with the lowest score over all algorithms on
    /// the problem. Rows are scored by `scoring`, or by their ERT when
    /// `None`; the first of equally scored rows wins.
    pub fn det_best_data_lines(
        &self,
        targets: &dyn Targets,
        function: u32,
        dimension: u32,
        scoring: Option<&dyn Fn(&[f64]) -> f64>,
    ) -> EkResult<BestDataLines> {
        let problem = ProblemId::new(function, dimension);
        let targets = targets.resolve(problem)?;
        Ok(self.best_lines_at(&targets, problem, scoring))
    }

    pub(crate) fn best_lines_at(
        &self,
        targets: &[f64],
        problem: ProblemId,
        scoring: Option<&dyn Fn(&[f64]) -> f64>,
    ) -> BestDataLines {
        let mut best = BestDataLines {
            lines: vec![None; targets.len()],
            scores: vec![f64::INFINITY; targets.len()],
        };
        for unit in self.collection.units_for(problem) {
            let rows = unit.det_evals(targets);
            let scores: Vec<f64> = match scoring {
                Some(score) => rows.iter().map(|row| score(row.as_slice())).collect(),
                None => unit.det_ert(targets),
            };
            for (i, (row, score)) in rows.into_iter().zip(scores).enumerate() {
                // NaN never wins
                if score < best.scores[i] {
                    best.lines[i] = Some(row);
                    best.scores[i] = score;
                }
            }
        }

        if best.has_missing() {
            tracing::debug!("Best data lines for {} could not be determined", problem);
        }
        best
    }

    /// All trial rows on the problem for `target`, one per unit, and the
    /// matching ERT values.
    pub fn get_all_data_lines(&self, target: f64, function: u32, dimension: u32) -> (Vec<Vec<f64>>, Vec<f64>) {
        let problem = ProblemId::new(function, dimension);
        self.collection
            .units_for(problem)
            .map(|unit| {
                let line = unit.det_evals(&[target]).into_iter().next().unwrap_or_default();
                let ert = unit.det_ert(&[target]).first().copied().unwrap_or(f64::INFINITY);
                (line, ert)
            })
            .unzip()
    }
}
