//! Per-unit runtime statistics at arbitrary target values.

use crate::sampling::{BootstrapSampler, DerandomizedStream};
use crate::stats;
use crate::unit::ProblemUnit;

/// Final target used when a unit has no precision of its own.
pub const DEFAULT_FINAL_TARGET: f64 = 1e-8;

impl ProblemUnit {
    /// Row answering a query: the easiest recorded row whose threshold is
    /// at most `target`. `None` when even the hardest row is easier than
    /// the query.
    pub(crate) fn row_index(&self, target: f64) -> Option<usize> {
        if target.is_nan() {
            return None;
        }
        let i = self.target.partition_point(|&t| t > target);
        (i < self.target.len()).then_some(i)
    }

    /// Per-trial evaluations at `target`, all NaN if never attempted.
    pub(crate) fn evals_at(&self, target: f64) -> Vec<f64> {
        match self.row_index(target) {
            Some(i) => self.evals[i][1..].to_vec(),
            None => vec![f64::NAN; self.nb_runs()],
        }
    }

    /// One row of per-trial evaluations for each target, in query order.
    pub fn det_evals(&self, targets: &[f64]) -> Vec<Vec<f64>> {
        targets.iter().map(|&t| self.evals_at(t)).collect()
    }

    /// Like [`ProblemUnit::det_evals`], each row resampled with replacement.
    pub fn det_evals_bootstrap(
        &self,
        targets: &[f64],
        sampler: &mut BootstrapSampler,
    ) -> Vec<Vec<f64>> {
        targets
            .iter()
            .map(|&t| sampler.resample(&self.evals_at(t)))
            .collect()
    }

    /// Expected running time per target; infinite when not attained.
    pub fn det_ert(&self, targets: &[f64]) -> Vec<f64> {
        targets
            .iter()
            .map(|&t| match self.row_index(t) {
                Some(i) => self.ert[i],
                None => f64::INFINITY,
            })
            .collect()
    }

    pub fn det_successes(&self, targets: &[f64]) -> Vec<usize> {
        self.det_evals(targets)
            .iter()
            .map(|row| row.iter().filter(|v| !v.is_nan()).count())
            .collect()
    }

    pub fn det_success_rates(&self, targets: &[f64]) -> Vec<f64> {
        let runs = self.nb_runs() as f64;
        self.det_successes(targets)
            .into_iter()
            .map(|s| s as f64 / runs)
            .collect()
    }

    /// Evaluations spent per trial on average: successes count with their
    /// value, failures with their budget. Equals ERT times success rate.
    pub fn det_average_evals(&self, targets: &[f64]) -> Vec<f64> {
        let runs = self.nb_runs() as f64;
        self.det_evals(targets)
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.maxevals)
                    .map(|(&v, &budget)| if v.is_nan() { budget } else { v })
                    .sum::<f64>()
                    / runs
            })
            .collect()
    }

    /// Per-trial evaluations until `final_target` was reached, or the trial
    /// budget when it was not.
    ///
    /// Without an explicit target the unit precision is used, or
    /// [`DEFAULT_FINAL_TARGET`] when there is none or the data is
    /// bi-objective. Units loaded through a testbed take its default
    /// precision, see [`ProblemUnit::apply_default_precision`].
    pub fn det_max_evals(&self, final_target: Option<f64>) -> Vec<f64> {
        let final_target = final_target
            .or_else(|| {
                if self.is_biobjective() {
                    None
                } else {
                    self.header.precision
                }
            })
            .unwrap_or(DEFAULT_FINAL_TARGET);

        self.evals_at(final_target)
            .into_iter()
            .zip(&self.maxevals)
            .map(|(reached, &budget)| if reached.is_finite() { reached } else { budget })
            .collect()
    }

    /// `samplesize` simulated run lengths per target, sorted ascending.
    ///
    /// A simulated run draws trials from the pool of successful run lengths
    /// and failed budgets; every failed draw is followed by another draw (a
    /// restart) until a success is hit, summing the evaluations. Draws come
    /// from a [`DerandomizedStream`], so with all trials successful and
    /// `samplesize == nb_runs()` the result is the sorted original row.
    /// Targets without any success yield `samplesize` NaN values.
    ///
    /// With a bootstrap sampler the trials of each target are first
    /// resampled with replacement, budgets travelling with their trial.
    pub fn evals_with_simulated_restarts(
        &self,
        targets: &[f64],
        samplesize: usize,
        mut bootstrap: Option<&mut BootstrapSampler>,
    ) -> Vec<Vec<f64>> {
        targets
            .iter()
            .map(|&t| {
                let row = self.evals_at(t);
                let columns: Vec<usize> = match bootstrap.as_deref_mut() {
                    Some(sampler) => sampler.indices(row.len()),
                    None => (0..row.len()).collect(),
                };
                let trials: Vec<(f64, f64)> = columns
                    .into_iter()
                    .map(|c| (row[c], self.maxevals[c]))
                    .collect();
                simulate_restarts(&trials, samplesize)
            })
            .collect()
    }
}

/// `trials` holds `(evals at target or NaN, budget)` per trial.
fn simulate_restarts(trials: &[(f64, f64)], samplesize: usize) -> Vec<f64> {
    let mut pool: Vec<f64> = trials
        .iter()
        .map(|&(v, _)| v)
        .filter(|v| !v.is_nan())
        .collect();
    let nsucc = pool.len();
    if nsucc == 0 {
        return vec![f64::NAN; samplesize];
    }
    stats::sort_nan_last(&mut pool);
    pool.extend(trials.iter().filter(|(v, _)| v.is_nan()).map(|&(_, budget)| budget));

    let mut stream = DerandomizedStream::new(pool.len(), samplesize);
    let first = stream.draw(samplesize);
    let mut sums: Vec<f64> = first.iter().map(|&i| pool[i]).collect();
    let mut failing: Vec<usize> = (0..samplesize).filter(|&k| first[k] >= nsucc).collect();

    // every block of pool.len() draws contains each success once
    while !failing.is_empty() {
        let draws = stream.draw(failing.len());
        let mut still_failing = Vec::new();
        for (&slot, &index) in failing.iter().zip(&draws) {
            sums[slot] += pool[index];
            if index >= nsucc {
                still_failing.push(slot);
            }
        }
        failing = still_failing;
    }

    stats::sort_nan_last(&mut sums);
    sums
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::tests::sample_unit;
    use ek_types::UnitHeader;

    const NAN: f64 = f64::NAN;

    fn same(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
    }

    #[test]
    fn det_evals_picks_easiest_row_at_or_below_query() {
        let unit = sample_unit();
        assert!(same(&unit.det_evals(&[1e-3])[0], &[50.0, NAN, 48.0]));
        // between rows: the harder row already achieved the query
        assert!(same(&unit.det_evals(&[1e-2])[0], &[50.0, NAN, 48.0]));
        // easier than everything recorded
        assert!(same(&unit.det_evals(&[10.0])[0], &[10.0, 12.0, 11.0]));
        // never attempted
        assert!(unit.det_evals(&[1e-8])[0].iter().all(|v| v.is_nan()));
        assert!(unit.det_evals(&[NAN])[0].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn queries_keep_caller_order() {
        let unit = sample_unit();
        let ert = unit.det_ert(&[1e-5, 1e-1, 1e-8]);
        assert_eq!(ert[0], 290.0);
        assert_eq!(ert[1], 11.0);
        assert!(ert[2].is_infinite());
    }

    #[test]
    fn ert_and_success_statistics() {
        let unit = sample_unit();
        assert_eq!(unit.det_ert(&[1e-3]), vec![99.0]);
        assert_eq!(unit.det_successes(&[1e-3]), vec![2]);
        assert!((unit.det_success_rates(&[1e-3])[0] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn average_evals_equal_ert_times_success_rate() {
        let unit = sample_unit();
        let targets = [1e-1, 1e-2, 1e-3, 1e-5];
        let averages = unit.det_average_evals(&targets);
        let ert = unit.det_ert(&targets);
        let rates = unit.det_success_rates(&targets);
        for i in 0..targets.len() {
            assert!((averages[i] - ert[i] * rates[i]).abs() < 1e-9);
        }
        // unattained target: every trial spent its budget
        assert_eq!(unit.det_average_evals(&[1e-8]), vec![100.0]);
    }

    #[test]
    fn max_evals_stop_at_final_target() {
        let unit = sample_unit();
        assert_eq!(unit.det_max_evals(Some(1e-5)), vec![100.0, 100.0, 90.0]);
        assert_eq!(unit.det_max_evals(None), vec![100.0, 100.0, 100.0]);
    }

    #[test]
    fn restarts_reproduce_fully_successful_rows() {
        let unit = sample_unit();
        let res = unit.evals_with_simulated_restarts(&[1e-1], 3, None);
        assert_eq!(res, vec![vec![10.0, 11.0, 12.0]]);
    }

    #[test]
    fn restarts_without_success_are_missing() {
        let unit = sample_unit();
        let res = unit.evals_with_simulated_restarts(&[1e-8], 7, None);
        assert_eq!(res[0].len(), 7);
        assert!(res[0].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn restarts_add_failed_budgets() {
        let unit = sample_unit();
        let res = &unit.evals_with_simulated_restarts(&[1e-5], 20, None)[0];
        assert_eq!(res.len(), 20);
        assert!(res.windows(2).all(|w| w[0] <= w[1]));
        // every simulated run ends with the only success (90) and adds
        // whole budgets of 100 for each restart
        for v in res {
            let restarts = (v - 90.0) / 100.0;
            assert!(restarts >= 0.0 && restarts.fract() == 0.0);
        }
        assert_eq!(res[0], 90.0);
        assert_eq!(
            res.clone(),
            unit.evals_with_simulated_restarts(&[1e-5], 20, None)[0]
        );
    }

    #[test]
    fn restart_budgets_belong_to_their_trial() {
        let unit = ProblemUnit::new(
            UnitHeader::new("A", 1, 2),
            vec![vec![1.0, NAN, 5.0]],
            vec![1000.0, 7.0],
            vec![1, 2],
        )
        .unwrap();
        let res = &unit.evals_with_simulated_restarts(&[1.0], 4, None)[0];
        for v in res {
            assert_eq!((v - 5.0) % 1000.0, 0.0);
        }
    }

    #[test]
    fn bootstrap_is_seeded() {
        let unit = sample_unit();
        let a = unit.det_evals_bootstrap(&[1e-3], &mut BootstrapSampler::new(3));
        let b = unit.det_evals_bootstrap(&[1e-3], &mut BootstrapSampler::new(3));
        assert!(same(&a[0], &b[0]));
        let mut sampler = BootstrapSampler::new(3);
        let restarts = unit.evals_with_simulated_restarts(&[1e-1], 3, Some(&mut sampler));
        assert!(restarts[0].iter().all(|v| [10.0, 11.0, 12.0].contains(v)));
    }
}
