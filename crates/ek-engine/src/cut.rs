//! Row-level reshaping of a unit: final-precision truncation and coarse
//! log-grid completion.

use ek_types::{validation_error, EkResult};

use crate::unit::ProblemUnit;

impl ProblemUnit {
    /// Truncate trailing rows not meaningfully above `precision`, keeping a
    /// single boundary row, then recompute `maxevals` for the final target
    /// and the ERT column. No-op for bi-objective data or without precision.
    pub fn cut_data(&mut self) {
        let precision = match self.header.precision {
            Some(p) if !self.is_biobjective() => p,
            _ => return,
        };

        let n = self.evals.len();
        let mut i = n;
        while i > 1 && self.evals[i - 1][0] <= precision {
            i -= 1;
        }
        i += 1;
        if i < n {
            self.evals.truncate(i);
            tracing::debug!("Cut {} rows below precision {} from {}", n - i, precision, self.header);
        }

        if let Some(last) = self.evals.last_mut() {
            if last[0] < precision {
                // final precision itself was not recorded
                last[0] = (precision / 1.001).max(last[0]);
            }
        }

        self.compute_ert();
        self.maxevals = self.det_max_evals(None);
        self.compute_ert();
    }

    /// Insert a copy of the next harder row for every `step` on the log
    /// scale between two recorded thresholds, down to `final_target`.
    ///
    /// `step` and its inverse are accepted; `0.2 / log10(step)` must be an
    /// integer. Applied at most once per unit.
    pub fn complement_data(&mut self, step: f64, final_target: f64) -> EkResult<()> {
        if self.complemented {
            return Ok(());
        }
        let step = if step < 1.0 { 1.0 / step } else { step };
        if !(step > 1.0) || !step.is_finite() {
            return Err(validation_error!("complement step must differ from 1, got {}", step));
        }
        let ratio = 0.2 / step.log10();
        if (ratio - ratio.round()).abs() > 1e-11 {
            return Err(validation_error!(
                "0.2 / log10(step) must be an integer, got {} for step {}",
                ratio,
                step
            ));
        }

        let mut rows = Vec::with_capacity(self.evals.len());
        for pair in self.evals.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            rows.push(current.clone());
            let mut threshold = current[0] / step;
            while threshold >= final_target
                && threshold > next[0]
                && threshold / next[0] - 1.0 > 1e-9
            {
                let mut row = next.clone();
                row[0] = threshold;
                rows.push(row);
                threshold /= step;
            }
        }
        if let Some(last) = self.evals.last() {
            rows.push(last.clone());
        }

        tracing::debug!("Complemented {} from {} to {} rows", self.header, self.evals.len(), rows.len());
        self.evals = rows;
        self.complemented = true;
        self.compute_ert();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ek_types::UnitHeader;

    const NAN: f64 = f64::NAN;

    fn unit_with_tail() -> ProblemUnit {
        ProblemUnit::new(
            UnitHeader::new("A", 1, 2).with_precision(1e-8),
            vec![
                vec![1.0, 5.0, 6.0],
                vec![1e-8, 20.0, NAN],
                vec![1e-9, 25.0, NAN],
                vec![1e-10, 30.0, NAN],
            ],
            vec![100.0, 80.0],
            vec![1, 2],
        )
        .unwrap()
    }

    #[test]
    fn cut_keeps_one_boundary_row() {
        let mut unit = unit_with_tail();
        unit.cut_data();
        assert_eq!(unit.target(), &[1.0, 1e-8]);
        assert_eq!(unit.ert().len(), 2);
        // trial 1 reached the final target after 20 evaluations
        assert_eq!(unit.maxevals(), &[20.0, 80.0]);
        assert_eq!(unit.ert()[1], 100.0);
    }

    #[test]
    fn cut_lifts_unrecorded_final_precision() {
        let mut unit = ProblemUnit::new(
            UnitHeader::new("A", 1, 2).with_precision(1e-8),
            vec![vec![1.0, 5.0], vec![1e-12, 20.0]],
            vec![100.0],
            vec![1],
        )
        .unwrap();
        unit.cut_data();
        assert_eq!(unit.target().len(), 2);
        assert_eq!(unit.target()[1], 1e-8 / 1.001);
        assert_eq!(unit.maxevals(), &[20.0]);
    }

    #[test]
    fn cut_without_precision_is_noop() {
        let mut unit = ProblemUnit::new(
            UnitHeader::new("A", 1, 2).with_indicator("hyp"),
            vec![vec![1.0, 5.0], vec![1e-12, 20.0]],
            vec![100.0],
            vec![1],
        )
        .unwrap();
        unit.cut_data();
        assert_eq!(unit.target(), &[1.0, 1e-12]);
        assert_eq!(unit.maxevals(), &[100.0]);
    }

    #[test]
    fn complement_fills_log_grid() {
        let mut unit = ProblemUnit::new(
            UnitHeader::new("A", 1, 2),
            vec![vec![1.0, 5.0], vec![1e-1, 9.0]],
            vec![100.0],
            vec![1],
        )
        .unwrap();
        unit.complement_data(10f64.powf(0.2), 1e-8).unwrap();
        assert_eq!(unit.target().len(), 6);
        assert!(unit.evals()[1..].iter().all(|row| row[1] == 9.0));
        assert!(unit.target().windows(2).all(|w| w[0] > w[1]));

        // idempotent
        unit.complement_data(10f64.powf(0.2), 1e-8).unwrap();
        assert_eq!(unit.target().len(), 6);
    }

    #[test]
    fn complement_rejects_incompatible_step() {
        let mut unit = unit_with_tail();
        assert!(unit.complement_data(3.0, 1e-8).is_err());
        assert!(unit.complement_data(1.0, 1e-8).is_err());
    }
}
