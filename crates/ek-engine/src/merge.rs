use std::collections::BTreeSet;

use ek_types::{DataError, EkResult};

use crate::stats::cmp_nan_last;
use crate::unit::ProblemUnit;

impl ProblemUnit {
    /// Append the trials of an identical unit (same header) loaded again.
    ///
    /// Both matrices are realigned on the union of their thresholds, trial
    /// metadata and file lists are concatenated, reference values of `other`
    /// take precedence, and the ERT column is recomputed.
    pub fn merge(&mut self, other: ProblemUnit) -> EkResult<()> {
        if self.header != other.header {
            return Err(DataError::IncompatibleMerge {
                left: self.header.to_string(),
                right: other.header.to_string(),
            }
            .into());
        }

        let mine: BTreeSet<u32> = self.instance_numbers.iter().copied().collect();
        let overlap: Vec<u32> = other
            .instance_numbers
            .iter()
            .copied()
            .filter(|i| mine.contains(i))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if overlap.iter().any(|&i| i > 5) {
            tracing::warn!(
                "Instances {:?} found several times, data for f{} in {}-D might be inconsistent",
                overlap,
                self.function_id(),
                self.dimension()
            );
        }

        let mut thresholds: Vec<f64> = self.target.iter().chain(&other.target).copied().collect();
        thresholds.sort_by(|a, b| cmp_nan_last(b, a));
        thresholds.dedup();

        let evals = thresholds
            .iter()
            .map(|&t| {
                let mut row = Vec::with_capacity(1 + self.nb_runs() + other.nb_runs());
                row.push(t);
                row.extend(self.evals_at(t));
                row.extend(other.evals_at(t));
                row
            })
            .collect();

        let added = other.nb_runs();
        let carries_trials = !self.trials.is_empty() && !other.trials.is_empty();

        self.evals = evals;
        self.maxevals.extend(other.maxevals);
        self.instance_numbers.extend(other.instance_numbers);
        if carries_trials {
            self.trials.extend(other.trials);
        } else if !self.trials.is_empty() || !other.trials.is_empty() {
            tracing::debug!("Dropping trial records of {}: only one side carries them", self.header);
            self.trials.clear();
        }
        self.index_files.extend(other.index_files);
        self.data_files.extend(other.data_files);
        self.reference_values.extend(other.reference_values);
        self.complemented &= other.complemented;
        self.compute_ert();

        tracing::info!("Merged {} trials into {} ({} trials)", added, self.header, self.nb_runs());
        Ok(())
    }
}
