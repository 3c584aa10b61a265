//! The problem unit: one algorithm on one function in one dimension.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use ek_types::{DataError, EkResult, ProblemId, TestbedSettings, UnitHeader};

use crate::snapshot::UnitSnapshot;
use crate::stats;

/// What the index entry reported about a single trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// False for runs that never wrote their final line.
    pub finalized: bool,
    #[serde(default)]
    pub read_max_evals: Option<u64>,
    /// Final f-value minus target as reported, if finalized.
    #[serde(default)]
    pub read_final_delta: Option<f64>,
}

impl TrialRecord {
    pub fn finalized(read_max_evals: u64, read_final_delta: f64) -> Self {
        Self {
            finalized: true,
            read_max_evals: Some(read_max_evals),
            read_final_delta: Some(read_final_delta),
        }
    }
}

/// Aligned per-trial evaluation counts of one problem unit.
///
/// Each row of `evals` is `[threshold, evals of trial 1, ..., evals of trial N]`
/// with thresholds strictly decreasing (a repeated final row is tolerated).
/// A NaN cell means the trial never reached the threshold. `target` and
/// `ert` are derived from `evals` and recomputed whenever it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "UnitSnapshot", into = "UnitSnapshot")]
pub struct ProblemUnit {
    pub(crate) header: UnitHeader,
    pub(crate) evals: Vec<Vec<f64>>,
    pub(crate) target: Vec<f64>,
    pub(crate) ert: Vec<f64>,
    pub(crate) maxevals: Vec<f64>,
    pub(crate) instance_numbers: Vec<u32>,
    pub(crate) trials: Vec<TrialRecord>,
    pub(crate) reference_values: BTreeMap<u32, f64>,
    pub(crate) index_files: Vec<String>,
    pub(crate) data_files: Vec<String>,
    pub(crate) complemented: bool,
}

impl ProblemUnit {
    /// Build a unit from an already aligned evaluation matrix.
    pub fn new(
        header: UnitHeader,
        evals: Vec<Vec<f64>>,
        maxevals: Vec<f64>,
        instance_numbers: Vec<u32>,
    ) -> EkResult<Self> {
        validate_layout(&header, &evals, maxevals.len(), instance_numbers.len(), 0)?;

        let mut unit = Self {
            header,
            evals,
            target: Vec::new(),
            ert: Vec::new(),
            maxevals,
            instance_numbers,
            trials: Vec::new(),
            reference_values: BTreeMap::new(),
            index_files: Vec::new(),
            data_files: Vec::new(),
            complemented: false,
        };
        unit.compute_ert();
        Ok(unit)
    }

    /// Build a unit straight from aligner output: like [`ProblemUnit::new`]
    /// followed by [`ProblemUnit::cut_data`].
    pub fn from_aligned(
        header: UnitHeader,
        evals: Vec<Vec<f64>>,
        maxevals: Vec<f64>,
        instance_numbers: Vec<u32>,
    ) -> EkResult<Self> {
        let mut unit = Self::new(header, evals, maxevals, instance_numbers)?;
        unit.cut_data();
        Ok(unit)
    }

    pub fn with_trials(mut self, trials: Vec<TrialRecord>) -> EkResult<Self> {
        if trials.len() != self.nb_runs() {
            return Err(DataError::TrialMetadataMismatch {
                unit: self.header.to_string(),
                field: "trials".to_string(),
                expected: self.nb_runs(),
                actual: trials.len(),
            }
            .into());
        }
        self.trials = trials;
        Ok(self)
    }

    pub fn with_reference_values(mut self, reference_values: BTreeMap<u32, f64>) -> Self {
        self.reference_values = reference_values;
        self
    }

    pub fn with_files(mut self, index_files: Vec<String>, data_files: Vec<String>) -> Self {
        self.index_files = index_files;
        self.data_files = data_files;
        self
    }

    /// Recompute `target` and `ert` from `evals`.
    ///
    /// A missing entry counts as a failed trial that spent its whole
    /// `maxevals` budget; the ERT of a row is the total number of evaluations
    /// divided by the number of successes (infinite without success).
    pub fn compute_ert(&mut self) {
        let mut target = Vec::with_capacity(self.evals.len());
        let mut ert = Vec::with_capacity(self.evals.len());

        for row in &self.evals {
            let (data, successful): (Vec<f64>, Vec<bool>) = row[1..]
                .iter()
                .zip(&self.maxevals)
                .map(|(&v, &budget)| if v.is_nan() { (budget, false) } else { (v, true) })
                .unzip();
            target.push(row[0]);
            ert.push(stats::sp(&data, &successful).value);
        }

        self.target = target;
        self.ert = ert;
    }

    pub fn header(&self) -> &UnitHeader {
        &self.header
    }

    /// Mutable header access for renaming; identity fields should not change
    /// while the unit sits in a collection.
    pub fn header_mut(&mut self) -> &mut UnitHeader {
        &mut self.header
    }

    pub fn problem_id(&self) -> ProblemId {
        self.header.problem_id()
    }

    pub fn algorithm_id(&self) -> &str {
        &self.header.algorithm_id
    }

    pub fn function_id(&self) -> u32 {
        self.header.function_id
    }

    pub fn dimension(&self) -> u32 {
        self.header.dimension
    }

    pub fn is_biobjective(&self) -> bool {
        self.header.is_biobjective()
    }

    pub fn evals(&self) -> &[Vec<f64>] {
        &self.evals
    }

    pub fn target(&self) -> &[f64] {
        &self.target
    }

    pub fn ert(&self) -> &[f64] {
        &self.ert
    }

    pub fn maxevals(&self) -> &[f64] {
        &self.maxevals
    }

    pub fn instance_numbers(&self) -> &[u32] {
        &self.instance_numbers
    }

    pub fn trials(&self) -> &[TrialRecord] {
        &self.trials
    }

    pub fn reference_values(&self) -> &BTreeMap<u32, f64> {
        &self.reference_values
    }

    pub fn index_files(&self) -> &[String] {
        &self.index_files
    }

    pub fn data_files(&self) -> &[String] {
        &self.data_files
    }

    pub fn nb_runs(&self) -> usize {
        self.maxevals.len()
    }

    /// Largest budget spent by any trial.
    pub fn max_eval(&self) -> f64 {
        self.maxevals.iter().copied().fold(0.0, f64::max)
    }

    /// Instance id -> number of trials on it.
    pub fn instance_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for &instance in &self.instance_numbers {
            *counts.entry(instance).or_insert(0) += 1;
        }
        counts
    }

    /// Instance id -> trial (column) indices.
    pub fn instance_indices(&self) -> BTreeMap<u32, Vec<usize>> {
        let mut indices: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, &instance) in self.instance_numbers.iter().enumerate() {
            indices.entry(instance).or_default().push(i);
        }
        indices
    }

    /// Evaluation rows restricted to the trials of each instance, threshold
    /// column included.
    pub fn split_by_instance(&self) -> BTreeMap<u32, Vec<Vec<f64>>> {
        self.instance_indices()
            .into_iter()
            .map(|(instance, columns)| {
                let rows = self
                    .evals
                    .iter()
                    .map(|row| {
                        std::iter::once(row[0])
                            .chain(columns.iter().map(|&c| row[c + 1]))
                            .collect()
                    })
                    .collect();
                (instance, rows)
            })
            .collect()
    }

    /// Take the testbed's default precision when the header carries none.
    /// Bi-objective data keeps no precision. Returns true when the header
    /// changed.
    pub fn apply_default_precision(&mut self, settings: &TestbedSettings) -> bool {
        if self.header.precision.is_some() || self.is_biobjective() {
            return false;
        }
        self.header.precision = Some(settings.default_precision);
        tracing::debug!("{} has no precision, using {:e}", self.header, settings.default_precision);
        true
    }

    /// Drop trials on instances outside the testbed's instances of interest.
    /// Returns the number of trials removed.
    pub fn retain_instances(&mut self, settings: &TestbedSettings) -> EkResult<usize> {
        let keep: Vec<usize> = self
            .instance_numbers
            .iter()
            .enumerate()
            .filter(|&(_, &instance)| settings.is_instance_of_interest(instance))
            .map(|(i, _)| i)
            .collect();

        let removed = self.nb_runs() - keep.len();
        if removed == 0 {
            return Ok(0);
        }
        if keep.is_empty() {
            return Err(DataError::EmptyUnit {
                unit: self.header.to_string(),
            }
            .into());
        }

        self.evals = self
            .evals
            .iter()
            .map(|row| {
                std::iter::once(row[0])
                    .chain(keep.iter().map(|&c| row[c + 1]))
                    .collect()
            })
            .collect();
        self.maxevals = keep.iter().map(|&c| self.maxevals[c]).collect();
        self.instance_numbers = keep.iter().map(|&c| self.instance_numbers[c]).collect();
        if !self.trials.is_empty() {
            self.trials = keep.iter().map(|&c| self.trials[c].clone()).collect();
        }
        self.compute_ert();

        tracing::debug!("Dropped {} trials outside the instances of interest from {}", removed, self.header);
        Ok(removed)
    }
}

/// Structural checks shared by construction and snapshot restore.
pub(crate) fn validate_layout(
    header: &UnitHeader,
    evals: &[Vec<f64>],
    nb_runs: usize,
    nb_instances: usize,
    nb_trial_records: usize,
) -> EkResult<()> {
    let unit = || header.to_string();

    if evals.is_empty() || nb_runs == 0 {
        return Err(DataError::EmptyUnit { unit: unit() }.into());
    }
    if nb_instances != nb_runs {
        return Err(DataError::TrialMetadataMismatch {
            unit: unit(),
            field: "instance_numbers".to_string(),
            expected: nb_runs,
            actual: nb_instances,
        }
        .into());
    }
    if nb_trial_records != 0 && nb_trial_records != nb_runs {
        return Err(DataError::TrialMetadataMismatch {
            unit: unit(),
            field: "trials".to_string(),
            expected: nb_runs,
            actual: nb_trial_records,
        }
        .into());
    }

    let last = evals.len() - 1;
    for (i, row) in evals.iter().enumerate() {
        if row.len() != nb_runs + 1 {
            return Err(DataError::RaggedRow {
                unit: unit(),
                row: i,
                expected: nb_runs,
                actual: row.len().saturating_sub(1),
            }
            .into());
        }
        let threshold = row[0];
        if !threshold.is_finite() {
            return Err(DataError::InvalidThreshold {
                unit: unit(),
                row: i,
                value: threshold,
            }
            .into());
        }
        if i > 0 {
            let previous = evals[i - 1][0];
            let repeated_final = i == last && threshold == previous;
            if threshold >= previous && !repeated_final {
                return Err(DataError::UnsortedTargets { unit: unit(), row: i }.into());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ek_types::EkError;

    const NAN: f64 = f64::NAN;

    /// Three trials, three thresholds, budgets of 100.
    pub(crate) fn sample_unit() -> ProblemUnit {
        ProblemUnit::new(
            UnitHeader::new("BFGS", 2, 10),
            vec![
                vec![1e-1, 10.0, 12.0, 11.0],
                vec![1e-3, 50.0, NAN, 48.0],
                vec![1e-5, NAN, NAN, 90.0],
            ],
            vec![100.0, 100.0, 100.0],
            vec![1, 2, 3],
        )
        .unwrap()
    }

    #[test]
    fn ert_follows_rows() {
        let unit = sample_unit();
        assert_eq!(unit.target(), &[1e-1, 1e-3, 1e-5]);
        assert_eq!(unit.ert()[0], 11.0);
        assert_eq!(unit.ert()[1], 99.0);
        assert_eq!(unit.ert()[2], 290.0);
        assert_eq!(unit.ert().len(), unit.evals().len());
    }

    #[test]
    fn all_missing_row_has_infinite_ert() {
        let unit = ProblemUnit::new(
            UnitHeader::new("BFGS", 2, 10),
            vec![vec![1.0, 3.0, 5.0], vec![1e-8, NAN, NAN]],
            vec![40.0, 60.0],
            vec![1, 2],
        )
        .unwrap();
        assert_eq!(unit.ert()[0], 4.0);
        assert!(unit.ert()[1].is_infinite());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = ProblemUnit::new(
            UnitHeader::new("BFGS", 2, 10),
            vec![vec![1.0, 3.0, 5.0], vec![0.1, 4.0]],
            vec![40.0, 60.0],
            vec![1, 2],
        );
        assert!(matches!(
            result,
            Err(EkError::Data(DataError::RaggedRow { row: 1, .. }))
        ));
    }

    #[test]
    fn increasing_thresholds_are_rejected() {
        let result = ProblemUnit::new(
            UnitHeader::new("BFGS", 2, 10),
            vec![vec![1.0, 3.0], vec![2.0, 4.0], vec![0.5, 9.0]],
            vec![40.0],
            vec![1],
        );
        assert!(matches!(
            result,
            Err(EkError::Data(DataError::UnsortedTargets { row: 1, .. }))
        ));
    }

    #[test]
    fn repeated_final_row_is_tolerated() {
        let unit = ProblemUnit::new(
            UnitHeader::new("BFGS", 2, 10),
            vec![vec![1.0, 3.0], vec![1e-8, 9.0], vec![1e-8, 9.0]],
            vec![40.0],
            vec![1],
        );
        assert!(unit.is_ok());
    }

    #[test]
    fn instance_metadata_must_match_trials() {
        let result = ProblemUnit::new(
            UnitHeader::new("BFGS", 2, 10),
            vec![vec![1.0, 3.0, 5.0]],
            vec![40.0, 60.0],
            vec![1],
        );
        assert!(matches!(
            result,
            Err(EkError::Data(DataError::TrialMetadataMismatch { .. }))
        ));
        assert!(sample_unit().with_trials(vec![TrialRecord::default()]).is_err());
    }

    #[test]
    fn instance_helpers() {
        let unit = ProblemUnit::new(
            UnitHeader::new("BFGS", 2, 10),
            vec![vec![1.0, 3.0, 5.0, 7.0]],
            vec![40.0, 60.0, 80.0],
            vec![1, 2, 1],
        )
        .unwrap();
        assert_eq!(unit.instance_counts(), BTreeMap::from([(1, 2), (2, 1)]));
        assert_eq!(unit.instance_indices()[&1], vec![0, 2]);
        assert_eq!(unit.split_by_instance()[&1], vec![vec![1.0, 3.0, 7.0]]);
        assert_eq!(unit.max_eval(), 80.0);
        assert_eq!(unit.nb_runs(), 3);
    }

    #[test]
    fn default_precision_sets_final_target() {
        let mut unit = sample_unit();
        assert_eq!(unit.det_max_evals(None), vec![100.0, 100.0, 100.0]);

        let mut settings = TestbedSettings::default();
        settings.default_precision = 1e-5;
        assert!(unit.apply_default_precision(&settings));
        assert_eq!(unit.header().precision, Some(1e-5));
        // the third trial reached 1e-5 after 90 evaluations
        assert_eq!(unit.det_max_evals(None), vec![100.0, 100.0, 90.0]);

        // an explicit precision wins
        assert!(!unit.apply_default_precision(&TestbedSettings::default()));
        assert_eq!(unit.header().precision, Some(1e-5));
    }

    #[test]
    fn biobjective_units_keep_no_precision() {
        let mut unit = ProblemUnit::new(
            UnitHeader::new("NSGA-II", 1, 2).with_indicator("hyp"),
            vec![vec![1.0, 3.0]],
            vec![10.0],
            vec![1],
        )
        .unwrap();
        assert!(!unit.apply_default_precision(&TestbedSettings::default()));
        assert_eq!(unit.header().precision, None);
    }

    #[test]
    fn retain_instances_of_interest() {
        let mut unit = sample_unit();
        let settings = TestbedSettings::default().with_instances_of_interest(vec![1, 3]);
        assert_eq!(unit.retain_instances(&settings).unwrap(), 1);
        assert_eq!(unit.instance_numbers(), &[1, 3]);
        assert_eq!(unit.evals()[1], vec![1e-3, 50.0, 48.0]);
        assert_eq!(unit.ert()[1], 49.0);

        let none = TestbedSettings::default().with_instances_of_interest(vec![7]);
        assert!(unit.retain_instances(&none).is_err());
    }
}
