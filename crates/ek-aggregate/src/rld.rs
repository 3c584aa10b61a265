//! Empirical run-length distributions per algorithm and their left envelope.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use ek_engine::{
    argsort_nan_last, fmin, prctile, resample_derandomized, sort_nan_last, AlgorithmCollection, BootstrapSampler,
    ProblemUnit,
};
use ek_targets::Targets;
use ek_types::{ComputationError, EkError, EkResult, ProblemId, TestbedSettings};

use crate::warnings::AggregationWarning;

pub const DEFAULT_DATA_PER_TARGET: usize = 15;

/// How trial rows are turned into samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulatedRestarts {
    /// Recorded evaluations of each trial.
    Off,
    /// Simulated restarts with
    /// `data_per_target + 2 * nb_runs + simulated_runlength_sample_size` samples.
    Auto,
    /// Simulated restarts with the given number of samples.
    Samples(usize),
}

/// Reference score sequence each distribution is divided by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReferenceScoring {
    /// Per target, the trial row of the reference algorithms with the
    /// smallest percentile, scored by that percentile.
    Percentile(f64),
    /// Per target, the instance-wise best evaluations of all reference
    /// algorithms.
    BestData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RldOptions {
    /// Samples per (function, target); `None` keeps every trial.
    pub data_per_target: Option<usize>,
    pub simulated_restarts: SimulatedRestarts,
    /// Resample trials with replacement, seeded from the testbed settings.
    pub bootstrap: bool,
    pub reference_scoring: ReferenceScoring,
}

impl Default for RldOptions {
    fn default() -> Self {
        Self {
            data_per_target: Some(DEFAULT_DATA_PER_TARGET),
            simulated_restarts: SimulatedRestarts::Off,
            bootstrap: false,
            reference_scoring: ReferenceScoring::Percentile(5.0),
        }
    }
}

impl RldOptions {
    pub fn with_data_per_target(mut self, data_per_target: Option<usize>) -> Self {
        self.data_per_target = data_per_target;
        self
    }

    pub fn with_simulated_restarts(mut self, simulated_restarts: SimulatedRestarts) -> Self {
        self.simulated_restarts = simulated_restarts;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_reference_scoring(mut self, reference_scoring: ReferenceScoring) -> Self {
        self.reference_scoring = reference_scoring;
        self
    }
}

/// Sorted evaluations of one algorithm over all selected functions and targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLengthDistribution {
    pub algorithm: String,
    /// Ascending, missing values last.
    pub sorted_evals: Vec<f64>,
    pub functions_solved: Vec<u32>,
    pub functions_processed: Vec<u32>,
    /// Reference scores permuted along with `sorted_evals`.
    pub reference_scores: Option<Vec<f64>>,
}

impl RunLengthDistribution {
    pub fn len(&self) -> usize {
        self.sorted_evals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted_evals.is_empty()
    }

    /// Evaluations divided by the reference scores, or the evaluations
    /// themselves without reference.
    pub fn normalized(&self) -> Vec<f64> {
        match &self.reference_scores {
            Some(scores) => self
                .sorted_evals
                .iter()
                .zip(scores)
                .map(|(evals, score)| evals / score)
                .collect(),
            None => self.sorted_evals.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunLengthDistributions {
    pub per_algorithm: BTreeMap<String, RunLengthDistribution>,
    /// Elementwise minimum of all sorted distributions; infinite where every
    /// algorithm is missing a value.
    pub left_envelope: Vec<f64>,
    pub warnings: Vec<AggregationWarning>,
}

impl RunLengthDistributions {
    /// The only distribution, when exactly one algorithm is present.
    pub fn single(&self) -> Option<&RunLengthDistribution> {
        match self.per_algorithm.len() {
            1 => self.per_algorithm.values().next(),
            _ => None,
        }
    }

    pub fn get(&self, algorithm: &str) -> Option<&RunLengthDistribution> {
        self.per_algorithm.get(algorithm)
    }
}

/// Statistics over all units of an [`AlgorithmCollection`].
#[derive(Debug, Clone)]
pub struct DistributionAggregator<'a> {
    pub(crate) collection: &'a AlgorithmCollection,
    pub(crate) settings: TestbedSettings,
}

impl<'a> DistributionAggregator<'a> {
    pub fn new(collection: &'a AlgorithmCollection) -> Self {
        Self {
            collection,
            settings: TestbedSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: TestbedSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn collection(&self) -> &AlgorithmCollection {
        self.collection
    }

    pub fn settings(&self) -> &TestbedSettings {
        &self.settings
    }

    /// Sorted run-length distribution of every algorithm in `dimension` over
    /// the functions of `fun_list` (all functions when `None`), and their
    /// left envelope.
    ///
    /// Without `fun_list` every function present in `dimension` is
    /// requested, so an algorithm lacking one of them is left out. With
    /// `reference`, each distribution carries the reference scores of its
    /// entries. Algorithms failing a consistency check are left out with a
    /// warning; errors resolving targets are returned.
    pub fn run_length_distributions(
        &self,
        dimension: u32,
        targets: &dyn Targets,
        fun_list: Option<&[u32]>,
        reference: Option<&AlgorithmCollection>,
        options: &RldOptions,
    ) -> EkResult<RunLengthDistributions> {
        let by_algorithm = self.algorithms_in(dimension);
        if by_algorithm.is_empty() {
            return Err(ComputationError::NoDataInDimension { dimension }.into());
        }
        let requested: Vec<u32> = match fun_list {
            Some(list) => list.to_vec(),
            None => by_algorithm
                .values()
                .flatten()
                .map(|u| u.function_id())
                .collect::<BTreeSet<u32>>()
                .into_iter()
                .collect(),
        };

        let mut run = RldRun {
            targets,
            requested: &requested,
            reference: reference.map(|c| DistributionAggregator::new(c).with_settings(self.settings.clone())),
            options,
            sampler: options
                .bootstrap
                .then(|| BootstrapSampler::new(self.settings.bootstrap_seed)),
            restart_sample_size: self.settings.simulated_runlength_sample_size,
            reference_lines: BTreeMap::new(),
            warnings: Vec::new(),
        };

        let mut per_algorithm = BTreeMap::new();
        let mut envelope: Option<Vec<f64>> = None;
        for (algorithm, units) in by_algorithm {
            let distribution = match run.distribution(&algorithm, &units) {
                Ok(distribution) => distribution,
                Err(EkError::Computation(error)) if excludes_algorithm(&error) => {
                    run.warnings.push(AggregationWarning::algorithm_excluded(&algorithm, &error));
                    continue;
                }
                Err(error) => return Err(error),
            };

            if let Some(envelope) = envelope.as_mut() {
                if envelope.len() != distribution.len() {
                    let error = ComputationError::EnvelopeLengthMismatch {
                        algorithm: algorithm.clone(),
                        expected: envelope.len(),
                        actual: distribution.len(),
                    };
                    run.warnings.push(AggregationWarning::algorithm_excluded(&algorithm, &error));
                    continue;
                }
                for (e, &v) in envelope.iter_mut().zip(&distribution.sorted_evals) {
                    *e = fmin(*e, v);
                }
            } else {
                envelope = Some(distribution.sorted_evals.iter().map(|&v| fmin(f64::INFINITY, v)).collect());
            }
            per_algorithm.insert(algorithm, distribution);
        }

        tracing::debug!(
            "Run-length distributions in {}-D: {} algorithms kept, {} warnings",
            dimension,
            per_algorithm.len(),
            run.warnings.len()
        );
        Ok(RunLengthDistributions {
            per_algorithm,
            left_envelope: envelope.unwrap_or_default(),
            warnings: run.warnings,
        })
    }

    fn algorithms_in(&self, dimension: u32) -> BTreeMap<String, Vec<&'a ProblemUnit>> {
        let mut map: BTreeMap<String, Vec<&'a ProblemUnit>> = BTreeMap::new();
        for unit in self.collection.iter().filter(|u| u.dimension() == dimension) {
            map.entry(unit.algorithm_id().to_string()).or_default().push(unit);
        }
        map
    }
}

/// Failures that drop one algorithm but leave the rest of the batch intact.
fn excludes_algorithm(error: &ComputationError) -> bool {
    matches!(
        error,
        ComputationError::DuplicateFunction { .. }
            | ComputationError::FunctionSetMismatch { .. }
            | ComputationError::EnvelopeLengthMismatch { .. }
            | ComputationError::NonFiniteReferenceScore { .. }
    )
}

/// `k` indices spread evenly over `0..n`, rounded half up.
fn spread_indices(n: usize, k: usize) -> Vec<usize> {
    match k {
        0 => Vec::new(),
        1 => vec![0],
        _ => {
            let step = n.saturating_sub(1) as f64 / (k - 1) as f64;
            (0..k).map(|j| (0.5 + j as f64 * step) as usize).collect()
        }
    }
}

/// State of one `run_length_distributions` call.
struct RldRun<'r> {
    targets: &'r dyn Targets,
    /// Functions every algorithm must cover.
    requested: &'r [u32],
    reference: Option<DistributionAggregator<'r>>,
    options: &'r RldOptions,
    sampler: Option<BootstrapSampler>,
    restart_sample_size: usize,
    /// Keyed by function and line length.
    reference_lines: BTreeMap<(u32, usize), Vec<Vec<f64>>>,
    warnings: Vec<AggregationWarning>,
}

impl RldRun<'_> {
    fn distribution(&mut self, algorithm: &str, units: &[&ProblemUnit]) -> EkResult<RunLengthDistribution> {
        let mut evals_flat: Vec<f64> = Vec::new();
        let mut scores_flat: Option<Vec<f64>> = self.reference.is_some().then(Vec::new);
        let mut processed = Vec::new();
        let mut solved = Vec::new();

        for unit in units {
            let function = unit.function_id();
            if !self.requested.contains(&function) {
                continue;
            }
            processed.push(function);

            let problem = unit.problem_id();
            let targets = self.targets.resolve(problem)?;
            let rows = self.unit_evals(unit, &targets);

            if let Some(scores) = scores_flat.as_mut() {
                let line_len = rows.first().map_or(0, Vec::len);
                let lines = self.reference_lines(problem, &targets, line_len)?;
                for (i, (line, row)) in lines.iter().zip(&rows).enumerate() {
                    let percentile_scoring = matches!(self.options.reference_scoring, ReferenceScoring::Percentile(_));
                    if percentile_scoring
                        && line.iter().any(|v| !v.is_finite())
                        && row.iter().any(|v| v.is_finite())
                    {
                        return Err(ComputationError::NonFiniteReferenceScore {
                            function,
                            target_index: i,
                        }
                        .into());
                    }
                    scores.extend_from_slice(line);
                }
            }

            let before = evals_flat.len();
            evals_flat.extend(rows.into_iter().flatten());
            if evals_flat[before..].iter().any(|v| v.is_finite()) {
                solved.push(function);
            }
        }

        processed.sort_unstable();
        solved.sort_unstable();
        if let Some(w) = processed.windows(2).find(|w| w[0] == w[1]) {
            return Err(ComputationError::DuplicateFunction {
                algorithm: algorithm.to_string(),
                function: w[0],
            }
            .into());
        }
        let requested: BTreeSet<u32> = self.requested.iter().copied().collect();
        if processed.iter().copied().collect::<BTreeSet<u32>>() != requested {
            return Err(ComputationError::FunctionSetMismatch {
                algorithm: algorithm.to_string(),
                processed,
                requested: requested.into_iter().collect(),
            }
            .into());
        }

        let (sorted_evals, reference_scores) = match scores_flat {
            Some(scores) => {
                let idx = argsort_nan_last(&evals_flat);
                (
                    idx.iter().map(|&i| evals_flat[i]).collect(),
                    Some(idx.iter().map(|&i| scores[i]).collect()),
                )
            }
            None => {
                sort_nan_last(&mut evals_flat);
                (evals_flat, None)
            }
        };

        Ok(RunLengthDistribution {
            algorithm: algorithm.to_string(),
            sorted_evals,
            functions_solved: solved,
            functions_processed: processed,
            reference_scores,
        })
    }

    /// One sample row per target.
    fn unit_evals(&mut self, unit: &ProblemUnit, targets: &[f64]) -> Vec<Vec<f64>> {
        let data_per_target = self.options.data_per_target;
        match self.options.simulated_restarts {
            SimulatedRestarts::Off => {
                let rows = match self.sampler.as_mut() {
                    Some(sampler) => unit.det_evals_bootstrap(targets, sampler),
                    None => unit.det_evals(targets),
                };
                match data_per_target {
                    Some(n) => rows
                        .iter()
                        .map(|row| {
                            let mut sample = resample_derandomized(row, n);
                            sort_nan_last(&mut sample);
                            sample
                        })
                        .collect(),
                    None => rows,
                }
            }
            restarts => {
                let n = match restarts {
                    SimulatedRestarts::Samples(n) if n > 0 => n,
                    _ => data_per_target.unwrap_or(0) + 2 * unit.nb_runs() + self.restart_sample_size,
                };
                let rows = unit.evals_with_simulated_restarts(targets, n, self.sampler.as_mut());
                match data_per_target {
                    Some(k) => {
                        let index = spread_indices(n, k);
                        rows.iter().map(|row| index.iter().map(|&i| row[i]).collect()).collect()
                    }
                    None => rows,
                }
            }
        }
    }

    /// Reference score lines of `problem`, each of length `line_len` and
    /// sorted, computed once per function.
    fn reference_lines(&mut self, problem: ProblemId, targets: &[f64], line_len: usize) -> EkResult<Vec<Vec<f64>>> {
        let key = (problem.function, line_len);
        if let Some(lines) = self.reference_lines.get(&key) {
            return Ok(lines.clone());
        }
        let Some(reference) = self.reference.as_ref() else {
            return Ok(Vec::new());
        };

        let raw: Vec<Vec<f64>> = match self.options.reference_scoring {
            ReferenceScoring::Percentile(p) => {
                let scoring = move |line: &[f64]| prctile(line, &[p], true)[0];
                let best = reference.best_lines_at(targets, problem, Some(&scoring));
                if best.has_missing() {
                    self.warnings
                        .push(AggregationWarning::reference_lines_missing(problem.function, problem.dimension));
                }
                best.scores.iter().map(|&score| vec![score; line_len]).collect()
            }
            ReferenceScoring::BestData => {
                let number = self.options.data_per_target.unwrap_or(line_len);
                let lines = reference.best_data_at(targets, problem, number);
                if lines.iter().any(Vec::is_empty) {
                    self.warnings
                        .push(AggregationWarning::reference_lines_missing(problem.function, problem.dimension));
                }
                lines
                    .into_iter()
                    .map(|line| if line.is_empty() { vec![f64::INFINITY; line_len] } else { line })
                    .collect()
            }
        };

        let lines: Vec<Vec<f64>> = raw
            .iter()
            .map(|line| {
                let mut sample = resample_derandomized(line, line_len);
                sort_nan_last(&mut sample);
                sample
            })
            .collect();
        self.reference_lines.insert(key, lines.clone());
        Ok(lines)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::warnings::WarningKind;
    use ek_targets::TargetValues;
    use ek_types::UnitHeader;

    const NAN: f64 = f64::NAN;

    pub(crate) fn unit(alg: &str, function: u32, row: [f64; 3]) -> ProblemUnit {
        ProblemUnit::new(
            UnitHeader::new(alg, function, 2),
            vec![vec![1e-1, row[0], row[1], row[2]]],
            vec![100.0; 3],
            vec![1, 2, 3],
        )
        .unwrap()
    }

    /// A solves everything but one trial on f2; B misses one trial on f1.
    pub(crate) fn two_algorithms() -> AlgorithmCollection {
        let mut collection = AlgorithmCollection::new();
        collection
            .extend(vec![
                unit("A", 1, [10.0, 20.0, 30.0]),
                unit("A", 2, [5.0, NAN, 15.0]),
                unit("B", 1, [8.0, 40.0, NAN]),
                unit("B", 2, [50.0, 60.0, 70.0]),
            ])
            .unwrap();
        collection
    }

    pub(crate) fn reference() -> AlgorithmCollection {
        let mut collection = AlgorithmCollection::new();
        collection
            .extend(vec![unit("best", 1, [2.0, 4.0, 6.0]), unit("best", 2, [1.0, 3.0, 5.0])])
            .unwrap();
        collection
    }

    pub(crate) fn targets() -> TargetValues {
        TargetValues::new([1e-1])
    }

    fn options() -> RldOptions {
        RldOptions::default().with_data_per_target(Some(3))
    }

    fn same(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y || (x.is_nan() && y.is_nan()))
    }

    #[test]
    fn distributions_and_envelope() {
        let collection = two_algorithms();
        let aggregator = DistributionAggregator::new(&collection);
        let rld = aggregator
            .run_length_distributions(2, &targets(), None, None, &options())
            .unwrap();

        let a = rld.get("A").unwrap();
        let b = rld.get("B").unwrap();
        assert!(same(&a.sorted_evals, &[5.0, 10.0, 15.0, 20.0, 30.0, NAN]));
        assert!(same(&b.sorted_evals, &[8.0, 40.0, 50.0, 60.0, 70.0, NAN]));
        assert_eq!(a.functions_solved, vec![1, 2]);
        assert_eq!(a.functions_processed, vec![1, 2]);
        assert_eq!(rld.left_envelope, vec![5.0, 10.0, 15.0, 20.0, 30.0, f64::INFINITY]);
        assert!(rld.warnings.is_empty());
        assert!(rld.single().is_none());
    }

    #[test]
    fn envelope_is_pointwise_minimum() {
        let collection = two_algorithms();
        let aggregator = DistributionAggregator::new(&collection);
        let rld = aggregator
            .run_length_distributions(2, &targets(), None, None, &options())
            .unwrap();

        for (i, &e) in rld.left_envelope.iter().enumerate() {
            let min = rld
                .per_algorithm
                .values()
                .map(|d| d.sorted_evals[i])
                .fold(f64::INFINITY, fmin);
            assert_eq!(e, min);
        }
    }

    #[test]
    fn function_subset() {
        let collection = two_algorithms();
        let aggregator = DistributionAggregator::new(&collection);
        let rld = aggregator
            .run_length_distributions(2, &targets(), Some(&[1]), None, &options())
            .unwrap();

        assert_eq!(rld.left_envelope, vec![8.0, 20.0, 30.0]);
        assert_eq!(rld.get("B").unwrap().functions_solved, vec![1]);
    }

    #[test]
    fn missing_functions_exclude_algorithms() {
        let collection = two_algorithms();
        let aggregator = DistributionAggregator::new(&collection);
        let rld = aggregator
            .run_length_distributions(2, &targets(), Some(&[1, 2, 3]), None, &options())
            .unwrap();

        assert!(rld.per_algorithm.is_empty());
        assert!(rld.left_envelope.is_empty());
        assert_eq!(rld.warnings.len(), 2);
        assert_eq!(rld.warnings[0].algorithm(), Some("A"));
    }

    #[test]
    fn duplicate_function_excludes_algorithm() {
        let mut collection = two_algorithms();
        let mut again = unit("A", 1, [11.0, 21.0, 31.0]);
        again.header_mut().comment = "rerun".to_string();
        collection.push(again).unwrap();

        let aggregator = DistributionAggregator::new(&collection);
        let rld = aggregator
            .run_length_distributions(2, &targets(), None, None, &options())
            .unwrap();

        assert!(rld.get("A").is_none());
        assert!(rld.get("B").is_some());
        assert!(rld.warnings[0].message.contains("processed twice"));
    }

    #[test]
    fn algorithm_missing_a_function_is_excluded() {
        let mut collection = two_algorithms();
        collection.push(unit("C", 1, [1.0, 2.0, 3.0])).unwrap();

        let aggregator = DistributionAggregator::new(&collection);
        let rld = aggregator
            .run_length_distributions(2, &targets(), None, None, &options())
            .unwrap();

        assert!(rld.get("C").is_none());
        assert_eq!(rld.left_envelope.len(), 6);
        assert_eq!(rld.warnings.len(), 1);
        assert_eq!(rld.warnings[0].algorithm(), Some("C"));
    }

    #[test]
    fn incomplete_algorithm_sorting_first_does_not_set_the_envelope() {
        let mut collection = AlgorithmCollection::new();
        collection
            .extend(vec![
                unit("A", 1, [1.0, 2.0, 3.0]),
                unit("B", 1, [10.0, 20.0, 30.0]),
                unit("B", 2, [5.0, 15.0, 25.0]),
                unit("C", 1, [8.0, 40.0, 50.0]),
                unit("C", 2, [50.0, 60.0, 70.0]),
            ])
            .unwrap();

        let aggregator = DistributionAggregator::new(&collection);
        let rld = aggregator
            .run_length_distributions(2, &targets(), None, None, &options())
            .unwrap();

        assert!(rld.get("A").is_none());
        assert!(rld.get("B").is_some());
        assert!(rld.get("C").is_some());
        assert_eq!(rld.left_envelope, vec![5.0, 10.0, 15.0, 20.0, 25.0, 30.0]);
        assert_eq!(rld.warnings.len(), 1);
        assert_eq!(rld.warnings[0].algorithm(), Some("A"));
        assert!(matches!(rld.warnings[0].kind, WarningKind::AlgorithmExcluded { .. }));
    }

    #[test]
    fn unknown_dimension_is_an_error() {
        let collection = two_algorithms();
        let aggregator = DistributionAggregator::new(&collection);
        let err = aggregator
            .run_length_distributions(40, &targets(), None, None, &options())
            .unwrap_err();
        assert!(matches!(
            err,
            EkError::Computation(ComputationError::NoDataInDimension { dimension: 40 })
        ));
    }

    #[test]
    fn reference_scores_follow_the_sort() {
        let collection = two_algorithms();
        let reference = reference();
        let aggregator = DistributionAggregator::new(&collection);
        let rld = aggregator
            .run_length_distributions(2, &targets(), None, Some(&reference), &options())
            .unwrap();

        let a = rld.get("A").unwrap();
        assert_eq!(a.reference_scores.as_deref(), Some(&[1.0, 2.0, 1.0, 2.0, 2.0, 1.0][..]));
        assert!(same(&a.normalized(), &[5.0, 5.0, 15.0, 10.0, 15.0, NAN]));
        // the envelope stays on unnormalized data
        assert_eq!(rld.left_envelope[0], 5.0);
    }

    #[test]
    fn best_data_reference_scoring() {
        let collection = two_algorithms();
        let reference = reference();
        let aggregator = DistributionAggregator::new(&collection);
        let options = options().with_reference_scoring(ReferenceScoring::BestData);
        let rld = aggregator
            .run_length_distributions(2, &targets(), Some(&[1]), Some(&reference), &options)
            .unwrap();

        let b = rld.get("B").unwrap();
        assert!(same(&b.sorted_evals, &[8.0, 40.0, NAN]));
        assert_eq!(b.reference_scores.as_deref(), Some(&[2.0, 4.0, 6.0][..]));
    }

    #[test]
    fn simulated_restarts_fill_failures() {
        let collection = two_algorithms();
        let aggregator = DistributionAggregator::new(&collection);
        let options = options().with_simulated_restarts(SimulatedRestarts::Auto);
        let rld = aggregator
            .run_length_distributions(2, &targets(), None, None, &options)
            .unwrap();

        let a = rld.get("A").unwrap();
        assert_eq!(a.len(), 6);
        assert!(a.sorted_evals.iter().all(|v| v.is_finite()));
        assert!(a.sorted_evals.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn restarts_without_failures_reproduce_the_trials() {
        let mut collection = AlgorithmCollection::new();
        collection.push(unit("D", 1, [3.0, 1.0, 2.0])).unwrap();
        let aggregator = DistributionAggregator::new(&collection);
        let options = options().with_simulated_restarts(SimulatedRestarts::Samples(3));
        let rld = aggregator
            .run_length_distributions(2, &targets(), None, None, &options)
            .unwrap();

        assert_eq!(rld.single().unwrap().sorted_evals, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn bootstrap_is_reproducible_for_a_seed() {
        let collection = two_algorithms();
        let aggregator = DistributionAggregator::new(&collection);
        let options = options().with_bootstrap(true);
        let first = aggregator
            .run_length_distributions(2, &targets(), None, None, &options)
            .unwrap();
        let second = aggregator
            .run_length_distributions(2, &targets(), None, None, &options)
            .unwrap();

        for (x, y) in first.per_algorithm.values().zip(second.per_algorithm.values()) {
            assert!(same(&x.sorted_evals, &y.sorted_evals));
        }
    }

    #[test]
    fn spread_indices_cover_both_ends() {
        assert_eq!(spread_indices(10, 4), vec![0, 3, 6, 9]);
        assert_eq!(spread_indices(5, 1), vec![0]);
        assert!(spread_indices(5, 0).is_empty());
    }
}
