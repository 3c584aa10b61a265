//! Targets derived from the budgets a reference algorithm needed.
//!
//! For every run length the hardest threshold the reference algorithm
//! reached within that budget is looked up on its ERT curve, and the target
//! is placed one step harder than that threshold.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use ek_engine::stats::cmp_nan_last;
use ek_types::{internal_error, ComputationError, EkResult, ProblemId, TestbedSettings};

use crate::labels::num2str;
use crate::reference::{ReferenceLoader, ReferenceMap, ReferenceSource};
use crate::values::{discretize, Targets};

/// Final target used as floor unless configured otherwise.
pub const DEFAULT_SMALLEST_TARGET: f64 = 1e-8;

/// Largest product of separation factors before a warning is logged.
const MAX_FORCED_SPREAD: f64 = 1e3;

/// Relative offset keeping a derived target just above the reached threshold
/// divided by the step, so that reaching exactly that threshold still counts.
const TARGET_OFFSET: f64 = 1e-9;

struct Resolved {
    data: Arc<ReferenceMap>,
    algorithm: Option<String>,
}

/// Target values defined by evaluation budgets of a reference algorithm.
pub struct RunlengthBasedTargetValues {
    run_lengths: Vec<f64>,
    source: ReferenceSource,
    loader: Option<Arc<dyn ReferenceLoader>>,
    settings: TestbedSettings,
    smallest_target: f64,
    times_dimension: bool,
    force_different_targets_factor: f64,
    step_to_next_difficult_target: f64,
    unique_target_values: bool,
    resolved: Mutex<Option<Resolved>>,
}

impl fmt::Debug for RunlengthBasedTargetValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunlengthBasedTargetValues")
            .field("run_lengths", &self.run_lengths)
            .field("source", &self.source)
            .field("has_loader", &self.loader.is_some())
            .field("smallest_target", &self.smallest_target)
            .field("times_dimension", &self.times_dimension)
            .field("force_different_targets_factor", &self.force_different_targets_factor)
            .field("step_to_next_difficult_target", &self.step_to_next_difficult_target)
            .field("unique_target_values", &self.unique_target_values)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl RunlengthBasedTargetValues {
    /// Budgets are sorted ascending.
    pub fn new<I, S>(run_lengths: I, source: S) -> Self
    where
        I: IntoIterator<Item = f64>,
        S: Into<ReferenceSource>,
    {
        let mut run_lengths: Vec<f64> = run_lengths.into_iter().collect();
        run_lengths.sort_by(cmp_nan_last);
        Self {
            run_lengths,
            source: source.into(),
            loader: None,
            settings: TestbedSettings::default(),
            smallest_target: DEFAULT_SMALLEST_TARGET,
            times_dimension: true,
            force_different_targets_factor: 10f64.powf(0.04),
            step_to_next_difficult_target: 10f64.powf(0.2),
            unique_target_values: false,
            resolved: Mutex::new(None),
        }
    }

    pub fn with_loader(mut self, loader: Arc<dyn ReferenceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn with_settings(mut self, settings: TestbedSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_smallest_target(mut self, smallest_target: f64) -> Self {
        self.smallest_target = smallest_target;
        self
    }

    pub fn with_times_dimension(mut self, times_dimension: bool) -> Self {
        self.times_dimension = times_dimension;
        self
    }

    /// Factors below one are inverted.
    pub fn with_force_different_targets_factor(mut self, factor: f64) -> Self {
        self.force_different_targets_factor = at_least_one(factor);
        self
    }

    /// Factors below one are inverted.
    pub fn with_step_to_next_difficult_target(mut self, step: f64) -> Self {
        self.step_to_next_difficult_target = at_least_one(step);
        self
    }

    pub fn with_unique_target_values(mut self, unique: bool) -> Self {
        self.unique_target_values = unique;
        self
    }

    pub fn run_lengths(&self) -> &[f64] {
        &self.run_lengths
    }

    pub fn is_initialized(&self) -> bool {
        self.resolved.lock().is_some()
    }

    /// Algorithm id of the resolved reference data.
    pub fn reference_algorithm(&self) -> Option<String> {
        self.resolved.lock().as_ref().and_then(|r| r.algorithm.clone())
    }

    /// Resolve the reference source. Only the first successful call loads
    /// anything; later calls return immediately.
    pub fn initialize(&self) -> EkResult<()> {
        let mut resolved = self.resolved.lock();
        if resolved.is_some() {
            return Ok(());
        }

        let spread = self.force_different_targets_factor.powi(self.run_lengths.len() as i32);
        if spread > MAX_FORCED_SPREAD {
            tracing::warn!(
                "Separation factor {} over {} run lengths spans {:.1e}, more than {:.0e}",
                self.force_different_targets_factor,
                self.run_lengths.len(),
                spread,
                MAX_FORCED_SPREAD
            );
        }

        let data = match &self.source {
            ReferenceSource::Map(map) => Arc::clone(map),
            ReferenceSource::Testbed => {
                let name = self.settings.reference_algorithm.as_deref().ok_or_else(|| {
                    ComputationError::MissingReferenceData {
                        message: format!("testbed {} names no reference algorithm", self.settings.name),
                    }
                })?;
                Arc::new(self.loader()?.load_named(name)?)
            }
            ReferenceSource::Named(name) => Arc::new(self.loader()?.load_named(name)?),
            ReferenceSource::Folders(folders) => Arc::new(self.loader()?.load_folders(folders)?),
        };
        if data.is_empty() {
            return Err(ComputationError::MissingReferenceData {
                message: format!("{:?} resolved to no problems", self.source),
            }
            .into());
        }

        let algorithm = data.algorithm().map(str::to_string);
        tracing::info!(
            "Resolved reference data {} for {} problems",
            algorithm.as_deref().unwrap_or("<unnamed>"),
            data.len()
        );
        *resolved = Some(Resolved { data, algorithm });
        Ok(())
    }

    fn loader(&self) -> EkResult<&Arc<dyn ReferenceLoader>> {
        self.loader.as_ref().ok_or_else(|| {
            ComputationError::MissingReferenceData {
                message: format!("no loader configured for {:?}", self.source),
            }
            .into()
        })
    }

    fn reference_data(&self) -> EkResult<Arc<ReferenceMap>> {
        self.initialize()?;
        self.resolved
            .lock()
            .as_ref()
            .map(|r| Arc::clone(&r.data))
            .ok_or_else(|| internal_error!("reference data vanished after initialization"))
    }

    /// Targets for `problem`, easiest first.
    pub fn call(&self, problem: ProblemId) -> EkResult<Vec<f64>> {
        let data = self.reference_data()?;
        let ProblemId { function, dimension } = problem;

        let scale = if self.times_dimension { f64::from(dimension) } else { 1.0 };
        if function > 100 {
            if let Some(&longest) = self.run_lengths.last() {
                if longest * scale < 1e3 {
                    tracing::warn!(
                        "Largest budget {} for noisy f{} in {}-D is below 1e3 evaluations",
                        longest * scale,
                        function,
                        dimension
                    );
                }
            }
        }

        let unit = data
            .get(problem)
            .ok_or(ComputationError::ReferenceProblemMissing { function, dimension })?;
        let reference_targets = unit.target();
        let ert = unit.ert();
        let easiest = *reference_targets
            .first()
            .ok_or_else(|| internal_error!("reference data for {} has no targets", problem))?;
        let end = reference_targets
            .iter()
            .rposition(|&t| t >= self.smallest_target)
            .map_or(reference_targets.len(), |i| i + 1);

        let step = self.step_to_next_difficult_target;
        let force = self.force_different_targets_factor;
        let mut targets: Vec<f64> = Vec::with_capacity(self.run_lengths.len());
        for &rl in &self.run_lengths {
            let budget = (rl * scale).max(1.0);
            let target = match ert[..end].iter().rposition(|&e| e <= budget) {
                Some(i) => (1.0 + TARGET_OFFSET) * reference_targets[i] / step,
                None => {
                    tracing::warn!(
                        "Run length {} is too small for f{} in {}-D; using the easiest target {:e}",
                        rl,
                        function,
                        dimension,
                        easiest
                    );
                    easiest
                }
            };
            let target = match targets.last() {
                Some(&previous) if force > 1.0 && target > previous / force => previous / force,
                _ => target,
            };
            targets.push(target);
        }

        for t in targets.iter_mut() {
            if *t < self.smallest_target {
                *t = self.smallest_target;
            }
        }

        if let (Some(&first), Some(&last)) = (targets.first(), targets.last()) {
            if last < self.smallest_target {
                tracing::warn!(
                    "Hardest target {:e} of {} is below {:e}; rescaling",
                    last,
                    problem,
                    self.smallest_target
                );
                let exponent = (first / self.smallest_target).ln() / (first / last).ln();
                for t in targets.iter_mut() {
                    *t = (t.ln() * exponent).exp();
                }
                if let Some(&rescaled_last) = targets.last() {
                    let correction = (1.0 + 1e-12) * self.smallest_target / rescaled_last;
                    for t in targets.iter_mut() {
                        *t *= correction;
                    }
                }
            }
        }

        if self.unique_target_values {
            targets.sort_by(|a, b| cmp_nan_last(b, a));
            targets.dedup();
        }
        Ok(targets)
    }

    pub fn call_discretized(&self, problem: ProblemId) -> EkResult<Vec<f64>> {
        Ok(discretize(&self.call(problem)?))
    }
}

impl Targets for RunlengthBasedTargetValues {
    fn resolve(&self, problem: ProblemId) -> EkResult<Vec<f64>> {
        self.call(problem)
    }

    fn len(&self) -> usize {
        self.run_lengths.len()
    }

    fn label(&self, i: usize) -> Option<String> {
        self.run_lengths.get(i).map(|&rl| num2str(rl, 2))
    }

    fn loglabel(&self, i: usize, decimals: usize) -> Option<String> {
        self.run_lengths.get(i).map(|&rl| num2str(rl.log10(), decimals + 1))
    }

    fn label_name(&self) -> String {
        let name = if self.times_dimension { "RL/dim" } else { "RL" };
        name.to_string()
    }

    fn short_info(&self) -> String {
        let name = match &self.source {
            ReferenceSource::Testbed => self.settings.reference_algorithm.clone(),
            ReferenceSource::Named(name) => Some(name.clone()),
            ReferenceSource::Map(map) => map.algorithm().map(str::to_string),
            ReferenceSource::Folders(_) => self.reference_algorithm(),
        };
        match name {
            Some(name) => format!("reference budgets from {name}"),
            None => "budget-based targets".to_string(),
        }
    }
}

fn at_least_one(factor: f64) -> f64 {
    if factor < 1.0 {
        1.0 / factor
    } else {
        factor
    }
}
