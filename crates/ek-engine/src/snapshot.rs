//! Serialized form of a [`ProblemUnit`].
//!
//! Reading is permissive: snapshots written by older versions may lack
//! derived columns or use legacy field names. Derived data (`target`, `ert`)
//! is always recomputed from `evals`, and a missing or mismatched `maxevals`
//! is rebuilt from the largest recorded evaluation per trial.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use ek_types::{EkError, UnitHeader};

use crate::unit::{validate_layout, ProblemUnit, TrialRecord};

/// JSON has no NaN or infinity; missing entries are written as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSnapshot {
    #[serde(flatten)]
    pub header: UnitHeader,
    #[serde(default)]
    pub evals: Vec<Vec<Option<f64>>>,
    #[serde(default)]
    pub target: Option<Vec<f64>>,
    #[serde(default)]
    pub ert: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub maxevals: Option<Vec<f64>>,
    #[serde(default, alias = "instancenumbers", alias = "itrials")]
    pub instance_numbers: Option<Vec<u32>>,
    #[serde(default)]
    pub trials: Vec<TrialRecord>,
    #[serde(default)]
    pub reference_values: BTreeMap<u32, f64>,
    #[serde(default, alias = "indexFiles")]
    pub index_files: Vec<String>,
    #[serde(default, alias = "dataFiles")]
    pub data_files: Vec<String>,
    #[serde(default)]
    pub complemented: bool,
}

impl TryFrom<UnitSnapshot> for ProblemUnit {
    type Error = EkError;

    fn try_from(snapshot: UnitSnapshot) -> Result<Self, Self::Error> {
        let header = snapshot.header;
        let evals: Vec<Vec<f64>> = snapshot
            .evals
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect();
        let columns = evals.first().map_or(0, |row| row.len().saturating_sub(1));

        let maxevals = match snapshot.maxevals {
            Some(maxevals) if maxevals.len() == columns => maxevals,
            other => {
                tracing::warn!(
                    "{}: maxevals {} in snapshot, rebuilt from recorded evaluations",
                    header,
                    if other.is_some() { "mismatched" } else { "missing" }
                );
                recorded_max_evals(&evals, columns)
            }
        };

        let instance_numbers = snapshot.instance_numbers.unwrap_or_else(|| {
            tracing::warn!("{}: no instance numbers in snapshot, assuming instance 0", header);
            vec![0; columns]
        });

        validate_layout(
            &header,
            &evals,
            maxevals.len(),
            instance_numbers.len(),
            snapshot.trials.len(),
        )?;

        let mut unit = ProblemUnit {
            header,
            evals,
            target: Vec::new(),
            ert: Vec::new(),
            maxevals,
            instance_numbers,
            trials: snapshot.trials,
            reference_values: snapshot.reference_values,
            index_files: snapshot.index_files,
            data_files: snapshot.data_files,
            complemented: snapshot.complemented,
        };
        unit.compute_ert();

        if let Some(stored) = snapshot.target {
            if stored != unit.target {
                tracing::debug!("{}: stored target column differs, using recomputed one", unit.header);
            }
        }
        if let Some(stored) = snapshot.ert {
            let stored: Vec<f64> = stored.into_iter().map(|v| v.unwrap_or(f64::INFINITY)).collect();
            if stored != unit.ert {
                tracing::debug!("{}: stored ert column differs, using recomputed one", unit.header);
            }
        }
        Ok(unit)
    }
}

impl From<ProblemUnit> for UnitSnapshot {
    fn from(unit: ProblemUnit) -> Self {
        let finite = |v: f64| if v.is_finite() { Some(v) } else { None };
        Self {
            header: unit.header,
            evals: unit
                .evals
                .into_iter()
                .map(|row| row.into_iter().map(finite).collect())
                .collect(),
            target: Some(unit.target),
            ert: Some(unit.ert.into_iter().map(finite).collect()),
            maxevals: Some(unit.maxevals),
            instance_numbers: Some(unit.instance_numbers),
            trials: unit.trials,
            reference_values: unit.reference_values,
            index_files: unit.index_files,
            data_files: unit.data_files,
            complemented: unit.complemented,
        }
    }
}

/// Largest recorded evaluation count per trial column, 0 if none.
fn recorded_max_evals(evals: &[Vec<f64>], columns: usize) -> Vec<f64> {
    (1..=columns)
        .map(|c| {
            evals
                .iter()
                .filter_map(|row| row.get(c).copied())
                .filter(|v| !v.is_nan())
                .fold(0.0, f64::max)
        })
        .collect()
}
