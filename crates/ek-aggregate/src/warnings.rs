//! Warnings collected while aggregating.

use serde::{Deserialize, Serialize};
use std::fmt;

use ek_types::ComputationError;

/// Severity of an aggregation warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WarningSeverity {
    /// Informational, the result is complete.
    Info,
    /// Part of the input was left out of the result.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// The algorithm is missing from the distributions.
    AlgorithmExcluded { algorithm: String },
    /// Some reference lines could not be determined.
    ReferenceLinesMissing { function: u32, dimension: u32 },
    /// The algorithm has a distribution but no ranking score.
    AlgorithmNotRanked { algorithm: String },
}

/// A single warning recorded in an aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationWarning {
    pub severity: WarningSeverity,
    pub kind: WarningKind,
    pub message: String,
}

impl AggregationWarning {
    /// Create a warning and log it.
    pub fn new(severity: WarningSeverity, kind: WarningKind, message: String) -> Self {
        match severity {
            WarningSeverity::Info => tracing::info!("{}", message),
            WarningSeverity::Warning => tracing::warn!("{}", message),
        }
        Self {
            severity,
            kind,
            message,
        }
    }

    pub fn algorithm_excluded(algorithm: &str, error: &ComputationError) -> Self {
        Self::new(
            WarningSeverity::Warning,
            WarningKind::AlgorithmExcluded {
                algorithm: algorithm.to_string(),
            },
            format!("{algorithm} excluded: {error}"),
        )
    }

    pub fn not_ranked(algorithm: &str, error: &ComputationError) -> Self {
        Self::new(
            WarningSeverity::Warning,
            WarningKind::AlgorithmNotRanked {
                algorithm: algorithm.to_string(),
            },
            format!("{algorithm} could not be ranked: {error}"),
        )
    }

    pub fn reference_lines_missing(function: u32, dimension: u32) -> Self {
        Self::new(
            WarningSeverity::Info,
            WarningKind::ReferenceLinesMissing { function, dimension },
            format!("Best data lines for f{function} in {dimension}-D could not be determined"),
        )
    }

    /// Name of the algorithm the warning is about, if any.
    pub fn algorithm(&self) -> Option<&str> {
        match &self.kind {
            WarningKind::AlgorithmExcluded { algorithm } | WarningKind::AlgorithmNotRanked { algorithm } => {
                Some(algorithm)
            }
            WarningKind::ReferenceLinesMissing { .. } => None,
        }
    }
}

impl fmt::Display for AggregationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.severity, self.message)
    }
}
