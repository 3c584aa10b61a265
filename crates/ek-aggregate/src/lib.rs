//! Aggregation of problem units across algorithms: empirical run-length
//! distributions, their left envelope, best-data reference lines, and
//! rankings against the envelope.

pub mod best;
pub mod ranking;
pub mod rld;
pub mod warnings;

pub use best::BestDataLines;
pub use ranking::{AlgorithmRanking, RankedAlgorithm, DEFAULT_SMALLEST_EVALUATION_TO_USE, RANKING_PERCENTILES};
pub use rld::{
    DistributionAggregator, ReferenceScoring, RldOptions, RunLengthDistribution, RunLengthDistributions,
    SimulatedRestarts,
};
pub use warnings::{AggregationWarning, WarningKind, WarningSeverity};
