//! Ranking algorithms by their distance to the left envelope.

use serde::{Deserialize, Serialize};

use ek_engine::{cmp_nan_last, nanmin, prctile, AlgorithmCollection};
use ek_targets::Targets;
use ek_types::{ComputationError, EkResult};

use crate::rld::{DistributionAggregator, RldOptions, RunLengthDistribution};
use crate::warnings::AggregationWarning;

/// Envelope entries below this many evaluations are ignored by default.
pub const DEFAULT_SMALLEST_EVALUATION_TO_USE: f64 = 3.0;

/// Percentiles reported for every ranked algorithm.
pub const RANKING_PERCENTILES: [f64; 5] = [2.0, 5.0, 15.0, 25.0, 50.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlgorithm {
    pub algorithm: String,
    /// Smaller is better.
    pub score: f64,
    /// [`RANKING_PERCENTILES`] of the distribution relative to the envelope,
    /// or to the reference scores when a reference was given.
    pub percentiles: Vec<f64>,
    pub distribution: RunLengthDistribution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmRanking {
    /// Best first.
    pub ranked: Vec<RankedAlgorithm>,
    pub left_envelope: Vec<f64>,
    pub warnings: Vec<AggregationWarning>,
}

impl AlgorithmRanking {
    pub fn algorithms(&self) -> Vec<&str> {
        self.ranked.iter().map(|r| r.algorithm.as_str()).collect()
    }
}

impl DistributionAggregator<'_> {
    /// Algorithms of `dimension` sorted by how close their distribution gets
    /// to the left envelope, best first.
    ///
    /// Only envelope entries of at least `smallest_evaluation_to_use`
    /// evaluations count. Without reference the score is the smallest ratio
    /// of distribution to envelope; with reference it is the 5th percentile
    /// of the distribution divided by the reference scores.
    pub fn get_sorted_algorithms(
        &self,
        dimension: u32,
        targets: &dyn Targets,
        fun_list: Option<&[u32]>,
        reference: Option<&AlgorithmCollection>,
        smallest_evaluation_to_use: f64,
    ) -> EkResult<AlgorithmRanking> {
        let rld = self.run_length_distributions(dimension, targets, fun_list, reference, &RldOptions::default())?;
        let envelope = rld.left_envelope;
        let mut warnings = rld.warnings;
        let selected: Vec<usize> = envelope
            .iter()
            .enumerate()
            .filter(|&(_, &e)| e >= smallest_evaluation_to_use)
            .map(|(i, _)| i)
            .collect();

        let mut ranked = Vec::with_capacity(rld.per_algorithm.len());
        for (algorithm, distribution) in rld.per_algorithm {
            if selected.is_empty() {
                let error = ComputationError::EmptyEnvelopeSelection {
                    algorithm: algorithm.clone(),
                    threshold: smallest_evaluation_to_use,
                };
                warnings.push(AggregationWarning::not_ranked(&algorithm, &error));
                continue;
            }

            let (score, relative) = match &distribution.reference_scores {
                Some(_) => {
                    let normalized = distribution.normalized();
                    let picked: Vec<f64> = selected.iter().map(|&i| normalized[i]).collect();
                    (prctile(&picked, &[5.0], true)[0], normalized)
                }
                None => {
                    let relative: Vec<f64> = distribution
                        .sorted_evals
                        .iter()
                        .zip(&envelope)
                        .map(|(evals, best)| evals / best)
                        .collect();
                    (nanmin(selected.iter().map(|&i| relative[i])), relative)
                }
            };

            ranked.push(RankedAlgorithm {
                percentiles: prctile(&relative, &RANKING_PERCENTILES, false),
                algorithm,
                score,
                distribution,
            });
        }
        ranked.sort_by(|a, b| cmp_nan_last(&a.score, &b.score));

        tracing::info!(
            "Ranked {} algorithms in {}-D: {}",
            ranked.len(),
            dimension,
            ranked.iter().map(|r| r.algorithm.as_str()).collect::<Vec<_>>().join(", ")
        );
        Ok(AlgorithmRanking {
            ranked,
            left_envelope: envelope,
            warnings,
        })
    }
}
