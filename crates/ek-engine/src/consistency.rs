//! Checks of the recorded instances against the experimental protocol.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use ek_types::TestbedSettings;

use crate::unit::ProblemUnit;

/// Comment prefix marking a synthetic combination of several algorithms.
const COMBINATION_MARKER: &str = "% Combination of ";

/// A deviation from the expected set of instances. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyIssue {
    #[error("combined data should only hold instance 0, found {instances:?}")]
    CombinationInstances { instances: Vec<u32> },

    #[error("double instances in {instances:?}")]
    DuplicateInstances { instances: Vec<u32> },

    #[error("less than {expected} instances in {instances:?}")]
    TooFewInstances { expected: usize, instances: Vec<u32> },

    #[error("more than {expected} instances in {instances:?}")]
    TooManyInstances { expected: usize, instances: Vec<u32> },

    #[error("instance numbers {instances:?} match none of the historical instance patterns")]
    UnknownInstancePattern { instances: Vec<u32> },
}

impl ProblemUnit {
    /// All deviations of the recorded instances from the protocol of
    /// `settings`. Empty for a consistent unit.
    pub fn consistency_issues(&self, settings: &TestbedSettings) -> Vec<ConsistencyIssue> {
        let instances = self.instance_numbers.clone();

        if self.header.comment.contains(COMBINATION_MARKER) {
            return if instances == [0] {
                Vec::new()
            } else {
                vec![ConsistencyIssue::CombinationInstances { instances }]
            };
        }

        let expected = settings.expected_number_of_instances();
        let distinct: BTreeSet<u32> = instances.iter().copied().collect();

        if distinct.len() < instances.len() {
            // 2009 layout: instances 1 to 5, three trials each
            let counts = self.instance_counts();
            let is_2009_layout = counts
                .iter()
                .all(|(&instance, &count)| (1..=5).contains(&instance) && count == 3);
            if is_2009_layout {
                Vec::new()
            } else {
                vec![ConsistencyIssue::DuplicateInstances { instances }]
            }
        } else if instances.len() < expected {
            vec![ConsistencyIssue::TooFewInstances { expected, instances }]
        } else if instances.len() > expected {
            vec![ConsistencyIssue::TooManyInstances { expected, instances }]
        } else if !settings.allowed_instance_patterns.is_empty()
            && settings.instances_of_interest.is_none()
            && !settings
                .allowed_instance_patterns
                .contains(&self.instance_counts())
        {
            vec![ConsistencyIssue::UnknownInstancePattern { instances }]
        } else {
            Vec::new()
        }
    }

    /// True when the instances match the protocol; deviations are logged as
    /// warnings.
    pub fn consistency_check(&self, settings: &TestbedSettings) -> bool {
        let issues = self.consistency_issues(settings);
        for issue in &issues {
            tracing::warn!("{} (f{}, {}D)", issue, self.function_id(), self.dimension());
        }
        issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ek_types::UnitHeader;

    fn unit_with_instances(instances: Vec<u32>, comment: &str) -> ProblemUnit {
        let n = instances.len();
        ProblemUnit::new(
            UnitHeader::new("A", 1, 5).with_comment(comment),
            vec![std::iter::once(1.0).chain(vec![10.0; n]).collect()],
            vec![100.0; n],
            instances,
        )
        .unwrap()
    }

    #[test]
    fn standard_fifteen_instances_are_consistent() {
        let settings = TestbedSettings::default();
        let unit = unit_with_instances((1..=15).collect(), "");
        assert!(unit.consistency_check(&settings));
    }

    #[test]
    fn historical_2009_layout_is_consistent() {
        let settings = TestbedSettings::default();
        let instances = (1..=5).flat_map(|i| [i, i, i]).collect();
        assert!(unit_with_instances(instances, "").consistency_check(&settings));
    }

    #[test]
    fn other_duplicates_are_flagged() {
        let settings = TestbedSettings::default();
        let mut instances: Vec<u32> = (1..=14).collect();
        instances.push(1);
        let issues = unit_with_instances(instances, "").consistency_issues(&settings);
        assert!(matches!(issues[..], [ConsistencyIssue::DuplicateInstances { .. }]));
    }

    #[test]
    fn count_mismatches_are_flagged() {
        let settings = TestbedSettings::default();
        let few = unit_with_instances((1..=10).collect(), "");
        assert!(matches!(
            few.consistency_issues(&settings)[..],
            [ConsistencyIssue::TooFewInstances { expected: 15, .. }]
        ));
        let many = unit_with_instances((1..=16).collect(), "");
        assert!(!many.consistency_check(&settings));

        let biobj = TestbedSettings::biobjective();
        assert!(unit_with_instances((1..=10).collect(), "").consistency_check(&biobj));
    }

    #[test]
    fn unknown_pattern_is_flagged() {
        let settings = TestbedSettings::default();
        let instances = (1..=5).chain(91..101).collect();
        let issues = unit_with_instances(instances, "").consistency_issues(&settings);
        assert!(matches!(issues[..], [ConsistencyIssue::UnknownInstancePattern { .. }]));

        let recent = (1..=5).chain(71..81).collect();
        assert!(unit_with_instances(recent, "").consistency_check(&settings));
    }

    #[test]
    fn combination_must_use_instance_zero() {
        let settings = TestbedSettings::default();
        let comment = "% Combination of BFGS, NEWUOA";
        assert!(unit_with_instances(vec![0], comment).consistency_check(&settings));
        assert!(!unit_with_instances(vec![0, 1], comment).consistency_check(&settings));
    }

    #[test]
    fn instances_of_interest_set_expected_count() {
        let settings = TestbedSettings::default().with_instances_of_interest(vec![1, 2, 3]);
        assert!(unit_with_instances(vec![1, 2, 3], "").consistency_check(&settings));
    }
}
