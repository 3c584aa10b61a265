//! Testbed settings threaded explicitly through the statistics engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config_error;
use crate::errors::EkResult;

/// A named, contiguous range of function ids (e.g. "separ" = f1..f5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionGroup {
    pub key: String,
    pub description: String,
    /// First function id of the group (inclusive).
    pub first: u32,
    /// Last function id of the group (inclusive).
    pub last: u32,
}

impl FunctionGroup {
    pub fn new(key: &str, description: &str, first: u32, last: u32) -> Self {
        Self {
            key: key.to_string(),
            description: description.to_string(),
            first,
            last,
        }
    }

    pub fn contains(&self, function: u32) -> bool {
        (self.first..=self.last).contains(&function)
    }
}

/// Settings of the experimental protocol the data was produced with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestbedSettings {
    pub name: String,

    /// Bi-objective testbeds have no final precision and fewer instances.
    pub biobjective: bool,

    /// Restrict the expected instances to this subset. `None` = all.
    pub instances_of_interest: Option<Vec<u32>>,

    /// Expected number of trials per unit on single-objective testbeds.
    pub expected_instances: usize,

    /// Expected number of trials per unit on bi-objective testbeds.
    pub expected_instances_biobjective: usize,

    /// Instance-to-count patterns of past experimental campaigns. A unit
    /// whose instance counts equal one of them is consistent.
    pub allowed_instance_patterns: Vec<BTreeMap<u32, usize>>,

    /// Name of the reference algorithm data used by run-length based targets
    /// when no explicit reference is given.
    pub reference_algorithm: Option<String>,

    /// Final target used when a unit carries no precision.
    pub default_precision: f64,

    /// Additional simulated restarts drawn per target when no explicit
    /// sample size is requested.
    pub simulated_runlength_sample_size: usize,

    /// Seed of the explicitly randomized bootstrap path.
    pub bootstrap_seed: u64,

    pub function_groups: Vec<FunctionGroup>,
}

impl Default for TestbedSettings {
    fn default() -> Self {
        Self {
            name: "bbob".to_string(),
            biobjective: false,
            instances_of_interest: None,
            expected_instances: 15,
            expected_instances_biobjective: 10,
            allowed_instance_patterns: historical_instance_patterns(),
            reference_algorithm: Some("bbob-2009-best".to_string()),
            default_precision: 1e-8,
            simulated_runlength_sample_size: 10,
            bootstrap_seed: 0x5eed,
            function_groups: bbob_function_groups(),
        }
    }
}

impl TestbedSettings {
    /// Settings of the bi-objective testbed.
    pub fn biobjective() -> Self {
        Self {
            name: "bbob-biobj".to_string(),
            biobjective: true,
            reference_algorithm: Some("bbob-biobj-2016-best".to_string()),
            allowed_instance_patterns: Vec::new(),
            function_groups: Vec::new(),
            ..Self::default()
        }
    }

    pub fn with_instances_of_interest(mut self, instances: Vec<u32>) -> Self {
        self.instances_of_interest = Some(instances);
        self
    }

    pub fn with_reference_algorithm(mut self, name: impl Into<String>) -> Self {
        self.reference_algorithm = Some(name.into());
        self
    }

    pub fn with_bootstrap_seed(mut self, seed: u64) -> Self {
        self.bootstrap_seed = seed;
        self
    }

    pub fn with_simulated_runlength_sample_size(mut self, n: usize) -> Self {
        self.simulated_runlength_sample_size = n;
        self
    }

    /// Number of trials a consistent unit is expected to hold.
    pub fn expected_number_of_instances(&self) -> usize {
        match &self.instances_of_interest {
            Some(instances) if !instances.is_empty() => instances.len(),
            _ if self.biobjective => self.expected_instances_biobjective,
            _ => self.expected_instances,
        }
    }

    /// Whether trials on `instance` should be considered at all. Instance 0
    /// marks reference-algorithm data and is always kept.
    pub fn is_instance_of_interest(&self, instance: u32) -> bool {
        match &self.instances_of_interest {
            Some(instances) if !instances.is_empty() => {
                instance == 0 || instances.contains(&instance)
            }
            _ => true,
        }
    }

    pub fn function_group_of(&self, function: u32) -> Option<&FunctionGroup> {
        self.function_groups.iter().find(|g| g.contains(function))
    }

    /// Read settings from a JSON file. Missing keys take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> EkResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        tracing::debug!("Loaded testbed settings {} from {}", settings.name, path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> EkResult<()> {
        if self.expected_instances == 0 || self.expected_instances_biobjective == 0 {
            return Err(config_error!("expected instance counts must be positive"));
        }
        if !(self.default_precision > 0.0) {
            return Err(config_error!(
                "default_precision must be positive, got {}",
                self.default_precision
            ));
        }
        for group in &self.function_groups {
            if group.first > group.last {
                return Err(config_error!(
                    "function group {} has an empty range {}..={}",
                    group.key,
                    group.first,
                    group.last
                ));
            }
        }
        Ok(())
    }
}

fn historical_instance_patterns() -> Vec<BTreeMap<u32, usize>> {
    let ones = |ids: Vec<u32>| ids.into_iter().map(|i| (i, 1)).collect::<BTreeMap<_, _>>();
    let first_five_plus = |start: u32| ones((1..=5).chain(start..start + 10).collect());

    vec![
        (1..=5).map(|i| (i, 3)).collect(),
        ones((1..=15).collect()),
        first_five_plus(21),
        first_five_plus(31),
        first_five_plus(41),
        first_five_plus(51),
        first_five_plus(61),
        first_five_plus(71),
        first_five_plus(81),
    ]
}

fn bbob_function_groups() -> Vec<FunctionGroup> {
    vec![
        FunctionGroup::new("separ", "Separable functions", 1, 5),
        FunctionGroup::new("lcond", "Misc. moderate functions", 6, 9),
        FunctionGroup::new("hcond", "Ill-conditioned functions", 10, 14),
        FunctionGroup::new("multi", "Multi-modal functions", 15, 19),
        FunctionGroup::new("mult2", "Weak structure functions", 20, 24),
        FunctionGroup::new("nzmod", "Moderate noise", 101, 106),
        FunctionGroup::new("nzsev", "Severe noise", 107, 121),
        FunctionGroup::new("nzsmm", "Severe noise multimod.", 122, 130),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn expected_instances_follow_protocol() {
        let settings = TestbedSettings::default();
        assert_eq!(settings.expected_number_of_instances(), 15);

        let biobj = TestbedSettings::biobjective();
        assert_eq!(biobj.expected_number_of_instances(), 10);

        let subset = TestbedSettings::default().with_instances_of_interest(vec![1, 3]);
        assert_eq!(subset.expected_number_of_instances(), 2);
        assert!(subset.is_instance_of_interest(3));
        assert!(subset.is_instance_of_interest(0));
        assert!(!subset.is_instance_of_interest(2));
    }

    #[test]
    fn historical_patterns_include_2009_layout() {
        let settings = TestbedSettings::default();
        let pattern_2009: BTreeMap<u32, usize> = (1..=5).map(|i| (i, 3)).collect();
        assert!(settings.allowed_instance_patterns.contains(&pattern_2009));
    }

    #[test]
    fn function_groups_lookup() {
        let settings = TestbedSettings::default();
        assert_eq!(settings.function_group_of(3).unwrap().key, "separ");
        assert_eq!(settings.function_group_of(24).unwrap().key, "mult2");
        assert!(settings.function_group_of(50).is_none());
    }

    #[test]
    fn load_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "bbob-largescale", "expected_instances": 15, "bootstrap_seed": 7}}"#).unwrap();

        let settings = TestbedSettings::from_json_file(file.path()).unwrap();
        assert_eq!(settings.name, "bbob-largescale");
        assert_eq!(settings.bootstrap_seed, 7);
        assert_eq!(settings.default_precision, 1e-8);
    }

    #[test]
    fn invalid_settings_are_config_errors() {
        let mut settings = TestbedSettings::default();
        settings.default_precision = 0.0;
        assert!(matches!(settings.validate(), Err(crate::EkError::Config(_))));
    }
}
