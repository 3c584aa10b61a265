//! Reference algorithm data used to derive run-length based targets.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use ek_engine::{AlgorithmCollection, ProblemUnit};
use ek_types::{EkResult, ProblemId};

/// One reference unit per problem.
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    units: BTreeMap<ProblemId, ProblemUnit>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `unit`, replacing an earlier unit of the same problem.
    pub fn insert(&mut self, unit: ProblemUnit) {
        let problem = unit.problem_id();
        if let Some(previous) = self.units.insert(problem, unit) {
            tracing::debug!("Reference data for {} from {} replaced", problem, previous.algorithm_id());
        }
    }

    pub fn get(&self, problem: ProblemId) -> Option<&ProblemUnit> {
        self.units.get(&problem)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn problems(&self) -> impl Iterator<Item = &ProblemId> + '_ {
        self.units.keys()
    }

    /// Algorithm id of the reference data, taken from its first problem.
    pub fn algorithm(&self) -> Option<&str> {
        self.units.values().next().map(ProblemUnit::algorithm_id)
    }
}

impl FromIterator<ProblemUnit> for ReferenceMap {
    fn from_iter<I: IntoIterator<Item = ProblemUnit>>(units: I) -> Self {
        let mut map = Self::new();
        for unit in units {
            map.insert(unit);
        }
        map
    }
}

impl From<AlgorithmCollection> for ReferenceMap {
    fn from(collection: AlgorithmCollection) -> Self {
        collection.into_iter().collect()
    }
}

/// Where reference data comes from.
#[derive(Debug, Clone)]
pub enum ReferenceSource {
    /// The reference algorithm named by the testbed settings.
    Testbed,
    /// A reference data set known by name to the loader.
    Named(String),
    /// Folders of algorithm data.
    Folders(Vec<PathBuf>),
    /// Already loaded data.
    Map(Arc<ReferenceMap>),
}

impl From<ReferenceMap> for ReferenceSource {
    fn from(map: ReferenceMap) -> Self {
        Self::Map(Arc::new(map))
    }
}

/// Loads reference data for [`ReferenceSource::Testbed`],
/// [`ReferenceSource::Named`] and [`ReferenceSource::Folders`].
pub trait ReferenceLoader: Send + Sync {
    fn load_named(&self, name: &str) -> EkResult<ReferenceMap>;

    fn load_folders(&self, folders: &[PathBuf]) -> EkResult<ReferenceMap>;
}
