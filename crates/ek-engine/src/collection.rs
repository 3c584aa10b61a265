//! Deduplicating collection of problem units across algorithms.

use std::collections::{BTreeMap, BTreeSet};

use ek_types::{EkResult, ProblemId, TestbedSettings};

use crate::unit::ProblemUnit;

/// Ordered collection of [`ProblemUnit`]s in which no two units share a
/// header; pushing a duplicate merges its trials into the present unit.
#[derive(Debug, Clone, Default)]
pub struct AlgorithmCollection {
    units: Vec<ProblemUnit>,
}

impl AlgorithmCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `unit`, or merge it into an identical unit already present.
    /// Returns true when a merge happened.
    pub fn push(&mut self, unit: ProblemUnit) -> EkResult<bool> {
        match self.units.iter_mut().find(|u| u.header() == unit.header()) {
            Some(existing) => {
                existing.merge(unit)?;
                Ok(true)
            }
            None => {
                self.units.push(unit);
                Ok(false)
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = ProblemUnit>>(&mut self, units: I) -> EkResult<()> {
        for unit in units {
            self.push(unit)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProblemUnit> {
        self.units.iter()
    }

    pub fn units(&self) -> &[ProblemUnit] {
        &self.units
    }

    pub fn is_biobjective(&self) -> bool {
        self.units.iter().any(ProblemUnit::is_biobjective)
    }

    pub fn dimensions(&self) -> BTreeSet<u32> {
        self.units.iter().map(ProblemUnit::dimension).collect()
    }

    pub fn functions(&self) -> BTreeSet<u32> {
        self.units.iter().map(ProblemUnit::function_id).collect()
    }

    /// Algorithm ids in order of first appearance.
    pub fn algorithms(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.units
            .iter()
            .filter(|u| seen.insert(u.algorithm_id().to_string()))
            .map(|u| u.algorithm_id().to_string())
            .collect()
    }

    /// Units matching `problem`, in collection order.
    pub fn units_for(&self, problem: ProblemId) -> impl Iterator<Item = &ProblemUnit> + '_ {
        self.units.iter().filter(move |u| u.problem_id() == problem)
    }

    pub fn by_dimension(&self) -> BTreeMap<u32, Vec<&ProblemUnit>> {
        group(&self.units, ProblemUnit::dimension)
    }

    pub fn by_algorithm(&self) -> BTreeMap<String, Vec<&ProblemUnit>> {
        group(&self.units, |u| u.algorithm_id().to_string())
    }

    pub fn by_function(&self) -> BTreeMap<u32, Vec<&ProblemUnit>> {
        group(&self.units, ProblemUnit::function_id)
    }

    pub fn by_problem(&self) -> BTreeMap<ProblemId, Vec<&ProblemUnit>> {
        group(&self.units, ProblemUnit::problem_id)
    }

    /// Units keyed by the function group of the testbed; units outside every
    /// group are left out.
    pub fn by_function_group(&self, settings: &TestbedSettings) -> BTreeMap<String, Vec<&ProblemUnit>> {
        let mut groups: BTreeMap<String, Vec<&ProblemUnit>> = BTreeMap::new();
        for unit in &self.units {
            match settings.function_group_of(unit.function_id()) {
                Some(group) => groups.entry(group.key.clone()).or_default().push(unit),
                None => tracing::debug!("f{} is in no function group of {}", unit.function_id(), settings.name),
            }
        }
        groups
    }

    /// Sort by dimension, then function id. Stable for equal keys.
    pub fn sort_by_problem(&mut self) {
        self.units.sort_by_key(|u| (u.dimension(), u.function_id()));
    }

    /// Rename algorithms whose id is in `taken` to `"<id> 2"`, `"<id> 3"`, ...
    pub fn set_unique_algorithm_ids(&mut self, taken: &BTreeSet<String>) {
        for unit in &mut self.units {
            let id = unit.algorithm_id().to_string();
            if !taken.contains(&id) {
                continue;
            }
            let mut i = 2;
            while taken.contains(&format!("{id} {i}")) {
                i += 1;
            }
            let renamed = format!("{id} {i}");
            tracing::info!("Renaming algorithm {} to {}", id, renamed);
            unit.header_mut().algorithm_id = renamed;
        }
    }
}

impl<'a> IntoIterator for &'a AlgorithmCollection {
    type Item = &'a ProblemUnit;
    type IntoIter = std::slice::Iter<'a, ProblemUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

impl IntoIterator for AlgorithmCollection {
    type Item = ProblemUnit;
    type IntoIter = std::vec::IntoIter<ProblemUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.into_iter()
    }
}

fn group<K: Ord, F: Fn(&ProblemUnit) -> K>(units: &[ProblemUnit], key: F) -> BTreeMap<K, Vec<&ProblemUnit>> {
    let mut map: BTreeMap<K, Vec<&ProblemUnit>> = BTreeMap::new();
    for unit in units {
        map.entry(key(unit)).or_default().push(unit);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use ek_types::UnitHeader;

    fn unit(alg: &str, function: u32, dim: u32, instances: Vec<u32>) -> ProblemUnit {
        let n = instances.len();
        ProblemUnit::new(
            UnitHeader::new(alg, function, dim),
            vec![std::iter::once(1.0).chain((1..=n).map(|i| i as f64)).collect()],
            vec![100.0; n],
            instances,
        )
        .unwrap()
    }

    #[test]
    fn duplicates_merge_instead_of_insert() {
        let mut collection = AlgorithmCollection::new();
        assert!(!collection.push(unit("A", 1, 2, vec![1, 2])).unwrap());
        assert!(!collection.push(unit("A", 1, 3, vec![1, 2])).unwrap());
        assert!(collection.push(unit("A", 1, 2, vec![3])).unwrap());

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.units()[0].nb_runs(), 3);
    }

    #[test]
    fn grouping_and_sorting() {
        let mut collection = AlgorithmCollection::new();
        collection
            .extend(vec![
                unit("B", 7, 10, vec![1]),
                unit("A", 2, 5, vec![1]),
                unit("A", 1, 10, vec![1]),
                unit("B", 15, 5, vec![1]),
            ])
            .unwrap();

        assert_eq!(collection.algorithms(), vec!["B".to_string(), "A".to_string()]);
        assert_eq!(collection.by_dimension()[&10].len(), 2);
        assert_eq!(collection.by_algorithm()["A"].len(), 2);
        assert_eq!(collection.by_problem()[&ProblemId::new(7, 10)].len(), 1);

        let groups = collection.by_function_group(&TestbedSettings::default());
        assert_eq!(groups["separ"].len(), 2);
        assert_eq!(groups["lcond"].len(), 1);
        assert_eq!(groups["multi"].len(), 1);

        collection.sort_by_problem();
        let order: Vec<(u32, u32)> = collection.iter().map(|u| (u.dimension(), u.function_id())).collect();
        assert_eq!(order, vec![(5, 2), (5, 15), (10, 1), (10, 7)]);
    }

    #[test]
    fn clashing_ids_are_renamed() {
        let mut collection = AlgorithmCollection::new();
        collection.push(unit("BFGS", 1, 2, vec![1])).unwrap();
        collection.push(unit("NEWUOA", 1, 2, vec![1])).unwrap();

        let taken = BTreeSet::from(["BFGS".to_string(), "BFGS 2".to_string()]);
        collection.set_unique_algorithm_ids(&taken);
        assert_eq!(collection.algorithms(), vec!["BFGS 3".to_string(), "NEWUOA".to_string()]);
    }
}
