//! In-memory experiment store.
//!
//! A sweep is a set of runs, one per (policy, reneging time, seed). Runs are loaded once into a
//! [`RunTable`] and never mutated; every analysis pass builds a fresh table through
//! [`RunTableBuilder`] (see [`RunTable::map_selections`]).

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// One named vector recorded by one simulated module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementVector {
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub time: Vec<f64>,
    #[serde(default)]
    pub value: Vec<f64>,
}

impl MeasurementVector {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// True when the vector carries `name` and, if a module is requested, was emitted by it.
    pub fn matches(&self, name: &str, module: Option<&str>) -> bool {
        self.name == name && module.is_none_or(|m| self.module.as_deref() == Some(m))
    }
}

/// All vectors exported by a single simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    #[serde(default)]
    pub vectors: Vec<MeasurementVector>,
}

impl RunRecord {
    /// First vector matching `name` (and `module`, when given).
    pub fn find(&self, name: &str, module: Option<&str>) -> Option<&MeasurementVector> {
        self.vectors.iter().find(|v| v.matches(name, module))
    }
}

/// Aligned (time, value) arrays owned by a derived structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    pub time: Vec<f64>,
    pub value: Vec<f64>,
}

impl Trace {
    pub fn new(time: Vec<f64>, value: Vec<f64>) -> Self {
        Self { time, value }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Experiment configuration without the replication seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SelectionKey {
    /// `None` for sweeps that do not vary the policy.
    pub policy: Option<u32>,
    pub deadline: u32,
}

impl SelectionKey {
    pub fn new(policy: Option<u32>, deadline: u32) -> Self {
        Self { policy, deadline }
    }

    pub fn with_seed(self, seed: u32) -> ExperimentKey {
        ExperimentKey {
            policy: self.policy,
            deadline: self.deadline,
            seed,
        }
    }

    /// Reneging rate `1 / deadline`; zero deadlines map to zero.
    pub fn reneging_rate(&self) -> f64 {
        if self.deadline == 0 {
            0.0
        } else {
            1.0 / self.deadline as f64
        }
    }

    /// Filesystem-safe name, e.g. `policy1_renegingTime40`.
    pub fn file_stem(&self) -> String {
        match self.policy {
            Some(p) => format!("policy{}_renegingTime{}", p, self.deadline),
            None => format!("renegingTime{}", self.deadline),
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "renegingTime={}", self.deadline)?;
        if let Some(policy) = self.policy {
            write!(f, ", policy={}", policy)?;
        }
        Ok(())
    }
}

/// Full identity of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ExperimentKey {
    pub policy: Option<u32>,
    pub deadline: u32,
    pub seed: u32,
}

impl ExperimentKey {
    pub fn selection(&self) -> SelectionKey {
        SelectionKey::new(self.policy, self.deadline)
    }
}

impl fmt::Display for ExperimentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seed={}", self.seed)?;
        if let Some(policy) = self.policy {
            write!(f, ",policy={}", policy)?;
        }
        write!(f, ",renegingTime={}", self.deadline)
    }
}

/// Distinct values seen along each experiment dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySpace {
    pub policies: BTreeSet<u32>,
    pub deadlines: BTreeSet<u32>,
    pub seeds: BTreeSet<u32>,
}

/// Immutable table of per-run values keyed by [`ExperimentKey`].
#[derive(Debug, Clone)]
pub struct RunTable<T> {
    entries: BTreeMap<ExperimentKey, T>,
}

impl<T> RunTable<T> {
    pub fn builder() -> RunTableBuilder<T> {
        RunTableBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ExperimentKey) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExperimentKey, &T)> {
        self.entries.iter()
    }

    pub fn key_space(&self) -> KeySpace {
        let mut space = KeySpace::default();
        for key in self.entries.keys() {
            if let Some(policy) = key.policy {
                space.policies.insert(policy);
            }
            space.deadlines.insert(key.deadline);
            space.seeds.insert(key.seed);
        }
        space
    }

    /// Every (policy, deadline) combination that has at least one run, ascending.
    pub fn selections(&self) -> Vec<SelectionKey> {
        let set: BTreeSet<SelectionKey> = self.entries.keys().map(|k| k.selection()).collect();
        set.into_iter().collect()
    }

    /// Runs of one configuration as `(seed, value)` in ascending seed order.
    ///
    /// A selection with no runs at all is a configuration error, not missing data.
    pub fn select(&self, selection: &SelectionKey) -> Result<Vec<(u32, &T)>> {
        let lo = selection.with_seed(u32::MIN);
        let hi = selection.with_seed(u32::MAX);
        let runs: Vec<(u32, &T)> = self
            .entries
            .range(lo..=hi)
            .map(|(key, value)| (key.seed, value))
            .collect();

        if runs.is_empty() {
            return Err(AnalysisError::MissingSelection(*selection));
        }
        Ok(runs)
    }

    /// Builds a new table by deriving each configuration's runs from this one.
    pub fn map_selections<U, F>(&self, mut derive: F) -> Result<RunTable<U>>
    where
        F: FnMut(&SelectionKey) -> Result<Vec<(u32, U)>>,
    {
        let mut builder = RunTable::builder();
        for selection in self.selections() {
            for (seed, value) in derive(&selection)? {
                builder.insert(selection.with_seed(seed), value)?;
            }
        }
        Ok(builder.build())
    }
}

/// Accumulates entries for a new [`RunTable`]; duplicates are rejected.
#[derive(Debug)]
pub struct RunTableBuilder<T> {
    entries: BTreeMap<ExperimentKey, T>,
}

impl<T> Default for RunTableBuilder<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> RunTableBuilder<T> {
    pub fn contains(&self, key: &ExperimentKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: ExperimentKey, value: T) -> Result<()> {
        if self.entries.contains_key(&key) {
            return Err(AnalysisError::DuplicateKey(key));
        }
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn build(self) -> RunTable<T> {
        RunTable {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RunTable<u32> {
        let mut builder = RunTable::builder();
        for (policy, deadline, seed) in [(1, 40, 2), (1, 40, 1), (2, 40, 1), (1, 8, 3)] {
            let key = ExperimentKey {
                policy: Some(policy),
                deadline,
                seed,
            };
            builder.insert(key, seed * 10).unwrap();
        }
        builder.build()
    }

    #[test]
    fn select_returns_seeds_in_order() {
        let t = table();
        let runs = t.select(&SelectionKey::new(Some(1), 40)).unwrap();
        let seeds: Vec<u32> = runs.iter().map(|(s, _)| *s).collect();
        assert_eq!(seeds, vec![1, 2]);
        assert_eq!(*runs[1].1, 20);
    }

    #[test]
    fn missing_selection_is_an_error() {
        let t = table();
        let err = t.select(&SelectionKey::new(Some(2), 8)).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingSelection(_)));
    }

    #[test]
    fn partial_coverage_only_lists_present_selections() {
        let t = table();
        let sels = t.selections();
        assert_eq!(
            sels,
            vec![
                SelectionKey::new(Some(1), 8),
                SelectionKey::new(Some(1), 40),
                SelectionKey::new(Some(2), 40),
            ]
        );
        let space = t.key_space();
        assert_eq!(space.policies.len(), 2);
        assert_eq!(space.deadlines.len(), 2);
        assert_eq!(space.seeds.len(), 3);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut builder = RunTable::builder();
        let key = ExperimentKey {
            policy: None,
            deadline: 10,
            seed: 0,
        };
        builder.insert(key, 1).unwrap();
        let err = builder.insert(key, 2).unwrap_err();
        assert!(matches!(err, AnalysisError::DuplicateKey(k) if k == key));
        assert_eq!(err.to_string(), "run seed=0,renegingTime=10 inserted twice");
    }

    #[test]
    fn map_selections_builds_a_new_table() {
        let t = table();
        let doubled = t
            .map_selections(|sel| {
                Ok(t.select(sel)?
                    .into_iter()
                    .map(|(seed, v)| (seed, v * 2))
                    .collect())
            })
            .unwrap();
        assert_eq!(doubled.len(), t.len());
        let key = ExperimentKey {
            policy: Some(1),
            deadline: 40,
            seed: 2,
        };
        assert_eq!(doubled.get(&key), Some(&40));
        assert_eq!(t.get(&key), Some(&20));
    }

    #[test]
    fn display_formats() {
        let key = ExperimentKey {
            policy: Some(2),
            deadline: 40,
            seed: 7,
        };
        assert_eq!(key.to_string(), "seed=7,policy=2,renegingTime=40");
        assert_eq!(key.selection().to_string(), "renegingTime=40, policy=2");
        assert_eq!(SelectionKey::new(None, 5).to_string(), "renegingTime=5");
        assert_eq!(key.selection().file_stem(), "policy2_renegingTime40");
        assert_eq!(SelectionKey::new(None, 5).file_stem(), "renegingTime5");
    }
}
