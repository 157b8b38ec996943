//! Per-seed selection of one measurement vector.

use log::warn;

use crate::{
    data::store::{RunRecord, RunTable, SelectionKey},
    error::Result,
};

/// One seed's copy of the selected vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedSeries {
    pub seed: u32,
    pub label: String,
    pub time: Vec<f64>,
    pub value: Vec<f64>,
}

/// The selected vector across every seed that recorded it, in ascending seed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSeries {
    pub runs: Vec<SeedSeries>,
}

impl FilteredSeries {
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn get(&self, seed: u32) -> Option<&SeedSeries> {
        self.runs.iter().find(|r| r.seed == seed)
    }

    pub fn seeds(&self) -> impl Iterator<Item = u32> + '_ {
        self.runs.iter().map(|r| r.seed)
    }

    pub fn times(&self) -> Vec<&[f64]> {
        self.runs.iter().map(|r| r.time.as_slice()).collect()
    }

    pub fn values(&self) -> Vec<&[f64]> {
        self.runs.iter().map(|r| r.value.as_slice()).collect()
    }
}

/// Drops the network prefix from a module path (`QueueNetwork.wifiQueue` -> `wifiQueue`).
pub fn short_module(module: &str) -> &str {
    module.split_once('.').map_or(module, |(_, rest)| rest)
}

/// Collects `measurement` (optionally from `module` only) for every seed of `selection`.
///
/// A seed without the vector is skipped with a warning; an unknown selection is an error.
pub fn filter(
    table: &RunTable<RunRecord>,
    measurement: &str,
    selection: &SelectionKey,
    module: Option<&str>,
) -> Result<FilteredSeries> {
    let mut out = FilteredSeries::default();

    for (seed, run) in table.select(selection)? {
        let Some(vector) = run.find(measurement, module) else {
            warn!(
                "Skipped seed {} for {}: no {}{}",
                seed,
                selection,
                measurement,
                module.map(|m| format!(" from {}", m)).unwrap_or_default()
            );
            continue;
        };

        let mut label = format!("{}, seed={}", selection, seed);
        if let Some(m) = module {
            label.push_str(", ");
            label.push_str(short_module(m));
        }

        out.runs.push(SeedSeries {
            seed,
            label,
            time: vector.time.clone(),
            value: vector.value.clone(),
        });
    }

    Ok(out)
}
