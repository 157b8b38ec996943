//! Run discovery and JSON loading.
//!
//! Input directories hold one JSON export per run. A file is selected when its name contains the
//! configuration tag (e.g. `BatchExecution`) and ends in `.json`; its experiment key is parsed
//! from the path (`seed=<n>,policy=<1|2>,renegingTime=<n>` or `seed=<n>,renegingTime=<n>`).
//! The body must hold exactly one top-level key whose value is the run record.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::{
    data::store::{ExperimentKey, RunRecord, RunTable},
    error::{AnalysisError, Result},
};

/// Which experiment dimensions a sweep encodes in its file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum KeyLayout {
    /// `seed=<n>,policy=<1|2>,renegingTime=<n>`
    #[default]
    PolicyDeadlineSeed,
    /// `seed=<n>,renegingTime=<n>`
    DeadlineSeed,
}

impl KeyLayout {
    fn pattern(self) -> &'static str {
        match self {
            KeyLayout::PolicyDeadlineSeed => r"seed=([0-9]+),policy=([12]),renegingTime=([0-9]+)",
            KeyLayout::DeadlineSeed => r"seed=([0-9]+),renegingTime=([0-9]+)",
        }
    }

    fn regex(self) -> Result<Regex> {
        Regex::new(self.pattern()).map_err(|e| AnalysisError::Config(e.to_string()))
    }
}

/// Extracts the experiment key from a run file path, `None` if the path does not carry one.
pub fn parse_key(path: &Path, layout: KeyLayout) -> Option<ExperimentKey> {
    parse_key_with(&layout.regex().ok()?, path, layout)
}

fn parse_key_with(re: &Regex, path: &Path, layout: KeyLayout) -> Option<ExperimentKey> {
    let text = path.to_string_lossy();
    let caps = re.captures(&text)?;
    let field = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();

    match layout {
        KeyLayout::PolicyDeadlineSeed => Some(ExperimentKey {
            seed: field(1)?,
            policy: Some(field(2)?),
            deadline: field(3)?,
        }),
        KeyLayout::DeadlineSeed => Some(ExperimentKey {
            seed: field(1)?,
            policy: None,
            deadline: field(2)?,
        }),
    }
}

/// Lists every `.json` file under `input_dir` whose name contains `tag`, sorted by path.
pub fn discover(input_dir: &Path, tag: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(input_dir) {
        let entry = entry.map_err(|e| AnalysisError::io(input_dir, e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.contains(tag) && name.ends_with(".json") {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Parses one run export; `path` is only used for error messages.
pub fn parse_run(path: &Path, bytes: &[u8]) -> Result<RunRecord> {
    let body: BTreeMap<String, RunRecord> =
        serde_json::from_slice(bytes).map_err(|source| AnalysisError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let found = body.len();
    let mut records = body.into_values();
    let (Some(record), None) = (records.next(), records.next()) else {
        return Err(AnalysisError::MalformedRun {
            path: path.to_path_buf(),
            found,
        });
    };

    for vector in &record.vectors {
        if vector.time.len() != vector.value.len() {
            return Err(AnalysisError::MalformedVector {
                path: path.to_path_buf(),
                name: vector.name.clone(),
                times: vector.time.len(),
                values: vector.value.len(),
            });
        }
    }
    Ok(record)
}

/// Loads every matching run below `input_dir` into an immutable table.
pub fn load_runs(input_dir: &Path, tag: &str, layout: KeyLayout) -> Result<RunTable<RunRecord>> {
    info!("Loading {} runs from {}", tag, input_dir.display());

    let re = layout.regex()?;
    let mut builder = RunTable::builder();
    for path in discover(input_dir, tag)? {
        let Some(key) = parse_key_with(&re, &path, layout) else {
            debug!("No experiment key in {}, skipping", path.display());
            continue;
        };
        if builder.contains(&key) {
            return Err(AnalysisError::DuplicateRun { key, path });
        }

        let bytes = fs::read(&path).map_err(|e| AnalysisError::io(&path, e))?;
        let record = parse_run(&path, &bytes)?;
        debug!("Loaded {} ({} vectors)", key, record.vectors.len());
        builder.insert(key, record)?;
    }

    let table = builder.build();
    let space = table.key_space();
    info!(
        "Loaded {} runs: {} policies, {} reneging times, {} seeds",
        table.len(),
        space.policies.len(),
        space.deadlines.len(),
        space.seeds.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policy_layout_from_path() {
        let path = Path::new("/data/results/BatchExecution-seed=12,policy=2,renegingTime=40-#0.json");
        let key = parse_key(path, KeyLayout::PolicyDeadlineSeed).unwrap();
        assert_eq!(key.seed, 12);
        assert_eq!(key.policy, Some(2));
        assert_eq!(key.deadline, 40);
    }

    #[test]
    fn parses_deadline_layout_from_path() {
        let path = Path::new("SetupAnalysis-seed=3,renegingTime=8.json");
        let key = parse_key(path, KeyLayout::DeadlineSeed).unwrap();
        assert_eq!(key, ExperimentKey { policy: None, deadline: 8, seed: 3 });
        assert!(parse_key(path, KeyLayout::PolicyDeadlineSeed).is_none());
    }

    #[test]
    fn rejects_policy_outside_known_values() {
        let path = Path::new("x-seed=1,policy=5,renegingTime=8.json");
        assert!(parse_key(path, KeyLayout::PolicyDeadlineSeed).is_none());
    }

    #[test]
    fn parse_run_unwraps_single_top_level_key() {
        let body = br#"{"BatchExecution-0-20200101": {"vectors": [
            {"name": "queueLength:vector", "module": "QueueNetwork.wifiQueue",
             "attributes": {"unit": "s"}, "time": [0.0, 1.5], "value": [0, 1]}
        ]}}"#;
        let run = parse_run(Path::new("a.json"), body).unwrap();
        let v = run.find("queueLength:vector", Some("QueueNetwork.wifiQueue")).unwrap();
        assert_eq!(v.time, vec![0.0, 1.5]);
        assert_eq!(v.value, vec![0.0, 1.0]);
    }

    #[test]
    fn parse_run_rejects_multiple_top_level_keys() {
        let body = br#"{"a": {"vectors": []}, "b": {"vectors": []}}"#;
        let err = parse_run(Path::new("a.json"), body).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedRun { found: 2, .. }));
    }

    #[test]
    fn parse_run_rejects_misaligned_vector() {
        let body = br#"{"a": {"vectors": [{"name": "x", "time": [0, 1], "value": [1]}]}}"#;
        let err = parse_run(Path::new("a.json"), body).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedVector { times: 2, values: 1, .. }));
    }
}
