//! Job-trace extraction pass.
//!
//! Rebuilds, for every run, the per-queue job traces (WiFi vs cellular service times), the
//! radio active-time vectors and the deadline distribution, and returns them as a new
//! [`RunTable`]. Later passes (energy, warm-up study) read only this table.

use log::{info, warn};

use crate::{
    analysis::{
        filter::filter,
        quantize::{WindowedSeries, quantize},
        splitter::{JobSample, QueuePath, split_jobs_by_queue, unzip_jobs},
    },
    data::{
        store::{RunRecord, RunTable, SelectionKey, Trace},
        vectors,
    },
    error::Result,
};

/// Jobs served on one path plus that path's active-time vector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathTrace {
    pub jobs: Vec<JobSample>,
    pub active: Trace,
}

impl PathTrace {
    pub fn service_total(&self) -> f64 {
        self.jobs.iter().map(|j| j.service_time).sum()
    }

    pub fn active_total(&self) -> f64 {
        self.active.value.iter().sum()
    }
}

/// Derived per-run record of the offloading network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathRecord {
    /// Absent when the run did not export `deadlineDistrib:vector`.
    pub deadline: Option<Trace>,
    pub wifi: PathTrace,
    pub cellular: PathTrace,
}

impl PathRecord {
    pub fn path(&self, path: QueuePath) -> &PathTrace {
        match path {
            QueuePath::Wifi => &self.wifi,
            QueuePath::Cellular => &self.cellular,
        }
    }
}

/// Splits every run's job trace by queue; seeds missing a required vector are skipped.
pub fn extract_paths(table: &RunTable<RunRecord>) -> Result<RunTable<PathRecord>> {
    info!("Extracting WiFi and cellular job traces...");
    let paths = table.map_selections(|selection| extract_selection(table, selection))?;
    info!("Extracted job traces for {} runs", paths.len());
    Ok(paths)
}

fn extract_selection(table: &RunTable<RunRecord>, selection: &SelectionKey) -> Result<Vec<(u32, PathRecord)>> {
    let service = filter(table, vectors::TOTAL_SERVICE_TIME, selection, None)?;
    let queues = filter(table, vectors::QUEUES_VISITED, selection, None)?;
    let wifi_active = filter(table, vectors::WIFI_ACTIVE_TIME, selection, None)?;
    let cell_active = filter(table, vectors::CELL_ACTIVE_TIME, selection, None)?;

    let mut out = Vec::with_capacity(service.len());
    for run in &service.runs {
        let (Some(q), Some(wa), Some(ca)) = (
            queues.get(run.seed),
            wifi_active.get(run.seed),
            cell_active.get(run.seed),
        ) else {
            warn!("Skipped seed {} for {}: incomplete job trace", run.seed, selection);
            continue;
        };

        let split = split_jobs_by_queue([run.time.as_slice(), q.time.as_slice()], &run.value, &q.value)?;
        let record = PathRecord {
            deadline: table.get(&selection.with_seed(run.seed)).and_then(deadline_trace),
            wifi: PathTrace {
                jobs: split.wifi,
                active: Trace::new(wa.time.clone(), wa.value.clone()),
            },
            cellular: PathTrace {
                jobs: split.cellular,
                active: Trace::new(ca.time.clone(), ca.value.clone()),
            },
        };
        out.push((run.seed, record));
    }
    Ok(out)
}

/// The run's deadline distribution; many exports omit it, so absence is silent.
fn deadline_trace(record: &RunRecord) -> Option<Trace> {
    record
        .find(vectors::DEADLINE_DISTRIB, None)
        .map(|d| Trace::new(d.time.clone(), d.value.clone()))
}

/// Windowed cross-seed average of the service times served on `path`.
pub fn aggregate_service_times(
    paths: &RunTable<PathRecord>,
    selection: &SelectionKey,
    path: QueuePath,
    width: f64,
) -> Result<WindowedSeries> {
    let records: Vec<&PathRecord> = paths.select(selection)?.into_iter().map(|(_, r)| r).collect();
    aggregate_records(&records, path, width)
}

/// Same as [`aggregate_service_times`] over an explicit set of runs.
pub fn aggregate_records(records: &[&PathRecord], path: QueuePath, width: f64) -> Result<WindowedSeries> {
    let (times, services): (Vec<Vec<f64>>, Vec<Vec<f64>>) = records
        .iter()
        .map(|record| unzip_jobs(&record.path(path).jobs))
        .unzip();
    quantize(&times, &services, width)
}
