//! CSV export of metric tables.
//!
//! Two kinds of output under `<outputDir>/csv`:
//! - `<METRIC>[_w<weight>]_<policy>.csv`: one confidence-interval row per deadline.
//! - `metrics_summary.csv`: MRT and MEC for every configuration.

use std::{
    collections::BTreeMap,
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::Serialize;

use crate::{
    data::store::SelectionKey,
    error::{AnalysisError, Result},
    metrics::{
        MetricPoint, by_policy,
        confidence::{CONFIDENCE_LEVEL, confidence_interval},
    },
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceRow {
    #[serde(rename = "Deadline [s]")]
    pub deadline_s: u32,
    #[serde(rename = "Deadline [min]")]
    pub deadline_min: f64,
    #[serde(rename = "Reneging Rate r")]
    pub reneging_rate: f64,
    #[serde(rename = "Mean")]
    pub mean: f64,
    #[serde(rename = "Variance")]
    pub variance: f64,
    #[serde(rename = "Left Value")]
    pub left: f64,
    #[serde(rename = "Right Value")]
    pub right: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub policy: Option<u32>,
    pub deadline: u32,
    pub reneging_rate: f64,
    pub mrt: Option<f64>,
    pub mec: Option<f64>,
}

/// Creates `<output>/plots` and `<output>/csv`.
pub fn create_output_dirs(output: &Path) -> Result<(PathBuf, PathBuf)> {
    let plots = output.join("plots");
    let csv = output.join("csv");
    for dir in [&plots, &csv] {
        create_dir_all(dir).map_err(|e| AnalysisError::io(dir, e))?;
    }
    Ok((plots, csv))
}

/// File stem for one metric table, e.g. `ERWP_w0.5_policy2`.
pub fn table_name(metric: &str, weight: Option<f64>, policy: Option<u32>) -> String {
    let mut name = metric.to_string();
    if let Some(w) = weight {
        name.push_str(&format!("_w{}", w));
    }
    match policy {
        Some(p) => name.push_str(&format!("_policy{}", p)),
        None => name.push_str("_all"),
    }
    name
}

/// One row per point that has at least two per-seed samples.
pub fn confidence_rows(points: &[&MetricPoint]) -> Vec<ConfidenceRow> {
    let mut rows = Vec::with_capacity(points.len());
    for point in points {
        let Some(ci) = confidence_interval(&point.sample_values(), CONFIDENCE_LEVEL) else {
            debug!("{}: fewer than two seeds, no confidence interval", point.selection);
            continue;
        };
        let deadline = point.selection.deadline;
        rows.push(ConfidenceRow {
            deadline_s: deadline,
            deadline_min: deadline as f64 / 60.0,
            reneging_rate: point.selection.reneging_rate(),
            mean: ci.mean,
            variance: ci.variance,
            left: ci.left,
            right: ci.right,
        });
    }
    rows
}

/// One confidence table per policy under `csv_dir`.
pub fn write_metric_tables(csv_dir: &Path, metric: &str, weight: Option<f64>, points: &[MetricPoint]) -> Result<()> {
    for (policy, group) in by_policy(points) {
        let path = csv_dir.join(format!("{}.csv", table_name(metric, weight, policy)));
        write_rows(&path, &confidence_rows(&group))?;
    }
    Ok(())
}

/// MRT and MEC side by side; a configuration missing one metric leaves that cell empty.
pub fn summary_rows(response: &[MetricPoint], energy: &[MetricPoint]) -> Vec<SummaryRow> {
    let mut merged: BTreeMap<SelectionKey, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for p in response {
        merged.entry(p.selection).or_default().0 = Some(p.value);
    }
    for p in energy {
        merged.entry(p.selection).or_default().1 = Some(p.value);
    }
    merged
        .into_iter()
        .map(|(sel, (mrt, mec))| SummaryRow {
            policy: sel.policy,
            deadline: sel.deadline,
            reneging_rate: sel.reneging_rate(),
            mrt,
            mec,
        })
        .collect()
}

/// Writes `rows` with a header derived from the row type; nothing is written for no rows.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if rows.is_empty() {
        debug!("No rows for {}, skipped", path.display());
        return Ok(());
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| AnalysisError::io(path, e))?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
