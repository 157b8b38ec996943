//! Chart assembly for both reports.
//!
//! Builders turn analysis results into a [`Chart`] (file stem, axes, curves) without touching
//! the filesystem. [`Chart::save`] renders one under the plots directory.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::{
    analysis::{
        extract::{PathRecord, aggregate_service_times},
        filter::{filter, short_module},
        quantize::quantize,
        running::{running_average, running_time_average},
        splitter::QueuePath,
    },
    config::{EnergyConfig, ErwpConfig, PathsConfig, PlotConfig, ResponseConfig, WarmupConfig},
    data::{
        store::{RunRecord, RunTable, SelectionKey},
        vectors,
    },
    error::Result,
    metrics::{
        MetricPoint, by_policy,
        erwp::{ErwpPoint, by_weight},
        policy_label,
        trend::trend_line,
    },
    utils::plots::{Curve, PlotSpec, PlotStyle, render},
};

const MODEL_TITLE: &str = "Full Offloading Model";

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// File name without extension.
    pub stem: String,
    pub spec: PlotSpec,
    pub curves: Vec<Curve>,
}

impl Chart {
    pub fn new(stem: impl Into<String>, spec: PlotSpec, curves: Vec<Curve>) -> Self {
        Self {
            stem: stem.into(),
            spec,
            curves,
        }
    }

    pub fn save(&self, plots_dir: &Path, plot: &PlotConfig) -> Result<PathBuf> {
        let size = (plot.width, plot.height);
        let file = render(&plots_dir.join(&self.stem), plot.format, size, &self.spec, &self.curves)?;
        info!("Saved {}", file.display());
        Ok(file)
    }
}

pub fn deadline_minutes(selection: &SelectionKey) -> f64 {
    selection.deadline as f64 / 60.0
}

/// Measured points plus polynomial trend, one colour per policy starting at `group_base`.
///
/// A policy with fewer than two configurations gets its points but no trend line.
pub fn trend_curves(
    points: &[MetricPoint],
    x_of: impl Fn(&SelectionKey) -> f64,
    degree: usize,
    label_suffix: &str,
    group_base: usize,
) -> Result<Vec<Curve>> {
    let mut curves = Vec::new();
    for (i, (policy, group)) in by_policy(points).into_iter().enumerate() {
        let mut xy: Vec<(f64, f64)> = group.iter().map(|p| (x_of(&p.selection), p.value)).collect();
        xy.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (xs, ys): (Vec<f64>, Vec<f64>) = xy.into_iter().unzip();

        let label = format!("{}{}", policy_label(policy), label_suffix);
        let group = group_base + i;
        if xs.len() >= 2 {
            let fitted = trend_line(&xs, &ys, degree)?;
            curves.push(Curve::new(group, PlotStyle::Line, xs.clone(), fitted).labelled(format!("{}, trend", label)));
        } else {
            warn!("{}: not enough configurations for a trend line", label);
        }
        curves.push(Curve::new(group, PlotStyle::Scatter, xs, ys).labelled(label));
    }
    Ok(curves)
}

pub fn response_chart(points: &[MetricPoint], config: &ResponseConfig) -> Result<Chart> {
    let curves = trend_curves(points, deadline_minutes, config.trend_degree, "", 0)?;
    let spec = PlotSpec::new(MODEL_TITLE, "Deadline [min]", "Mean Response Time [min]").with_y_range(config.y_range);
    Ok(Chart::new("FullOffloading_Response_Deadline", spec, curves))
}

pub fn energy_chart(points: &[MetricPoint], config: &EnergyConfig) -> Result<Chart> {
    let curves = trend_curves(points, deadline_minutes, config.trend_degree, "", 0)?;
    let spec = PlotSpec::new(MODEL_TITLE, "Deadline [min]", "Mean Energy Consumption [J]");
    Ok(Chart::new("FullOffloading_Energy_Deadline", spec, curves))
}

/// ERWP against reneging rate; every (weight, policy) pair gets its own colour.
pub fn erwp_chart(points: &[ErwpPoint], config: &ErwpConfig) -> Result<Chart> {
    let mut curves = Vec::new();
    for (weight, group) in by_weight(points) {
        let suffix = format!(", w: {}", weight);
        let base = curves.last().map_or(0, |c: &Curve| c.group + 1);
        let next = trend_curves(&group, SelectionKey::reneging_rate, config.trend_degree, &suffix, base)?;
        curves.extend(next);
    }
    let spec = PlotSpec::new(format!("{} ERWP", MODEL_TITLE), "Reneging Rate r", "ERWP");
    Ok(Chart::new("FullOffloading_ERWP_RenegingRate", spec, curves))
}

/// Cross-seed WiFi and cellular service times of one configuration.
pub fn service_time_scatter(
    paths: &RunTable<PathRecord>,
    selection: &SelectionKey,
    config: &PathsConfig,
) -> Result<Chart> {
    let wifi = aggregate_service_times(paths, selection, QueuePath::Wifi, config.wifi_window)?;
    let cell = aggregate_service_times(paths, selection, QueuePath::Cellular, config.cellular_window)?;

    let curves = vec![
        Curve::new(0, PlotStyle::Scatter, wifi.times, wifi.values).labelled("WiFi - Averaged on runs"),
        Curve::new(1, PlotStyle::Scatter, cell.times, cell.values).labelled("Cellular - Averaged on runs"),
    ];
    let spec = PlotSpec::new(selection.to_string(), "Simulation Time", "Service Time");
    let stem = format!("WiFi_Cellular_Scatter_{}_averaged", selection.file_stem());
    Ok(Chart::new(stem, spec, curves))
}

/// Running average of the cross-seed service time: one chart per path, one curve per configuration.
pub fn mean_service_time_charts(paths: &RunTable<PathRecord>, config: &WarmupConfig, tag: &str) -> Result<Vec<Chart>> {
    let mut charts = Vec::with_capacity(2);
    for (path, title) in [(QueuePath::Wifi, "WiFi Queue"), (QueuePath::Cellular, "Cellular Queue")] {
        let mut curves = Vec::new();
        for (i, selection) in paths.selections().into_iter().enumerate() {
            let averaged = aggregate_service_times(paths, &selection, path, config.service_window)?;
            let smoothed = running_average(&averaged.values);
            curves.push(Curve::new(i, PlotStyle::Line, averaged.times, smoothed).labelled(selection.to_string()));
        }

        let spec = PlotSpec::new(title, "Simulation Time", "Mean Service Time [s]");
        charts.push(Chart::new(format!("{}_ServiceTime_{}Queue", tag, path.label()), spec, curves));
    }
    Ok(charts)
}

/// Queue length of `module`, one chart per configuration that recorded it.
///
/// Per seed: the raw queue length as steps plus its time-weighted running average.
/// With `mean_only`: one step curve of the cross-seed windowed mean.
pub fn queue_length_charts(table: &RunTable<RunRecord>, module: &str, config: &WarmupConfig) -> Result<Vec<Chart>> {
    let stage = short_module(module);
    let mut charts = Vec::new();

    for selection in table.selections() {
        let series = filter(table, vectors::QUEUE_LENGTH, &selection, Some(module))?;
        if series.is_empty() {
            continue;
        }

        let mut curves = Vec::new();
        if config.mean_only {
            let averaged = quantize(&series.times(), &series.values(), config.queue_window)?;
            curves.push(Curve::new(0, PlotStyle::Steps, averaged.times, averaged.values).labelled("Averaged on runs"));
        } else {
            for (i, run) in series.runs.iter().enumerate() {
                let smoothed = running_time_average(&run.value, &run.time)?;
                let tail = run.time.get(1..).unwrap_or_default().to_vec();
                curves.push(Curve::new(i, PlotStyle::Steps, run.time.clone(), run.value.clone()).labelled(&run.label));
                curves.push(Curve::new(i, PlotStyle::Line, tail, smoothed));
            }
        }

        let spec = PlotSpec::new(format!("{} {}", stage, selection), "Simulation Time", "Queue Length");
        let suffix = if config.mean_only { "_averaged" } else { "" };
        let stem = format!("QueueLength_{}_{}{}", stage, selection.file_stem(), suffix);
        charts.push(Chart::new(stem, spec, curves));
    }
    Ok(charts)
}
