//! Mean energy consumption of the mobile device.
//!
//! Each radio draws a fixed power while serving jobs. The share of time spent serving is the
//! cross-seed windowed service time summed over windows, normalised by the total WiFi active
//! time (WiFi) or by the simulated duration (cellular):
//!
//! `MEC = (1/λ) · (P_wifi · S_wifi / A_wifi + P_cell · S_cell / T)`

use log::{info, warn};

use crate::{
    analysis::{
        extract::{PathRecord, aggregate_records},
        splitter::QueuePath,
    },
    config::EnergyConfig,
    data::store::{RunTable, SelectionKey},
    error::Result,
    metrics::MetricPoint,
};

/// Energy consumption of one configuration, with per-seed samples.
pub fn mean_energy_consumption(
    paths: &RunTable<PathRecord>,
    selection: &SelectionKey,
    config: &EnergyConfig,
) -> Result<MetricPoint> {
    let runs = paths.select(selection)?;
    let records: Vec<&PathRecord> = runs.iter().map(|(_, r)| *r).collect();

    let value = energy_of(&records, config)?;
    let mut samples = std::collections::BTreeMap::new();
    for (seed, record) in &runs {
        samples.insert(*seed, energy_of(&[*record], config)?);
    }

    Ok(MetricPoint {
        selection: *selection,
        value,
        samples,
    })
}

/// Energy consumption for every configuration present in `paths`.
pub fn compute_energy_consumption(paths: &RunTable<PathRecord>, config: &EnergyConfig) -> Result<Vec<MetricPoint>> {
    info!("Calculating Mean Energy Consumption...");
    let mut points = Vec::new();
    for selection in paths.selections() {
        let point = mean_energy_consumption(paths, &selection, config)?;
        info!("  {}: MEC = {:.4}", selection, point.value);
        points.push(point);
    }
    Ok(points)
}

fn energy_of(records: &[&PathRecord], config: &EnergyConfig) -> Result<f64> {
    let wifi_service = aggregate_records(records, QueuePath::Wifi, config.window)?.value_sum();
    let cell_service = aggregate_records(records, QueuePath::Cellular, config.window)?.value_sum();
    let wifi_active: f64 = records.iter().map(|r| r.wifi.active_total()).sum();

    let wifi_fraction = fraction(wifi_service, wifi_active, "WiFi active time");
    let cell_fraction = fraction(cell_service, config.simulation_duration, "simulation duration");

    Ok((wifi_fraction * config.wifi_power + cell_fraction * config.cellular_power) / config.lambda)
}

fn fraction(busy: f64, total: f64, what: &str) -> f64 {
    if total == 0.0 {
        if busy != 0.0 {
            warn!("{} is zero while {:.3} s of service was recorded", what, busy);
        }
        0.0
    } else {
        busy / total
    }
}
