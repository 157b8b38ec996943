//! Mean response time.
//!
//! By Little's law the mean number of jobs in a stage divided by the arrival rate is the mean
//! time spent there, so the response time is `(1/λ) · Σ_stage mean(queue length)`, where each
//! stage's queue length is first averaged across seeds with the windowed aggregator.

use std::collections::BTreeMap;

use log::{info, warn};

use crate::{
    analysis::{filter::filter, quantize::quantize},
    config::{LoadConfig, ResponseConfig},
    data::{
        store::{RunRecord, RunTable, SelectionKey},
        vectors,
    },
    error::Result,
    metrics::MetricPoint,
};

/// Response time of one configuration; `None` when some stage has no data in any seed.
pub fn mean_response_time(
    table: &RunTable<RunRecord>,
    selection: &SelectionKey,
    load: &LoadConfig,
    config: &ResponseConfig,
) -> Result<Option<MetricPoint>> {
    let mut total = 0.0;
    let mut per_seed: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

    for stage in &config.stages {
        let module = load.module(stage);
        let series = filter(table, vectors::QUEUE_LENGTH, selection, Some(&module))?;
        if series.is_empty() {
            warn!("No {} data for {}, skipping configuration", module, selection);
            return Ok(None);
        }

        let averaged = quantize(&series.times(), &series.values(), config.window)?;
        total += averaged.value_mean().unwrap_or(0.0);

        for run in &series.runs {
            let own = quantize(&[&run.time], &[&run.value], config.window)?;
            let entry = per_seed.entry(run.seed).or_insert((0.0, 0));
            entry.0 += own.value_mean().unwrap_or(0.0);
            entry.1 += 1;
        }
    }

    let samples = per_seed
        .into_iter()
        .filter(|(_, (_, stages))| *stages == config.stages.len())
        .map(|(seed, (sum, _))| (seed, sum / config.lambda))
        .collect();

    Ok(Some(MetricPoint {
        selection: *selection,
        value: total / config.lambda,
        samples,
    }))
}

/// Response time for every configuration present in `table`.
pub fn compute_response_times(
    table: &RunTable<RunRecord>,
    load: &LoadConfig,
    config: &ResponseConfig,
) -> Result<Vec<MetricPoint>> {
    info!("Calculating Mean Response Time...");
    let mut points = Vec::new();
    for selection in table.selections() {
        if let Some(point) = mean_response_time(table, &selection, load, config)? {
            info!("  {}: MRT = {:.4}", selection, point.value);
            points.push(point);
        }
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::MeasurementVector;

    fn queue(stage: &str, time: Vec<f64>, value: Vec<f64>) -> MeasurementVector {
        MeasurementVector {
            name: vectors::QUEUE_LENGTH.into(),
            module: Some(format!("QueueNetwork.{}", stage)),
            time,
            value,
        }
    }

    fn config() -> ResponseConfig {
        ResponseConfig {
            lambda: 0.5,
            window: 10.0,
            stages: vec!["wifiQueue".into(), "cellularQueue".into()],
            ..ResponseConfig::default()
        }
    }

    #[test]
    fn sums_stage_means_scaled_by_lambda() {
        let sel = SelectionKey::new(Some(1), 40);
        let mut builder = RunTable::builder();
        builder
            .insert(
                sel.with_seed(0),
                RunRecord {
                    vectors: vec![
                        queue("wifiQueue", vec![0.0, 5.0, 15.0], vec![2.0, 4.0, 6.0]),
                        queue("cellularQueue", vec![0.0], vec![1.0]),
                    ],
                },
            )
            .unwrap();
        builder
            .insert(
                sel.with_seed(1),
                RunRecord {
                    vectors: vec![queue("wifiQueue", vec![1.0], vec![8.0])],
                },
            )
            .unwrap();
        let table = builder.build();

        let point = mean_response_time(&table, &sel, &LoadConfig::default(), &config())
            .unwrap()
            .unwrap();

        // wifi: windows [0,10) -> (2+4+8)/3, [10,..) -> 6; cellular: 1
        let wifi = ((14.0 / 3.0) + 6.0) / 2.0;
        assert!((point.value - (wifi + 1.0) / 0.5).abs() < 1e-9);

        // only seed 0 has both stages
        assert_eq!(point.samples.len(), 1);
        let seed0 = (3.0 + 6.0) / 2.0 + 1.0;
        assert!((point.samples[&0] - seed0 / 0.5).abs() < 1e-9);
    }

    #[test]
    fn stage_missing_everywhere_skips_configuration() {
        let sel = SelectionKey::new(None, 8);
        let mut builder = RunTable::builder();
        builder
            .insert(
                sel.with_seed(0),
                RunRecord {
                    vectors: vec![queue("wifiQueue", vec![0.0], vec![1.0])],
                },
            )
            .unwrap();
        let table = builder.build();
        let points = compute_response_times(&table, &LoadConfig::default(), &config()).unwrap();
        assert!(points.is_empty());
    }
}
