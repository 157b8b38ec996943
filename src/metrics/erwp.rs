//! Energy-Response Weighted Product: `ERWP(w) = MEC^w · MRT^(1-w)`.

use std::collections::BTreeMap;

use log::{info, warn};

use crate::{
    error::{AnalysisError, Result},
    metrics::MetricPoint,
};

pub fn erwp(mec: f64, mrt: f64, weight: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&weight) {
        return Err(AnalysisError::InvalidWeight(weight));
    }
    Ok(mec.powf(weight) * mrt.powf(1.0 - weight))
}

/// ERWP of one configuration under one weight.
#[derive(Debug, Clone, PartialEq)]
pub struct ErwpPoint {
    pub weight: f64,
    pub point: MetricPoint,
}

/// Combines response-time and energy points of the same configuration, once per weight.
///
/// Configurations present in only one input are skipped. Per-seed samples pair the seeds
/// that have both metrics.
pub fn compute_erwp(response: &[MetricPoint], energy: &[MetricPoint], weights: &[f64]) -> Result<Vec<ErwpPoint>> {
    info!("Calculating ERWP for weights {:?}...", weights);
    let energy_by_sel: BTreeMap<_, _> = energy.iter().map(|p| (p.selection, p)).collect();

    let mut out = Vec::new();
    for &weight in weights {
        for mrt in response {
            let Some(mec) = energy_by_sel.get(&mrt.selection) else {
                warn!("No energy value for {}, skipping ERWP", mrt.selection);
                continue;
            };

            let mut samples = BTreeMap::new();
            for (seed, r) in &mrt.samples {
                if let Some(e) = mec.samples.get(seed) {
                    samples.insert(*seed, erwp(*e, *r, weight)?);
                }
            }

            out.push(ErwpPoint {
                weight,
                point: MetricPoint {
                    selection: mrt.selection,
                    value: erwp(mec.value, mrt.value, weight)?,
                    samples,
                },
            });
        }
    }
    Ok(out)
}

/// ERWP points grouped by weight, in the order the weights were given.
pub fn by_weight(points: &[ErwpPoint]) -> Vec<(f64, Vec<MetricPoint>)> {
    let mut groups: Vec<(f64, Vec<MetricPoint>)> = Vec::new();
    for p in points {
        match groups.iter_mut().find(|(w, _)| *w == p.weight) {
            Some((_, group)) => group.push(p.point.clone()),
            None => groups.push((p.weight, vec![p.point.clone()])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::SelectionKey;

    fn point(deadline: u32, value: f64, samples: &[(u32, f64)]) -> MetricPoint {
        MetricPoint {
            selection: SelectionKey::new(Some(1), deadline),
            value,
            samples: samples.iter().copied().collect(),
        }
    }

    #[test]
    fn geometric_weighting() {
        let v = erwp(5.0, 10.0, 0.5).unwrap();
        assert!((v - 50f64.sqrt()).abs() < 1e-12);
        assert!((v - 7.0711).abs() < 1e-4);
        assert_eq!(erwp(5.0, 10.0, 1.0).unwrap(), 5.0);
        assert_eq!(erwp(5.0, 10.0, 0.0).unwrap(), 10.0);
    }

    #[test]
    fn weight_outside_unit_interval_is_rejected() {
        assert!(matches!(erwp(1.0, 1.0, -0.1), Err(AnalysisError::InvalidWeight(_))));
        assert!(matches!(erwp(1.0, 1.0, 1.5), Err(AnalysisError::InvalidWeight(_))));
    }

    #[test]
    fn each_weight_is_independent() {
        let response = vec![point(40, 10.0, &[(0, 8.0), (1, 12.0)]), point(80, 4.0, &[])];
        let energy = vec![point(40, 5.0, &[(0, 4.0), (2, 6.0)])];

        let points = compute_erwp(&response, &energy, &[0.1, 0.9]).unwrap();
        // deadline 80 has no energy value
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].weight, 0.1);
        assert_eq!(points[1].weight, 0.9);
        assert!(points[0].point.value > points[1].point.value);

        // only seed 0 has both samples
        assert_eq!(points[0].point.samples.len(), 1);
        let expected = 4f64.powf(0.1) * 8f64.powf(0.9);
        assert!((points[0].point.samples[&0] - expected).abs() < 1e-12);

        let groups = by_weight(&points);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].0, 0.9);
    }
}
