//! Running averages used to smooth single trajectories.

use crate::error::{AnalysisError, Result};

/// Cumulative mean: `out[k]` is the mean of `values[..=k]`.
pub fn running_average(values: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(k, v)| {
            sum += v;
            sum / (k + 1) as f64
        })
        .collect()
}

/// Time-weighted running average of a piecewise-constant signal observed from time zero.
///
/// `values[j]` holds on `[times[j], times[j + 1])`, so the result has one entry per interval
/// (`len - 1`): `out[k] = Σ_{j<=k} values[j] * (times[j+1] - times[j]) / times[k+1]`.
/// An interval ending at time zero reports `values[0]`.
pub fn running_time_average(values: &[f64], times: &[f64]) -> Result<Vec<f64>> {
    if values.len() != times.len() {
        return Err(AnalysisError::MisalignedTrace(format!(
            "{} values but {} timestamps",
            values.len(),
            times.len()
        )));
    }

    let mut area = 0.0;
    let out = times
        .windows(2)
        .zip(values)
        .map(|(span, &v)| {
            area += v * (span[1] - span[0]);
            if span[1] == 0.0 { values[0] } else { area / span[1] }
        })
        .collect();
    Ok(out)
}
