//! Windowed aggregation across simulation runs.
//!
//! Runs of one configuration are sampled at different instants and end at different times. To
//! average them, every sample of every run is projected onto one grid of fixed-width windows
//! derived from the longest run, and each non-empty window collapses to the mean of the
//! timestamps and the mean of the values that landed in it.
//!
//! Grid: boundaries `k * width` for all `k >= 0` with `k * width < horizon`, where `horizon` is
//! the last timestamp of the run with the most samples (first such run on ties). With `n`
//! boundaries, a timestamp `t` falls in window `#{k : k * width <= t}`, so:
//! - window 0 only holds negative timestamps,
//! - window `n` is open-ended and absorbs everything at or past the last boundary.
//!
//! Output is ordered by window index. Mean times pooled from differently shaped runs are not
//! re-sorted.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{AnalysisError, Result};

/// Cross-run average: one point per non-empty window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowedSeries {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl WindowedSeries {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    pub fn value_sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Mean of the window values, `None` when no window received samples.
    pub fn value_mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.value_sum() / self.values.len() as f64)
        }
    }
}

/// Fixed-width window grid anchored at time zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGrid {
    width: f64,
    boundaries: usize,
}

impl WindowGrid {
    /// Grid covering `[0, horizon)` with windows of `width`.
    pub fn new(width: f64, horizon: f64) -> Result<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(AnalysisError::InvalidWindow(width));
        }

        let boundaries = if horizon.is_finite() && horizon > 0.0 {
            let q = (horizon / width).ceil();
            let mut n = if q >= usize::MAX as f64 { usize::MAX } else { q as usize };
            // `ceil` of a rounded quotient is at most one off against the exact boundaries.
            if n > 0 && (n - 1) as f64 * width >= horizon {
                n -= 1;
            } else if n < usize::MAX && (n as f64) * width < horizon {
                n += 1;
            }
            n
        } else {
            0
        };

        Ok(Self { width, boundaries })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Number of explicit boundaries; valid window indices are `0..=boundaries()`.
    pub fn boundaries(&self) -> usize {
        self.boundaries
    }

    /// Window index of `t`; never out of range.
    pub fn index_of(&self, t: f64) -> usize {
        if self.boundaries == 0 || t < 0.0 {
            return 0;
        }
        let last = self.boundaries - 1;
        let mut k = ((t / self.width).floor() as usize).min(last);
        if k > 0 && (k as f64) * self.width > t {
            k -= 1;
        } else if k < last && ((k + 1) as f64) * self.width <= t {
            k += 1;
        }
        k + 1
    }
}

#[derive(Debug, Default)]
struct Window {
    time_sum: f64,
    value_sum: f64,
    count: usize,
}

/// Pools `times[i]`/`values[i]` (one pair per run) into windows of `width` and averages each.
pub fn quantize<T, V>(times: &[T], values: &[V], width: f64) -> Result<WindowedSeries>
where
    T: AsRef<[f64]>,
    V: AsRef<[f64]>,
{
    if times.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    if times.len() != values.len() {
        return Err(AnalysisError::MisalignedTrace(format!(
            "{} time series but {} value series",
            times.len(),
            values.len()
        )));
    }
    for (run, (t, v)) in times.iter().zip(values).enumerate() {
        let (t, v) = (t.as_ref(), v.as_ref());
        if t.len() != v.len() {
            return Err(AnalysisError::MisalignedTrace(format!(
                "run {} has {} timestamps but {} values",
                run,
                t.len(),
                v.len()
            )));
        }
    }

    let reference = reference_run(times);
    let horizon = times[reference].as_ref().last().copied().unwrap_or(0.0);
    let grid = WindowGrid::new(width, horizon)?;

    // Sparse: the grid may hold far more windows than there are samples.
    let mut windows: BTreeMap<usize, Window> = BTreeMap::new();
    for (t, v) in times.iter().zip(values) {
        for (&time, &value) in t.as_ref().iter().zip(v.as_ref()) {
            if time.is_nan() {
                debug!("Skipping sample with NaN timestamp");
                continue;
            }
            let w = windows.entry(grid.index_of(time)).or_default();
            w.time_sum += time;
            w.value_sum += value;
            w.count += 1;
        }
    }

    let mut out = WindowedSeries::default();
    for w in windows.values() {
        out.times.push(w.time_sum / w.count as f64);
        out.values.push(w.value_sum / w.count as f64);
    }
    Ok(out)
}

/// Index of the run with the most samples, first on ties.
fn reference_run<T: AsRef<[f64]>>(times: &[T]) -> usize {
    let mut best = 0;
    for (i, t) in times.iter().enumerate() {
        if t.as_ref().len() > times[best].as_ref().len() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn three_seed_scenario_yields_two_windows() {
        let times = vec![
            vec![0.0, 50.0, 100.0],
            vec![0.0, 60.0, 120.0],
            vec![0.0, 40.0, 80.0, 160.0],
        ];
        let values = vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0, 10.0],
        ];

        let out = quantize(&times, &values, 100.0).unwrap();
        assert_eq!(out.len(), 2);

        // [0, 100): t = 0, 50, 0, 60, 0, 40, 80
        assert!(close(out.times[0], 230.0 / 7.0));
        assert!(close(out.values[0], (1.0 + 2.0 + 4.0 + 5.0 + 7.0 + 8.0 + 9.0) / 7.0));
        // [100, ...): t = 100, 120, 160
        assert!(close(out.times[1], 380.0 / 3.0));
        assert!(close(out.values[1], (3.0 + 6.0 + 10.0) / 3.0));
    }

    #[test]
    fn samples_past_the_horizon_are_kept() {
        let times = vec![vec![0.0, 10.0, 20.0, 30.0], vec![500.0]];
        let values = vec![vec![1.0, 1.0, 1.0, 1.0], vec![9.0]];
        let out = quantize(&times, &values, 10.0).unwrap();

        // boundaries 0, 10, 20: 20, 30 and 500 share the open-ended window
        assert_eq!(out.len(), 3);
        assert!(close(*out.times.last().unwrap(), 550.0 / 3.0));
        assert!(close(*out.values.last().unwrap(), 11.0 / 3.0));
    }

    #[test]
    fn last_explicit_window_merges_with_overflow() {
        // horizon 25 -> boundaries 0, 10, 20; 20 <= t falls in the open-ended window
        let times = vec![vec![5.0, 15.0, 22.0, 25.0]];
        let values = vec![vec![1.0, 2.0, 3.0, 5.0]];
        let out = quantize(&times, &values, 10.0).unwrap();
        assert_eq!(out.values, vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn empty_windows_are_omitted() {
        let times = vec![vec![1.0, 2.0, 95.0, 100.0]];
        let values = vec![vec![2.0, 4.0, 6.0, 8.0]];
        let out = quantize(&times, &values, 10.0).unwrap();
        assert_eq!(out.times, vec![1.5, 97.5]);
        assert_eq!(out.values, vec![3.0, 7.0]);
    }

    #[test]
    fn permuting_non_reference_runs_is_invariant() {
        let a = vec![0.0, 3.0, 7.0, 11.0, 19.0];
        let b = vec![1.0, 12.0];
        let c = vec![4.0, 8.0, 30.0];
        let va = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let vb = vec![6.0, 7.0];
        let vc = vec![8.0, 9.0, 10.0];

        let one = quantize(
            &[a.clone(), b.clone(), c.clone()],
            &[va.clone(), vb.clone(), vc.clone()],
            5.0,
        )
        .unwrap();
        let two = quantize(&[c, a, b], &[vc, va, vb], 5.0).unwrap();

        assert_eq!(one.len(), two.len());
        for ((t1, v1), (t2, v2)) in one.iter().zip(two.iter()) {
            assert!(close(t1, t2));
            assert!(close(v1, v2));
        }
    }

    #[test]
    fn ties_pick_the_first_longest_run() {
        let times = vec![vec![0.0, 10.0], vec![0.0, 100.0]];
        assert_eq!(reference_run(&times), 0);
        // horizon 10 from the first run: 10 and 100 both land in the open-ended window
        let values = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let out = quantize(&times, &values, 1.0).unwrap();
        assert_eq!(out.values, vec![2.0, 3.0]);
        assert_eq!(out.times, vec![0.0, 55.0]);
    }

    #[test]
    fn horizon_sample_joins_the_open_ended_window() {
        let times = vec![vec![0.0, 10.0, 20.0]];
        let values = vec![vec![0.0, 0.0, 0.0]];
        let out = quantize(&times, &values, 10.0).unwrap();
        assert_eq!(out.times, vec![0.0, 15.0]);
    }

    #[test]
    fn exact_boundaries_follow_the_grid() {
        let grid = WindowGrid::new(0.1, 1.0).unwrap();
        assert_eq!(grid.boundaries(), 10);
        assert_eq!(grid.index_of(-1.0), 0);
        assert_eq!(grid.index_of(0.0), 1);
        assert_eq!(grid.index_of(0.3), 3);
        assert_eq!(grid.index_of(0.95), 10);
        assert_eq!(grid.index_of(42.0), 10);
    }

    #[test]
    fn tiny_window_over_a_long_run_stays_sparse() {
        // 2.8e12 windows on the grid, three of them occupied
        let times = vec![vec![0.0, 1_400_000.0, 2_800_000.0]];
        let values = vec![vec![1.0, 2.0, 3.0]];
        let out = quantize(&times, &values, 1e-6).unwrap();
        assert_eq!(out.values, vec![1.0, 2.0, 3.0]);
        assert_eq!(out.times, vec![0.0, 1_400_000.0, 2_800_000.0]);
    }

    #[test]
    fn huge_window_counts_saturate() {
        let grid = WindowGrid::new(f64::MIN_POSITIVE, 1e300).unwrap();
        assert_eq!(grid.boundaries(), usize::MAX);
        assert_eq!(grid.index_of(0.0), 1);
        assert_eq!(grid.index_of(1.0), usize::MAX);
    }

    #[test]
    fn rejects_bad_input() {
        let empty: Vec<Vec<f64>> = vec![];
        assert!(matches!(quantize(&empty, &empty, 1.0), Err(AnalysisError::EmptyInput)));
        assert!(matches!(
            quantize(&[vec![0.0]], &[vec![0.0]], 0.0),
            Err(AnalysisError::InvalidWindow(_))
        ));
        assert!(matches!(
            quantize(&[vec![0.0, 1.0]], &[vec![0.0]], 1.0),
            Err(AnalysisError::MisalignedTrace(_))
        ));
    }

    #[test]
    fn all_empty_runs_produce_empty_output() {
        let times: Vec<Vec<f64>> = vec![vec![], vec![]];
        let out = quantize(&times, &times, 5.0).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.value_mean(), None);
    }
}
