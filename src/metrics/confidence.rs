//! Student-t confidence intervals over per-seed samples.

use average::Variance;
use statrs::distribution::{ContinuousCDF, StudentsT};

pub const CONFIDENCE_LEVEL: f64 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub samples: usize,
    pub mean: f64,
    /// Bessel-corrected (n - 1).
    pub variance: f64,
    pub left: f64,
    pub right: f64,
}

impl ConfidenceInterval {
    pub fn half_width(&self) -> f64 {
        (self.right - self.left) / 2.0
    }
}

/// Two-sided interval `mean ± t_{(1+level)/2, n-1} · sqrt(var / n)`; `None` below two samples.
pub fn confidence_interval(samples: &[f64], level: f64) -> Option<ConfidenceInterval> {
    let n = samples.len();
    if n < 2 {
        return None;
    }

    let stats: Variance = samples.iter().copied().collect();
    let mean = stats.mean();
    let variance = stats.sample_variance();

    let t = StudentsT::new(0.0, 1.0, (n - 1) as f64).ok()?;
    let quantile = t.inverse_cdf((1.0 + level) / 2.0);
    let half = quantile * (variance / n as f64).sqrt();

    Some(ConfidenceInterval {
        samples: n,
        mean,
        variance,
        left: mean - half,
        right: mean + half,
    })
}
