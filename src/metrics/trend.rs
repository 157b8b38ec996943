//! Least-squares polynomial trend lines for the metric charts.
//!
//! Purely presentational: fitted values are drawn next to the measured points and never fed back
//! into a metric.

use nalgebra::{DMatrix, DVector};

use crate::error::{AnalysisError, Result};

/// `p(x) = Σ coeffs[j] · u^j` with `u = (x - shift) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    pub coeffs: Vec<f64>,
    pub shift: f64,
    pub scale: f64,
}

impl Polynomial {
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn eval(&self, x: f64) -> f64 {
        let u = (x - self.shift) / self.scale;
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * u + c)
    }
}

/// Fits a polynomial of `degree` (capped at `points - 1`) through `(xs, ys)`.
///
/// x is mapped onto `[-1, 1]` first so that high degrees over large deadlines stay conditioned.
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Polynomial> {
    if xs.len() != ys.len() {
        return Err(AnalysisError::Fit(format!("{} x values but {} y values", xs.len(), ys.len())));
    }
    if xs.is_empty() {
        return Err(AnalysisError::Fit("no points to fit".into()));
    }

    let (lo, hi) = xs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    let shift = (lo + hi) / 2.0;
    let half_range = (hi - lo) / 2.0;
    let scale = if half_range > 0.0 { half_range } else { 1.0 };

    let degree = degree.min(xs.len() - 1);
    let a = DMatrix::from_fn(xs.len(), degree + 1, |i, j| ((xs[i] - shift) / scale).powi(j as i32));
    let b = DVector::from_column_slice(ys);

    let coeffs = a
        .svd(true, true)
        .solve(&b, 1e-12)
        .map_err(|e| AnalysisError::Fit(e.to_string()))?;

    Ok(Polynomial {
        coeffs: coeffs.iter().copied().collect(),
        shift,
        scale,
    })
}

/// Fitted values at the input x positions.
pub fn trend_line(xs: &[f64], ys: &[f64], degree: usize) -> Result<Vec<f64>> {
    let poly = polyfit(xs, ys, degree)?;
    Ok(xs.iter().map(|&x| poly.eval(x)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_an_exact_quadratic() {
        let xs: Vec<f64> = (0..8).map(|i| 10.0 + 20.0 * i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 - 0.5 * x + 0.01 * x * x).collect();
        let poly = polyfit(&xs, &ys, 2).unwrap();
        assert_eq!(poly.degree(), 2);
        for (x, y) in xs.iter().zip(&ys) {
            assert!((poly.eval(*x) - y).abs() < 1e-8);
        }
        assert!((poly.eval(500.0) - (3.0 - 250.0 + 2500.0)).abs() < 1e-6);
    }

    #[test]
    fn degree_is_capped_by_point_count() {
        let fitted = trend_line(&[1.0, 3.0], &[2.0, 6.0], 7).unwrap();
        assert!((fitted[0] - 2.0).abs() < 1e-9);
        assert!((fitted[1] - 6.0).abs() < 1e-9);
        assert_eq!(polyfit(&[1.0, 3.0], &[2.0, 6.0], 7).unwrap().degree(), 1);
    }

    #[test]
    fn constant_x_fits_the_mean() {
        let poly = polyfit(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0], 2).unwrap();
        assert!((poly.eval(5.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(polyfit(&[], &[], 3).is_err());
        assert!(polyfit(&[1.0], &[1.0, 2.0], 3).is_err());
    }
}
