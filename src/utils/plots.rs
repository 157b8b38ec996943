//! Chart rendering.
//!
//! Every chart in the reports is a single cartesian panel: measured points, trend lines or
//! step curves, with a legend. The same drawing code runs on the bitmap and SVG backends.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::debug;
use plotters::{coord::Shift, prelude::*};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotStyle {
    Line,
    Scatter,
    /// Piecewise constant, each value held until the next sample.
    Steps,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Fixed y axis; derived from the data when `None`.
    pub y_range: Option<(f64, f64)>,
}

impl PlotSpec {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            y_range: None,
        }
    }

    pub fn with_y_range(mut self, y_range: Option<(f64, f64)>) -> Self {
        self.y_range = y_range;
        self
    }
}

/// One drawn series. Curves sharing a `group` share a colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub label: Option<String>,
    pub group: usize,
    pub style: PlotStyle,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Curve {
    pub fn new(group: usize, style: PlotStyle, xs: Vec<f64>, ys: Vec<f64>) -> Self {
        Self {
            label: None,
            group,
            style,
            xs,
            ys,
        }
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn points(&self) -> Vec<(f64, f64)> {
        self.xs
            .iter()
            .copied()
            .zip(self.ys.iter().copied())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect()
    }
}

/// Renders `curves` to `path` with the format's extension; returns the written file.
pub fn render(path: &Path, format: ChartFormat, size: (u32, u32), spec: &PlotSpec, curves: &[Curve]) -> Result<PathBuf> {
    let file = path.with_extension(format.extension());
    match format {
        ChartFormat::Png => draw(BitMapBackend::new(&file, size).into_drawing_area(), spec, curves)?,
        ChartFormat::Svg => draw(SVGBackend::new(&file, size).into_drawing_area(), spec, curves)?,
    }
    debug!("Wrote {}", file.display());
    Ok(file)
}

fn draw<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, spec: &PlotSpec, curves: &[Curve]) -> Result<()> {
    root.fill(&WHITE).map_err(plot_err)?;

    let all: Vec<(f64, f64)> = curves.iter().flat_map(|c| c.points()).collect();
    let (x0, x1) = padded_range(all.iter().map(|p| p.0));
    let (y0, y1) = spec.y_range.unwrap_or_else(|| padded_range(all.iter().map(|p| p.1)));

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .draw()
        .map_err(plot_err)?;

    let mut labelled = false;
    for curve in curves {
        let color = Palette99::pick(curve.group).to_rgba();
        let points = curve.points();
        let anno = match curve.style {
            PlotStyle::Line => chart.draw_series(LineSeries::new(points, color.stroke_width(2))),
            PlotStyle::Steps => chart.draw_series(LineSeries::new(steps_post(&points), color.stroke_width(2))),
            PlotStyle::Scatter => chart.draw_series(points.into_iter().map(|p| Circle::new(p, 4, color.filled()))),
        }
        .map_err(plot_err)?;

        if let Some(label) = &curve.label {
            labelled = true;
            anno.label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }
    }

    if labelled {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Expands samples into a staircase: each value is held until the next timestamp.
fn steps_post(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for (i, &(x, y)) in points.iter().enumerate() {
        out.push((x, y));
        if let Some(&(next_x, _)) = points.get(i + 1) {
            out.push((next_x, y));
        }
    }
    out
}

fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn plot_err<E: std::fmt::Display>(e: E) -> AnalysisError {
    AnalysisError::Plot(e.to_string())
}
