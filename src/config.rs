//! Analysis parameters.
//!
//! Defaults reproduce the reference experiment (λ = 0.5, 2.8e6 s runs, WiFi/cellular power
//! coefficients 0.7 and 2.5). A JSON file passed with `--config` may override any subset of
//! fields; command-line flags are applied on top by the binaries.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    data::loader::KeyLayout,
    error::{AnalysisError, Result},
    utils::plots::ChartFormat,
};

pub const ANALYSIS_TAG: &str = "BatchExecution";
pub const WARMUP_TAG: &str = "SetupAnalysis";
pub const DEFAULT_NETWORK: &str = "QueueNetwork";

pub const DEFAULT_LAMBDA: f64 = 0.5;
pub const WIFI_POWER_COEFFICIENT: f64 = 0.7;
pub const CELLULAR_POWER_COEFFICIENT: f64 = 2.5;
pub const SIMULATION_DURATION: f64 = 2_800_000.0;

pub const RESPONSE_WINDOW: f64 = 100.0;
pub const ENERGY_WINDOW: f64 = 1000.0;
pub const DEFAULT_ERWP_WEIGHTS: [f64; 3] = [0.1, 0.5, 0.9];

// Trend-line polynomial degrees.
pub const RESPONSE_TREND_DEGREE: usize = 7;
pub const ENERGY_TREND_DEGREE: usize = 5;
pub const ERWP_TREND_DEGREE: usize = 3;

/// 10 x 7 in at 120 dpi.
pub const CHART_SIZE: (u32, u32) = (1200, 840);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub load: LoadConfig,
    pub response: ResponseConfig,
    pub energy: EnergyConfig,
    pub erwp: ErwpConfig,
    pub paths: PathsConfig,
    pub warmup: WarmupConfig,
    pub plot: PlotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub analysis_tag: String,
    pub warmup_tag: String,
    pub layout: KeyLayout,
    /// Network name prefixed to module paths (`<network>.<queue>`).
    pub network: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            analysis_tag: ANALYSIS_TAG.into(),
            warmup_tag: WARMUP_TAG.into(),
            layout: KeyLayout::default(),
            network: DEFAULT_NETWORK.into(),
        }
    }
}

impl LoadConfig {
    pub fn module(&self, stage: &str) -> String {
        format!("{}.{}", self.network, stage)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    pub lambda: f64,
    pub window: f64,
    /// Queue modules (without network prefix) whose lengths add up to the response time.
    pub stages: Vec<String>,
    pub trend_degree: usize,
    pub y_range: Option<(f64, f64)>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            window: RESPONSE_WINDOW,
            stages: vec!["wifiQueue".into(), "cellularQueue".into(), "remoteQueue".into()],
            trend_degree: RESPONSE_TREND_DEGREE,
            y_range: Some((5.0, 35.0)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub lambda: f64,
    pub wifi_power: f64,
    pub cellular_power: f64,
    /// Elapsed time the cellular radio is normalised by.
    pub simulation_duration: f64,
    pub window: f64,
    pub trend_degree: usize,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            wifi_power: WIFI_POWER_COEFFICIENT,
            cellular_power: CELLULAR_POWER_COEFFICIENT,
            simulation_duration: SIMULATION_DURATION,
            window: ENERGY_WINDOW,
            trend_degree: ENERGY_TREND_DEGREE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErwpConfig {
    pub weights: Vec<f64>,
    pub trend_degree: usize,
}

impl Default for ErwpConfig {
    fn default() -> Self {
        Self {
            weights: DEFAULT_ERWP_WEIGHTS.to_vec(),
            trend_degree: ERWP_TREND_DEGREE,
        }
    }
}

/// Windows for the averaged WiFi/cellular service-time scatter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub wifi_window: f64,
    pub cellular_window: f64,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            wifi_window: 100.0,
            cellular_window: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmupConfig {
    pub service_window: f64,
    pub queue_window: f64,
    pub queue_stages: Vec<String>,
    /// Plot only the cross-seed average instead of one curve per seed.
    pub mean_only: bool,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            service_window: 100.0,
            queue_window: 200.0,
            queue_stages: vec!["cellularQueue".into(), "wifiQueue".into()],
            mean_only: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub format: ChartFormat,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            format: ChartFormat::default(),
            width: CHART_SIZE.0,
            height: CHART_SIZE.1,
        }
    }
}

impl AnalysisConfig {
    /// Reads a (partial) JSON configuration; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        let config: AnalysisConfig = serde_json::from_str(&text).map_err(|source| AnalysisError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |what: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(AnalysisError::Config(format!("{} must be positive, got {}", what, v)))
            }
        };

        positive("response.lambda", self.response.lambda)?;
        positive("response.window", self.response.window)?;
        positive("energy.lambda", self.energy.lambda)?;
        positive("energy.window", self.energy.window)?;
        positive("energy.simulation_duration", self.energy.simulation_duration)?;
        positive("paths.wifi_window", self.paths.wifi_window)?;
        positive("paths.cellular_window", self.paths.cellular_window)?;
        positive("warmup.service_window", self.warmup.service_window)?;
        positive("warmup.queue_window", self.warmup.queue_window)?;

        if self.response.stages.is_empty() {
            return Err(AnalysisError::Config("response.stages is empty".into()));
        }
        if let Some(w) = self.erwp.weights.iter().find(|w| !(0.0..=1.0).contains(*w)) {
            return Err(AnalysisError::InvalidWeight(*w));
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(AnalysisError::Config("plot size must be non-zero".into()));
        }
        Ok(())
    }
}
