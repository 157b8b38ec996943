use std::path::PathBuf;

use clap::Args;

use crate::{
    config::AnalysisConfig,
    data::loader::KeyLayout,
    error::Result,
    utils::plots::ChartFormat,
};

/// Flags shared by every analysis binary.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory searched recursively for run exports
    #[arg(long = "inputDir", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Directory receiving `plots/` and `csv/`
    #[arg(long = "outputDir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// JSON file overriding analysis parameters
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Experiment dimensions encoded in file names (overrides config)
    #[arg(long, value_enum)]
    pub layout: Option<KeyLayout>,

    /// Network name prefixing queue modules, e.g. FullOffloadingNetwork (overrides config)
    #[arg(long)]
    pub network: Option<String>,

    /// Chart output format (overrides config)
    #[arg(long, value_enum)]
    pub format: Option<ChartFormat>,
}

impl CommonArgs {
    /// Defaults, then the `--config` file, then command-line overrides; validated.
    pub fn resolve_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(layout) = self.layout {
            config.load.layout = layout;
        }
        if let Some(network) = &self.network {
            config.load.network = network.clone();
        }
        if let Some(format) = self.format {
            config.plot.format = format;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        common: CommonArgs,
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let cli = Cli::try_parse_from([
            "bin",
            "--inputDir",
            "in",
            "--outputDir",
            "out",
            "--layout",
            "deadline-seed",
            "--format",
            "svg",
            "--network",
            "FullOffloadingNetwork",
        ])
        .unwrap();
        let config = cli.common.resolve_config().unwrap();
        assert_eq!(config.load.layout, KeyLayout::DeadlineSeed);
        assert_eq!(config.plot.format, ChartFormat::Svg);
        assert_eq!(config.load.module("wifiQueue"), "FullOffloadingNetwork.wifiQueue");
        assert_eq!(cli.common.input_dir, PathBuf::from("in"));
    }

    #[test]
    fn directories_are_required() {
        assert!(Cli::try_parse_from(["bin", "--inputDir", "in"]).is_err());
    }
}
