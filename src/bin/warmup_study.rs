//! Warm-up (transient) study over a `SetupAnalysis` sweep.
//!
//! Charts whether the simulated system has settled:
//! - running average of the cross-seed service time, one curve per configuration, for each path;
//! - queue length of each configured stage over time, per seed or averaged across seeds.

use std::error::Error;

use clap::Parser;
use env_logger::Env;
use log::info;

use offload_analysis::{
    analysis::extract::extract_paths,
    cli::CommonArgs,
    data::loader::load_runs,
    utils::{
        charts::{mean_service_time_charts, queue_length_charts},
        export::create_output_dirs,
    },
};

#[derive(Parser, Debug)]
#[command(name = "warmup-study", version, about = "Transient behaviour of an offloading sweep")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Plot only the cross-seed average queue length
    #[arg(long = "mean-only")]
    mean_only: bool,
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = cli.common.resolve_config()?;
    config.warmup.mean_only |= cli.mean_only;

    info!("=== WARM-UP STUDY START ===");
    let (plots_dir, _) = create_output_dirs(&cli.common.output_dir)?;
    let table = load_runs(&cli.common.input_dir, &config.load.warmup_tag, config.load.layout)?;

    info!("Calculating Mean Service Time...");
    let paths = extract_paths(&table)?;
    let mut charts = mean_service_time_charts(&paths, &config.warmup, &config.load.warmup_tag)?;
    for stage in &config.warmup.queue_stages {
        let module = config.load.module(stage);
        info!("Calculating Mean Queue Length for {}...", module);
        charts.extend(queue_length_charts(&table, &module, &config.warmup)?);
    }
    for chart in &charts {
        chart.save(&plots_dir, &config.plot)?;
    }

    info!("=== WARM-UP STUDY FINISHED ===");
    Ok(())
}
