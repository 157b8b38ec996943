//! # Offloading analysis entry point
//!
//! Runs the full metric pipeline over a `BatchExecution` sweep.
//!
//! ## Passes
//! - **Load:** every run export under `--inputDir`, keyed by (policy, deadline, seed).
//! - **Extract:** WiFi/cellular job traces per run, plotted as cross-seed averages.
//! - **Metrics:** mean response time, mean energy consumption, ERWP per weight.
//!
//! ## Outputs
//! - `plots/WiFi_Cellular_Scatter_<config>_averaged.<ext>`
//! - `plots/FullOffloading_Response_Deadline.<ext>`, `..._Energy_Deadline`, `..._ERWP_RenegingRate`
//! - `csv/<METRIC>[_w<weight>]_<policy>.csv`, `csv/metrics_summary.csv`

use std::error::Error;

use clap::Parser;
use env_logger::Env;
use log::info;

use offload_analysis::{
    analysis::extract::extract_paths,
    cli::CommonArgs,
    data::loader::load_runs,
    metrics::{
        energy::compute_energy_consumption,
        erwp::{by_weight, compute_erwp},
        response::compute_response_times,
    },
    utils::{
        charts::{energy_chart, erwp_chart, response_chart, service_time_scatter},
        export::{create_output_dirs, summary_rows, write_metric_tables, write_rows},
    },
};

#[derive(Parser, Debug)]
#[command(name = "offload-analysis", version, about = "Response time, energy and ERWP of an offloading sweep")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Comma-separated ERWP weights in [0, 1] (overrides config)
    #[arg(long, value_delimiter = ',')]
    weights: Option<Vec<f64>>,

    /// Skip the CSV tables
    #[arg(long = "no-csv")]
    no_csv: bool,
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = cli.common.resolve_config()?;
    if let Some(weights) = cli.weights {
        config.erwp.weights = weights;
        config.validate()?;
    }

    info!("=== OFFLOAD ANALYSIS START ===");
    let (plots_dir, csv_dir) = create_output_dirs(&cli.common.output_dir)?;

    let table = load_runs(&cli.common.input_dir, &config.load.analysis_tag, config.load.layout)?;
    let space = table.key_space();
    info!(
        "Key space: {} policies, {} deadlines, {} seeds",
        space.policies.len(),
        space.deadlines.len(),
        space.seeds.len()
    );

    let paths = extract_paths(&table)?;
    for selection in paths.selections() {
        service_time_scatter(&paths, &selection, &config.paths)?.save(&plots_dir, &config.plot)?;
    }

    let response = compute_response_times(&table, &config.load, &config.response)?;
    let energy = compute_energy_consumption(&paths, &config.energy)?;
    let erwp = compute_erwp(&response, &energy, &config.erwp.weights)?;

    response_chart(&response, &config.response)?.save(&plots_dir, &config.plot)?;
    energy_chart(&energy, &config.energy)?.save(&plots_dir, &config.plot)?;
    erwp_chart(&erwp, &config.erwp)?.save(&plots_dir, &config.plot)?;

    if cli.no_csv {
        info!("CSV export disabled");
    } else {
        for (metric, points) in [("MRT", &response), ("MEC", &energy)] {
            write_metric_tables(&csv_dir, metric, None, points)?;
        }
        for (weight, points) in by_weight(&erwp) {
            write_metric_tables(&csv_dir, "ERWP", Some(weight), &points)?;
        }
        write_rows(&csv_dir.join("metrics_summary.csv"), &summary_rows(&response, &energy))?;
    }

    info!("=== OFFLOAD ANALYSIS FINISHED ===");
    Ok(())
}
