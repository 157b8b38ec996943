//! # Offloading simulation analysis
//!
//! Post-processing for sweeps of a mobile-offloading queueing simulation. Each run exports its
//! measurement vectors as JSON; a sweep varies the offloading policy, the reneging deadline and
//! the random seed.
//!
//! ## Pipeline
//! - **Load:** discover run files, parse the experiment key from the path, build a [`RunTable`].
//! - **Filter / split:** select one vector per seed, separate jobs served over WiFi and cellular.
//! - **Aggregate:** average unequally sampled runs on a fixed window grid.
//! - **Metrics:** mean response time, mean energy consumption, ERWP, confidence intervals.
//! - **Report:** charts (PNG or SVG) and CSV tables.
//!
//! [`RunTable`]: data::store::RunTable

pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod utils;

pub use error::{AnalysisError, Result};
