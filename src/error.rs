//! Error type shared by every analysis pass.
//!
//! Everything here is fatal for the batch: the binaries propagate it to `main` and exit.
//! The one recoverable condition (a vector missing for a single seed) never becomes an
//! error; the series filter logs it and skips the seed.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::data::store::{ExperimentKey, SelectionKey};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Run file whose JSON body does not hold exactly one top-level key.
    #[error("{path}: only one top-level key expected, found {found}")]
    MalformedRun { path: PathBuf, found: usize },

    #[error("vector {name} in {path} has {times} timestamps but {values} values")]
    MalformedVector {
        path: PathBuf,
        name: String,
        times: usize,
        values: usize,
    },

    #[error("run {key} loaded twice ({path})")]
    DuplicateRun { key: ExperimentKey, path: PathBuf },

    #[error("run {0} inserted twice")]
    DuplicateKey(ExperimentKey),

    #[error("no runs recorded for {0}")]
    MissingSelection(SelectionKey),

    #[error("misaligned trace: {0}")]
    MisalignedTrace(String),

    #[error("unexpected queue tag {tag} at row {row} (expected 2 or 3)")]
    UnexpectedQueueTag { row: usize, tag: f64 },

    #[error("aggregation needs at least one series")]
    EmptyInput,

    #[error("window width must be finite and positive, got {0}")]
    InvalidWindow(f64),

    #[error("ERWP weight must lie in [0, 1], got {0}")]
    InvalidWeight(f64),

    #[error("trend fit failed: {0}")]
    Fit(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("plot rendering failed: {0}")]
    Plot(String),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }
}
