//! Error taxonomy for the `aircast` backend service.
//!
//! Two tiers, matching the propagation policy of the pipeline:
//! - [`ConfigError`]: fatal startup failures (missing files, missing
//!   timestamp/target columns). The process must not begin serving traffic.
//! - [`ForecastError`]: per-request failures (structurally insufficient
//!   history). Surfaced to the caller as a descriptive request failure, never
//!   a crash.
//!
//! Row-level data-quality issues (unparseable timestamps) are deliberately
//! not errors: those rows are filtered out and counted, see `timeseries`.

use std::path::PathBuf;

use thiserror::Error;

// ---

/// Fatal startup-time configuration and loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("data file not found at {path}")]
    DataFileNotFound { path: PathBuf },

    #[error("model file not found at {path}")]
    ModelFileNotFound { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV data in {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to parse model artifact {path}: {source}")]
    ModelParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "no timestamp column found (expected one of: timestamp, datetime, date, time); \
         available columns: {available:?}"
    )]
    NoTimestampColumn { available: Vec<String> },

    #[error("target column '{target}' not found after normalization; available: {available:?}")]
    TargetColumnMissing {
        target: String,
        available: Vec<String>,
    },
}

/// Recoverable per-request failures from the prediction service.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("insufficient data: {0}")]
    DataUnavailable(String),
}
