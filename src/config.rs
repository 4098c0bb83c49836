//! Configuration loader for the `aircast` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u16 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Path to the historical air-quality CSV dataset.
    pub data_path: PathBuf,

    /// Path to the pretrained regression model artifact (JSON).
    pub model_path: PathBuf,

    /// Name of the regression target column in the dataset.
    pub target: String,

    /// TCP port the HTTP server binds to.
    pub port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `DATA_PATH` – historical dataset (default: `data/air_quality.csv`)
/// - `MODEL_PATH` – model artifact (default: `models/pm25_linear.json`)
/// - `TARGET` – target column name (default: `PM2.5`)
/// - `PORT` – HTTP listen port (default: 8000)
///
/// Returns an error if any present variable fails to parse. Whether the
/// configured paths actually exist is validated when the application context
/// is built, so the failure can carry the resolved path.
pub fn load_from_env() -> Result<Config> {
    // ---
    let data_path = PathBuf::from(env_or!("DATA_PATH", "data/air_quality.csv"));
    let model_path = PathBuf::from(env_or!("MODEL_PATH", "models/pm25_linear.json"));
    let target = env_or!("TARGET", "PM2.5");
    let port = parse_env_u16!("PORT", 8000);

    Ok(Config {
        data_path,
        model_path,
        target,
        port,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATA_PATH  : {}", self.data_path.display());
        tracing::info!("  MODEL_PATH : {}", self.model_path.display());
        tracing::info!("  TARGET     : {}", self.target);
        tracing::info!("  PORT       : {}", self.port);
    }
}
