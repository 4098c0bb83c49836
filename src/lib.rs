//! Core library for the `aircast` backend service.
//!
//! Exposes the deterministic processing pipeline behind the PM2.5 forecast
//! API so that both the binary (`main.rs`) and integration tests can build
//! the application in-process:
//! - `ingest`: CSV loading and column type classification
//! - `timeseries`: hourly alignment, aggregation, and gap filling
//! - `features`: calendar / lag / rolling feature derivation
//! - `aqi`: PM2.5 → AQI piecewise-linear mapping
//! - `model`: the pretrained regression model artifact
//! - `service`: the forecaster orchestrating the pipeline
//! - `routes`: the HTTP gateway (EMBP pattern)

pub mod aqi;
pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod model;
pub mod routes;
pub mod service;
pub mod timeseries;

pub use config::Config;
pub use error::{ConfigError, ForecastError};
pub use service::{AppContext, Forecaster};
