//! Prediction service for the `aircast` backend.
//!
//! Orchestrates the deterministic pipeline (normalizer → feature builder →
//! model → AQI mapper) behind the two read operations the HTTP layer
//! exposes. All state is loaded once at startup into [`AppContext`] and is
//! read-only afterwards; every request is a bounded synchronous computation
//! over the in-memory series, so no locking is needed.

use serde::Serialize;

use crate::aqi;
use crate::config::Config;
use crate::error::{ConfigError, ForecastError};
use crate::features::{build_features, FeatureParams};
use crate::ingest;
use crate::model::{load_model, Model};
use crate::timeseries::{self, format_timestamp, HourlySeries};

// ---

/// Hours of processed history returned for the dashboard chart.
pub const RECENT_WINDOW_HOURS: usize = 72;

/// Application state built once in `main` and shared read-only with every
/// request handler. No ambient globals: tests construct their own context
/// from synthetic data and fake models.
pub struct AppContext {
    pub config: Config,
    pub forecaster: Forecaster,
}

impl AppContext {
    /// Load the dataset and model named by `config` and build the forecaster.
    ///
    /// Any failure here is fatal: the process must not start serving traffic
    /// with a missing dataset, model, or target column.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        // ---
        if !config.data_path.exists() {
            return Err(ConfigError::DataFileNotFound {
                path: config.data_path.clone(),
            });
        }
        if !config.model_path.exists() {
            return Err(ConfigError::ModelFileNotFound {
                path: config.model_path.clone(),
            });
        }

        let table = ingest::load_table(&config.data_path)?;
        let series = timeseries::normalize(&table, &config.target)?;
        let model = load_model(&config.model_path)?;

        let forecaster = Forecaster::new(
            series,
            config.target.clone(),
            FeatureParams::default(),
            model,
        );

        Ok(Self { config, forecaster })
    }
}

// ---

/// The last `n` hours of processed history, as parallel arrays,
/// most-recent-last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentWindow {
    pub timestamps: Vec<String>,
    pub pm25: Vec<f64>,
    pub aqi: Vec<f64>,
}

/// The next-hour forecast. Field names are the wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub next_hour_prediction_ugm3: f64,
    pub next_hour_prediction_aqi: u16,
    pub aqi_category_text: String,
    pub aqi_category_class: String,
    pub last_timestamp: String,
}

/// Owns the normalized series and the model; serves the two read operations.
pub struct Forecaster {
    series: HourlySeries,
    target: String,
    params: FeatureParams,
    model: Box<dyn Model>,
}

impl Forecaster {
    pub fn new(
        series: HourlySeries,
        target: String,
        params: FeatureParams,
        model: Box<dyn Model>,
    ) -> Self {
        Self {
            series,
            target,
            params,
            model,
        }
    }

    /// The normalized series backing this forecaster.
    pub fn series(&self) -> &HourlySeries {
        &self.series
    }

    /// Last `hours` rows of the series with their AQI scores. Idempotent.
    pub fn recent_window(&self, hours: usize) -> Result<RecentWindow, ForecastError> {
        // ---
        if self.series.is_empty() {
            return Err(ForecastError::DataUnavailable(
                "the hourly series is empty".to_string(),
            ));
        }
        let target_values = self.target_values()?;

        let start = self.series.len().saturating_sub(hours);
        let mut window = RecentWindow {
            timestamps: Vec::with_capacity(self.series.len() - start),
            pm25: Vec::with_capacity(self.series.len() - start),
            aqi: Vec::with_capacity(self.series.len() - start),
        };

        for i in start..self.series.len() {
            let Some(value) = target_values[i] else {
                return Err(ForecastError::DataUnavailable(format!(
                    "target column '{}' has no observations",
                    self.target
                )));
            };
            let reading = aqi::to_aqi(Some(value));
            let Some(score) = reading.score else {
                return Err(ForecastError::DataUnavailable(format!(
                    "target column '{}' contains non-numeric values",
                    self.target
                )));
            };

            window.timestamps.push(format_timestamp(self.series.timestamps[i]));
            window.pm25.push(round3(value));
            window.aqi.push(f64::from(score));
        }

        Ok(window)
    }

    /// Forecast the next hour from the most recent valid feature row.
    pub fn predict_next_hour(&self) -> Result<Forecast, ForecastError> {
        // ---
        if self.series.is_empty() {
            return Err(ForecastError::DataUnavailable(
                "the hourly series is empty".to_string(),
            ));
        }

        let (matrix, feature_names) =
            build_features(&self.series, &self.target, &self.params)?;
        let Some(last_row) = matrix.rows.last() else {
            return Err(ForecastError::DataUnavailable(format!(
                "no feature row has a complete lookback window over {} hourly rows",
                self.series.len()
            )));
        };

        // Project the row down to the feature columns, in name order.
        let values: Vec<f64> = feature_names
            .iter()
            .filter_map(|name| {
                matrix
                    .columns
                    .iter()
                    .position(|c| c == name)
                    .map(|idx| last_row[idx])
            })
            .collect();

        let predicted = round3(self.model.predict(&feature_names, &values));
        let reading = aqi::to_aqi(Some(predicted));
        let Some(score) = reading.score else {
            return Err(ForecastError::DataUnavailable(
                "model produced a non-numeric prediction".to_string(),
            ));
        };

        let Some(&last_ts) = self.series.timestamps.last() else {
            return Err(ForecastError::DataUnavailable(
                "the hourly series is empty".to_string(),
            ));
        };

        Ok(Forecast {
            next_hour_prediction_ugm3: predicted,
            next_hour_prediction_aqi: score,
            aqi_category_text: reading.label.to_string(),
            aqi_category_class: reading.class.to_string(),
            last_timestamp: format_timestamp(last_ts),
        })
    }

    fn target_values(&self) -> Result<&[Option<f64>], ForecastError> {
        // ---
        self.series.numeric_column(&self.target).ok_or_else(|| {
            ForecastError::DataUnavailable(format!(
                "target column '{}' is not part of the hourly series",
                self.target
            ))
        })
    }
}

/// Round to 3 decimals for the wire format.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    // ---
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveTime, TimeDelta};

    use super::*;
    use crate::model::LinearModel;

    /// Hourly series with a single PM2.5 column starting 2024-01-01 00:00.
    fn series_of(values: &[f64]) -> HourlySeries {
        // ---
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_time(NaiveTime::MIN);
        HourlySeries {
            timestamps: (0..values.len())
                .map(|i| start + TimeDelta::hours(i as i64))
                .collect(),
            numeric_names: vec!["PM2.5".to_string()],
            numeric: vec![values.iter().map(|v| Some(*v)).collect()],
            categorical_names: Vec::new(),
            categorical: Vec::new(),
            dropped_rows: 0,
        }
    }

    /// Model that echoes the previous hour's value.
    fn lag1_model() -> Box<dyn Model> {
        // ---
        Box::new(LinearModel {
            intercept: 0.0,
            coefficients: std::collections::HashMap::from([(
                "PM2.5_lag1".to_string(),
                1.0,
            )]),
        })
    }

    fn forecaster_of(values: &[f64]) -> Forecaster {
        Forecaster::new(
            series_of(values),
            "PM2.5".to_string(),
            FeatureParams::default(),
            lag1_model(),
        )
    }

    #[test]
    fn end_to_end_scenario_over_100_rows() {
        // ---
        // Target values 100, 101, ..., 199: the most recent valid feature
        // row must carry lag1 = 198, which the fake model echoes back.
        let values: Vec<f64> = (0..100).map(|i| 100.0 + i as f64).collect();
        let forecast = forecaster_of(&values).predict_next_hour().unwrap();

        assert_relative_eq!(forecast.next_hour_prediction_ugm3, 198.0);
        assert_eq!(forecast.next_hour_prediction_aqi, 248);
        assert_eq!(forecast.aqi_category_text, "very unhealthy");
        assert_eq!(forecast.aqi_category_class, "aqi-very");
        assert_eq!(forecast.last_timestamp, "2024-01-05 03:00:00");
    }

    #[test]
    fn short_series_fails_with_data_unavailable() {
        // ---
        let err = forecaster_of(&[10.0; 10]).predict_next_hour().unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable(_)));
    }

    #[test]
    fn empty_series_fails_with_data_unavailable() {
        // ---
        let forecaster = forecaster_of(&[]);
        assert!(matches!(
            forecaster.recent_window(RECENT_WINDOW_HOURS),
            Err(ForecastError::DataUnavailable(_))
        ));
        assert!(matches!(
            forecaster.predict_next_hour(),
            Err(ForecastError::DataUnavailable(_))
        ));
    }

    #[test]
    fn recent_window_returns_parallel_arrays_most_recent_last() {
        // ---
        let values: Vec<f64> = (0..100).map(|i| 10.0 + (i % 5) as f64).collect();
        let forecaster = forecaster_of(&values);
        let window = forecaster.recent_window(72).unwrap();

        assert_eq!(window.timestamps.len(), 72);
        assert_eq!(window.pm25.len(), 72);
        assert_eq!(window.aqi.len(), 72);

        // Window covers the series tail, most-recent-last.
        assert_eq!(window.timestamps.last().unwrap(), "2024-01-05 03:00:00");
        assert_relative_eq!(*window.pm25.last().unwrap(), 14.0);

        // Every AQI entry corresponds to its PM2.5 entry.
        for (pm, score) in window.pm25.iter().zip(&window.aqi) {
            let expected = aqi::to_aqi(Some(*pm)).score.unwrap();
            assert_relative_eq!(*score, f64::from(expected));
        }
    }

    #[test]
    fn recent_window_shorter_than_requested() {
        // ---
        let window = forecaster_of(&[10.0, 11.0, 12.0]).recent_window(72).unwrap();
        assert_eq!(window.timestamps.len(), 3);
    }

    #[test]
    fn window_reads_are_stable() {
        // ---
        let values: Vec<f64> = (0..80).map(|i| 20.0 + (i % 7) as f64).collect();
        let forecaster = forecaster_of(&values);
        assert_eq!(
            forecaster.recent_window(72).unwrap(),
            forecaster.recent_window(72).unwrap()
        );
    }

    #[test]
    fn window_values_rounded_to_3_decimals() {
        // ---
        let window = forecaster_of(&[10.123456, 11.9999]).recent_window(72).unwrap();
        assert_relative_eq!(window.pm25[0], 10.123);
        assert_relative_eq!(window.pm25[1], 12.0);
    }
}
