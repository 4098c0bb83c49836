//! Feature derivation over the normalized hourly series.
//!
//! Produces the matrix the regression model consumes: calendar features,
//! target lags, trailing rolling statistics, and the original numeric
//! columns. Rows whose lookback window is incomplete are dropped, so the
//! matrix never contains a missing value. Pure and deterministic.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::error::ForecastError;
use crate::timeseries::HourlySeries;

// ---

/// Lag offsets and rolling-window sizes, in hours.
#[derive(Debug, Clone)]
pub struct FeatureParams {
    pub lags: Vec<usize>,
    pub rolling_windows: Vec<usize>,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            lags: vec![1, 2, 3, 6, 12, 24],
            rolling_windows: vec![3, 6, 12, 24],
        }
    }
}

/// Dense feature matrix keyed by timestamp. Row-major; `columns` names the
/// cells of each row, and includes the target column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub timestamps: Vec<NaiveDateTime>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---

/// Build the feature matrix for `target` over the whole series.
///
/// Returns the matrix together with the feature column names (every matrix
/// column except the target). The matrix can legitimately be empty when the
/// series is shorter than the largest lookback; the caller decides whether
/// that is an error.
pub fn build_features(
    series: &HourlySeries,
    target: &str,
    params: &FeatureParams,
) -> Result<(FeatureMatrix, Vec<String>), ForecastError> {
    // ---
    let target_values = series.numeric_column(target).ok_or_else(|| {
        ForecastError::DataUnavailable(format!(
            "target column '{target}' is not part of the hourly series"
        ))
    })?;

    // Calendar features from the timestamp key of each row.
    let mut derived: Vec<(String, Vec<Option<f64>>)> = vec![
        (
            "hour".to_string(),
            series
                .timestamps
                .iter()
                .map(|ts| Some(ts.hour() as f64))
                .collect(),
        ),
        (
            "dayofweek".to_string(),
            series
                .timestamps
                .iter()
                .map(|ts| Some(ts.weekday().num_days_from_monday() as f64))
                .collect(),
        ),
        (
            "month".to_string(),
            series
                .timestamps
                .iter()
                .map(|ts| Some(ts.month() as f64))
                .collect(),
        ),
        (
            "is_weekend".to_string(),
            series
                .timestamps
                .iter()
                .map(|ts| {
                    let weekend = ts.weekday().num_days_from_monday() >= 5;
                    Some(if weekend { 1.0 } else { 0.0 })
                })
                .collect(),
        ),
    ];

    for &lag in &params.lags {
        derived.push((format!("{target}_lag{lag}"), lag_column(target_values, lag)));
    }
    for &window in &params.rolling_windows {
        let (mean, std) = rolling_stats(target_values, window);
        derived.push((format!("{target}_rollmean{window}"), mean));
        derived.push((format!("{target}_rollstd{window}"), std));
    }

    let mut columns: Vec<String> = series.numeric_names.clone();
    columns.extend(derived.iter().map(|(name, _)| name.clone()));

    // Assemble rows; any missing cell (lag/rolling warm-up or a column that
    // never had observations) drops the whole row.
    let mut timestamps = Vec::new();
    let mut rows = Vec::new();
    'rows: for i in 0..series.len() {
        let mut row = Vec::with_capacity(columns.len());
        for column in &series.numeric {
            match column[i] {
                Some(v) => row.push(v),
                None => continue 'rows,
            }
        }
        for (_, values) in &derived {
            match values[i] {
                Some(v) => row.push(v),
                None => continue 'rows,
            }
        }
        timestamps.push(series.timestamps[i]);
        rows.push(row);
    }

    let feature_names: Vec<String> = columns.iter().filter(|c| *c != target).cloned().collect();

    Ok((
        FeatureMatrix {
            timestamps,
            columns,
            rows,
        },
        feature_names,
    ))
}

/// Target value `lag` rows earlier; missing for the first `lag` rows.
fn lag_column(values: &[Option<f64>], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| if i >= lag { values[i - lag] } else { None })
        .collect()
}

/// Trailing-window mean and sample standard deviation, inclusive of the
/// current row.
///
/// Minimum required observations per window is `max(1, window / 2)`; a
/// standard deviation over fewer than 2 observations is missing.
fn rolling_stats(
    values: &[Option<f64>],
    window: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    // ---
    let min_periods = (window / 2).max(1);
    let mut means = Vec::with_capacity(values.len());
    let mut stds = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let observed: Vec<f64> = values[start..=i].iter().flatten().copied().collect();
        let count = observed.len();

        if count >= min_periods {
            let mean = observed.iter().sum::<f64>() / count as f64;
            means.push(Some(mean));
            if count >= 2 {
                let variance = observed
                    .iter()
                    .map(|v| (v - mean).powi(2))
                    .sum::<f64>()
                    / (count - 1) as f64;
                stds.push(Some(variance.sqrt()));
            } else {
                stds.push(None);
            }
        } else {
            means.push(None);
            stds.push(None);
        }
    }

    (means, stds)
}
