//! Time-series normalization for the raw air-quality table.
//!
//! Turns the irregular raw records into the canonical [`HourlySeries`]:
//! timestamps floored to the hour, duplicate hours aggregated, the index
//! reindexed to a contiguous hourly grid, and gaps filled (time-weighted
//! interpolation plus edge fills for numeric columns, most-frequent-value
//! for categorical columns).
//!
//! Rows whose timestamp does not parse are dropped rather than rejected;
//! the count is kept on the series and logged so the filtering is visible.

use std::collections::BTreeMap;

use chrono::{DurationRound, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::ConfigError;
use crate::ingest::{ColumnKind, RawTable};

// ---

/// Column names recognized as the timestamp column (case-insensitive).
pub const TIME_COLUMN_CANDIDATES: [&str; 4] = ["timestamp", "datetime", "date", "time"];

/// The canonical hour-aligned, gap-filled series all features derive from.
///
/// Invariants after [`normalize`]:
/// - `timestamps` is strictly increasing at exactly 1-hour spacing with no
///   missing hours between its min and max;
/// - every numeric cell is `Some`, except in columns that had zero
///   observations in the raw data;
/// - categorical cells are never empty.
///
/// Numeric and categorical data are column-major, parallel to
/// `numeric_names` / `categorical_names`.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub numeric_names: Vec<String>,
    pub numeric: Vec<Vec<Option<f64>>>,
    pub categorical_names: Vec<String>,
    pub categorical: Vec<Vec<String>>,
    /// Raw rows discarded because their timestamp failed to parse.
    pub dropped_rows: usize,
}

impl HourlySeries {
    /// Number of hourly rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The values of a numeric column, if it exists.
    pub fn numeric_column(&self, name: &str) -> Option<&[Option<f64>]> {
        // ---
        self.numeric_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.numeric[i].as_slice())
    }
}

/// Render an hourly key the way the API exposes timestamps.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ---

/// Normalize raw records into an [`HourlySeries`].
///
/// Fails with [`ConfigError::NoTimestampColumn`] when no timestamp column is
/// recognized and with [`ConfigError::TargetColumnMissing`] when `target` is
/// not a numeric column of the result. Unparseable timestamps drop their row.
pub fn normalize(table: &RawTable, target: &str) -> Result<HourlySeries, ConfigError> {
    // ---
    let time_col =
        detect_time_column(&table.headers).ok_or_else(|| ConfigError::NoTimestampColumn {
            available: table.headers.clone(),
        })?;

    // Partition the remaining columns using the cached classification.
    let mut numeric_cols: Vec<usize> = Vec::new();
    let mut categorical_cols: Vec<usize> = Vec::new();
    for (idx, kind) in table.kinds.iter().enumerate() {
        if idx == time_col {
            continue;
        }
        match kind {
            ColumnKind::Numeric => numeric_cols.push(idx),
            ColumnKind::Categorical => categorical_cols.push(idx),
        }
    }

    // Parse timestamps, floor to the hour, and sort; bad rows are dropped.
    let mut keyed: Vec<(NaiveDateTime, &Vec<String>)> = Vec::with_capacity(table.rows.len());
    let mut dropped_rows = 0usize;
    for row in &table.rows {
        match parse_hour_key(&row[time_col]) {
            Some(hour) => keyed.push((hour, row)),
            None => dropped_rows += 1,
        }
    }
    if dropped_rows > 0 {
        tracing::warn!(
            "Dropped {} of {} rows with unparseable timestamps",
            dropped_rows,
            table.rows.len()
        );
    }
    keyed.sort_by_key(|(hour, _)| *hour);

    // Group rows by hour. The stable sort above keeps file order within an
    // hour, so "last value in group" is well defined.
    let mut groups: BTreeMap<NaiveDateTime, Vec<&Vec<String>>> = BTreeMap::new();
    for (hour, row) in keyed {
        groups.entry(hour).or_default().push(row);
    }

    // Reindex onto the full contiguous hourly grid.
    let timestamps = hourly_grid(&groups);

    // Aggregate: mean for numeric columns, last observed value for the rest.
    let mut numeric: Vec<Vec<Option<f64>>> = Vec::with_capacity(numeric_cols.len());
    for &col in &numeric_cols {
        let mut values: Vec<Option<f64>> = timestamps
            .iter()
            .map(|ts| groups.get(ts).and_then(|rows| group_mean(rows, col)))
            .collect();
        interpolate_time(&timestamps, &mut values);
        forward_fill(&mut values);
        backward_fill(&mut values);
        numeric.push(values);
    }

    let mut categorical: Vec<Vec<String>> = Vec::with_capacity(categorical_cols.len());
    for &col in &categorical_cols {
        let values: Vec<Option<String>> = timestamps
            .iter()
            .map(|ts| groups.get(ts).and_then(|rows| group_last(rows, col)))
            .collect();
        categorical.push(mode_fill(values));
    }

    let numeric_names: Vec<String> = numeric_cols
        .iter()
        .map(|&i| table.headers[i].clone())
        .collect();
    let categorical_names: Vec<String> = categorical_cols
        .iter()
        .map(|&i| table.headers[i].clone())
        .collect();

    if !numeric_names.iter().any(|n| n == target) {
        let mut available = numeric_names.clone();
        available.extend(categorical_names.iter().cloned());
        return Err(ConfigError::TargetColumnMissing {
            target: target.to_string(),
            available,
        });
    }

    tracing::info!(
        "Normalized to {} hourly rows ({} numeric, {} categorical columns)",
        timestamps.len(),
        numeric_names.len(),
        categorical_names.len()
    );

    Ok(HourlySeries {
        timestamps,
        numeric_names,
        numeric,
        categorical_names,
        categorical,
        dropped_rows,
    })
}

/// First column whose name matches a timestamp candidate, case-insensitively.
pub fn detect_time_column(headers: &[String]) -> Option<usize> {
    // ---
    headers
        .iter()
        .position(|h| TIME_COLUMN_CANDIDATES.contains(&h.to_lowercase().as_str()))
}

/// Parse a raw timestamp cell and floor it to the start of its hour.
fn parse_hour_key(raw: &str) -> Option<NaiveDateTime> {
    parse_timestamp(raw).and_then(|ts| ts.duration_trunc(TimeDelta::hours(1)).ok())
}

/// Parse the timestamp shapes seen in air-quality exports.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    // ---
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Complete hourly index from the minimum to maximum observed hour.
fn hourly_grid(groups: &BTreeMap<NaiveDateTime, Vec<&Vec<String>>>) -> Vec<NaiveDateTime> {
    // ---
    let (Some(start), Some(end)) = (
        groups.keys().next().copied(),
        groups.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    let mut grid = Vec::new();
    let mut t = start;
    while t <= end {
        grid.push(t);
        t += TimeDelta::hours(1);
    }
    grid
}

/// Arithmetic mean of the parseable cells of `col` within one hour group.
fn group_mean(rows: &[&Vec<String>], col: usize) -> Option<f64> {
    // ---
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|row| row[col].parse::<f64>().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Last non-missing cell of `col` within one hour group.
fn group_last(rows: &[&Vec<String>], col: usize) -> Option<String> {
    rows.iter()
        .rev()
        .map(|row| row[col].as_str())
        .find(|cell| !cell.is_empty())
        .map(str::to_string)
}

// ---

/// Time-weighted linear interpolation, bounded on both ends.
///
/// Interior gaps are interpolated between their neighbors; head and tail
/// gaps take the nearest observed value. Columns with no observations are
/// left untouched.
fn interpolate_time(timestamps: &[NaiveDateTime], values: &mut [Option<f64>]) {
    // ---
    let observed: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.is_some().then_some(i))
        .collect();
    let (Some(&first), Some(&last)) = (observed.first(), observed.last()) else {
        return;
    };

    for i in 0..first {
        values[i] = values[first];
    }
    for i in last + 1..values.len() {
        values[i] = values[last];
    }

    for pair in observed.windows(2) {
        let (i0, i1) = (pair[0], pair[1]);
        if i1 - i0 <= 1 {
            continue;
        }
        let (Some(v0), Some(v1)) = (values[i0], values[i1]) else {
            continue;
        };
        let span = (timestamps[i1] - timestamps[i0]).num_seconds() as f64;
        for i in i0 + 1..i1 {
            let frac = (timestamps[i] - timestamps[i0]).num_seconds() as f64 / span;
            values[i] = Some(v0 + (v1 - v0) * frac);
        }
    }
}

/// Propagate the last observed value forward over remaining gaps.
fn forward_fill(values: &mut [Option<f64>]) {
    // ---
    let mut carried = None;
    for v in values.iter_mut() {
        match v {
            Some(x) => carried = Some(*x),
            None => *v = carried,
        }
    }
}

/// Propagate the next observed value backward over remaining gaps.
fn backward_fill(values: &mut [Option<f64>]) {
    // ---
    let mut carried = None;
    for v in values.iter_mut().rev() {
        match v {
            Some(x) => carried = Some(*x),
            None => *v = carried,
        }
    }
}

/// Fill categorical gaps with the most frequent value over the whole series.
///
/// Ties break toward the lexicographically smallest value; a column with no
/// values at all falls back to the literal placeholder "unknown".
fn mode_fill(values: Vec<Option<String>>) -> Vec<String> {
    // ---
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in values.iter().flatten() {
        *counts.entry(v.as_str()).or_default() += 1;
    }

    let mut mode: Option<(&str, usize)> = None;
    for (value, &count) in &counts {
        if mode.map_or(true, |(_, best)| count > best) {
            mode = Some((value, count));
        }
    }
    let fallback = mode.map_or_else(|| "unknown".to_string(), |(v, _)| v.to_string());

    values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fallback.clone()))
        .collect()
}
