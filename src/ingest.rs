//! CSV ingestion for the historical air-quality dataset.
//!
//! Reads the raw table once at startup and classifies each column as numeric
//! or categorical in a single explicit pass, caching the result on the table
//! so it is never re-inferred per request.

use std::path::Path;

use crate::error::ConfigError;

// ---

/// How a column's cells should be interpreted downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-missing cell parses as a number.
    Numeric,
    /// Anything else (free-text metadata, station names, ...).
    Categorical,
}

/// Raw tabular records as read from disk, cells kept as strings.
///
/// Empty cells are missing values. `kinds` holds the cached classification
/// for each column, parallel to `headers`.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub kinds: Vec<ColumnKind>,
}

impl RawTable {
    /// Build a table from headers and rows, classifying each column.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        // ---
        let kinds = classify_columns(&headers, &rows);
        Self {
            headers,
            rows,
            kinds,
        }
    }

    /// Index of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Load the historical dataset from a CSV file with a header row.
///
/// Short rows are padded with missing cells so every row has one cell per
/// header; extra cells are truncated.
pub fn load_table(path: &Path) -> Result<RawTable, ConfigError> {
    // ---
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| ConfigError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| ConfigError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| ConfigError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut row: Vec<String> = record
            .iter()
            .take(headers.len())
            .map(|c| c.trim().to_string())
            .collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    tracing::info!(
        "Loaded {} rows x {} columns from {}",
        rows.len(),
        headers.len(),
        path.display()
    );

    Ok(RawTable::new(headers, rows))
}

/// Classify each column: numeric iff every non-missing cell parses as `f64`.
///
/// A column with no non-missing cells is numeric (it behaves as an all-missing
/// measurement series downstream).
fn classify_columns(headers: &[String], rows: &[Vec<String>]) -> Vec<ColumnKind> {
    // ---
    (0..headers.len())
        .map(|col| {
            let all_numeric = rows
                .iter()
                .map(|row| row[col].as_str())
                .filter(|cell| !cell.is_empty())
                .all(|cell| cell.parse::<f64>().is_ok());
            if all_numeric {
                ColumnKind::Numeric
            } else {
                ColumnKind::Categorical
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        // ---
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn numeric_column_detected() {
        // ---
        let t = table(
            &["timestamp", "PM2.5"],
            &[
                &["2024-01-01 00:00:00", "12.5"],
                &["2024-01-01 01:00:00", "13"],
            ],
        );
        assert_eq!(t.kinds[1], ColumnKind::Numeric);
    }

    #[test]
    fn mixed_column_is_categorical() {
        // ---
        let t = table(
            &["timestamp", "station"],
            &[
                &["2024-01-01 00:00:00", "north"],
                &["2024-01-01 01:00:00", "7"],
            ],
        );
        assert_eq!(t.kinds[1], ColumnKind::Categorical);
    }

    #[test]
    fn missing_cells_do_not_break_numeric_inference() {
        // ---
        let t = table(
            &["timestamp", "NO2"],
            &[
                &["2024-01-01 00:00:00", ""],
                &["2024-01-01 01:00:00", "30.1"],
            ],
        );
        assert_eq!(t.kinds[1], ColumnKind::Numeric);
    }

    #[test]
    fn all_missing_column_is_numeric() {
        // ---
        let t = table(
            &["timestamp", "O3"],
            &[&["2024-01-01 00:00:00", ""], &["2024-01-01 01:00:00", ""]],
        );
        assert_eq!(t.kinds[1], ColumnKind::Numeric);
    }

    #[test]
    fn column_index_lookup() {
        // ---
        let t = table(&["timestamp", "PM2.5"], &[]);
        assert_eq!(t.column_index("PM2.5"), Some(1));
        assert_eq!(t.column_index("PM10"), None);
    }
}
