//! The pretrained regression model artifact.
//!
//! The forecaster only needs one capability from the model: a scalar point
//! prediction for a named feature row. That seam is the [`Model`] trait so
//! tests can substitute fakes. The shipped artifact is a linear model stored
//! as JSON: an intercept plus one coefficient per feature name.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

// ---

/// A pretrained regression model: one feature row in, one prediction out.
///
/// Implementations are read-only and never mutated after load.
pub trait Model: Send + Sync {
    /// Point prediction for a feature row given as parallel name/value slices.
    fn predict(&self, names: &[String], values: &[f64]) -> f64;
}

/// Linear regression artifact.
///
/// Features absent from `coefficients` contribute nothing, so the model
/// tolerates extra columns in the feature row.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: HashMap<String, f64>,
}

impl Model for LinearModel {
    fn predict(&self, names: &[String], values: &[f64]) -> f64 {
        // ---
        let mut prediction = self.intercept;
        for (name, value) in names.iter().zip(values) {
            if let Some(weight) = self.coefficients.get(name) {
                prediction += weight * value;
            }
        }
        prediction
    }
}

/// Load the model artifact from a JSON file.
pub fn load_model(path: &Path) -> Result<Box<dyn Model>, ConfigError> {
    // ---
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let model: LinearModel =
        serde_json::from_str(&raw).map_err(|source| ConfigError::ModelParse {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(
        "Loaded linear model with {} coefficients from {}",
        model.coefficients.len(),
        path.display()
    );

    Ok(Box::new(model))
}

#[cfg(test)]
mod tests {
    // ---
    use approx::assert_relative_eq;

    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn linear_model_combines_intercept_and_weights() {
        // ---
        let model = LinearModel {
            intercept: 2.0,
            coefficients: HashMap::from([
                ("PM2.5_lag1".to_string(), 0.5),
                ("hour".to_string(), 0.1),
            ]),
        };

        let prediction = model.predict(&names(&["PM2.5_lag1", "hour"]), &[40.0, 10.0]);
        assert_relative_eq!(prediction, 2.0 + 20.0 + 1.0);
    }

    #[test]
    fn unknown_features_are_ignored() {
        // ---
        let model = LinearModel {
            intercept: 1.0,
            coefficients: HashMap::from([("PM2.5_lag1".to_string(), 1.0)]),
        };

        let prediction = model.predict(
            &names(&["PM2.5_lag1", "PM2.5_rollstd24"]),
            &[5.0, 1000.0],
        );
        assert_relative_eq!(prediction, 6.0);
    }

    #[test]
    fn artifact_parses_from_json() {
        // ---
        let raw = r#"{"intercept": 3.5, "coefficients": {"PM2.5_lag1": 0.9}}"#;
        let model: LinearModel = serde_json::from_str(raw).unwrap();
        assert_relative_eq!(model.intercept, 3.5);
        assert_relative_eq!(model.coefficients["PM2.5_lag1"], 0.9);
    }
}
