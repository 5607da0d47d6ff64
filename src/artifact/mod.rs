//! Trained model artifact
//!
//! A [`ModelArtifact`] bundles everything needed to serve predictions: the
//! frozen feature transform, the fitted forest, its evaluation metrics and its
//! feature importances. It is created once by training or by [`ModelArtifact::load`]
//! and never mutated afterwards; a reload builds a new value.
//!
//! On disk an artifact is a directory of three files:
//!
//! - `model.bin`: bincode-encoded transform and forest, plus digests of the
//!   two JSON files so a full load only accepts files from the same save
//! - `model_metrics.json`: `{r2_score, rmse, mae, best_params}`
//! - `feature_importances.json`: expanded feature name to weight

mod importances;
mod store;

pub use importances::FeatureImportances;
pub use store::{FEATURE_IMPORTANCES_FILE, METRICS_FILE, MODEL_FILE, MODEL_FORMAT_VERSION};

use crate::error::{AirqError, Result};
use crate::preprocessing::{FeatureRow, FittedTransform};
use crate::training::{ForestParams, RandomForestRegressor, RegressionMetrics};
use serde::{Deserialize, Serialize};

/// Metrics persisted with an artifact, rounded to 4 decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetrics {
    pub r2_score: f64,
    pub rmse: f64,
    pub mae: f64,
    pub best_params: ForestParams,
}

impl ArtifactMetrics {
    pub fn from_evaluation(metrics: &RegressionMetrics, best_params: ForestParams) -> Self {
        Self {
            r2_score: round4(metrics.r2),
            rmse: round4(metrics.rmse),
            mae: round4(metrics.mae),
            best_params,
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Immutable bundle of a fitted transform, forest, metrics and importances
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    transform: FittedTransform,
    model: RandomForestRegressor,
    metrics: ArtifactMetrics,
    importances: FeatureImportances,
}

impl ModelArtifact {
    /// Assemble an artifact, checking that all parts describe the same feature space
    pub fn new(
        transform: FittedTransform,
        model: RandomForestRegressor,
        metrics: ArtifactMetrics,
        importances: FeatureImportances,
    ) -> Result<Self> {
        let width = transform.n_features();
        if !model.is_fitted() {
            return Err(AirqError::ModelNotFitted);
        }
        if model.n_features() != width {
            return Err(AirqError::ShapeError {
                expected: format!("model over {} features", width),
                actual: format!("model over {} features", model.n_features()),
            });
        }
        if importances.len() != width {
            return Err(AirqError::ShapeError {
                expected: format!("{} feature importances", width),
                actual: format!("{} feature importances", importances.len()),
            });
        }

        Ok(Self {
            transform,
            model,
            metrics,
            importances,
        })
    }

    pub fn transform(&self) -> &FittedTransform {
        &self.transform
    }

    pub fn model(&self) -> &RandomForestRegressor {
        &self.model
    }

    pub fn metrics(&self) -> &ArtifactMetrics {
        &self.metrics
    }

    pub fn importances(&self) -> &FeatureImportances {
        &self.importances
    }

    /// Encode a feature row with the frozen transform and run the forest.
    /// The value is not rounded.
    pub fn predict_row(&self, row: &FeatureRow) -> Result<f64> {
        let x = self.transform.transform_row(row)?;
        self.model.predict_row(x.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(12.0), 12.0);
        assert_eq!(round4(-0.00004), -0.0);
    }

    #[test]
    fn test_metrics_from_evaluation() {
        let eval = RegressionMetrics {
            r2: 0.912345,
            rmse: 21.98761,
            mae: 13.00001,
            mse: 483.5,
            n_samples: 10,
        };
        let params = ForestParams { n_estimators: 100, max_depth: None, min_samples_split: 2 };
        let m = ArtifactMetrics::from_evaluation(&eval, params);
        assert_eq!(m.r2_score, 0.9123);
        assert_eq!(m.rmse, 21.9876);
        assert_eq!(m.mae, 13.0);

        let json = serde_json::to_value(&m).unwrap();
        assert!(json["best_params"]["max_depth"].is_null());
        assert_eq!(json["best_params"]["n_estimators"], 100);
    }
}
