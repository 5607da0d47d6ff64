//! Feature pipeline
//!
//! Turns a [`Dataset`](crate::data::Dataset) into a numeric design matrix:
//! - causal lag construction on the raw, time-ordered observations
//! - mean imputation of numeric features
//! - one-hot encoding of categorical features over a frozen vocabulary
//!
//! Fitting produces a [`FittedTransform`] whose parameters are persisted with
//! the model and reused unchanged at serving time.

mod encoder;
mod imputer;
mod lag;
mod pipeline;

pub use encoder::OneHotEncoder;
pub use imputer::MeanImputer;
pub use lag::{build_feature_rows, is_contiguous};
pub use pipeline::{FeaturePipeline, FittedTransform};

use chrono::NaiveDateTime;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// One row of model inputs before imputation and encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Numeric feature values in schema order, `None` where missing
    pub numeric: Vec<Option<f64>>,
    /// Categorical feature values in schema order, `None` where missing
    pub categorical: Vec<Option<String>>,
}

impl FeatureRow {
    pub fn new(numeric: Vec<Option<f64>>, categorical: Vec<Option<String>>) -> Self {
        Self { numeric, categorical }
    }
}

/// Feature rows paired with their targets, in time order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineeredDataset {
    pub rows: Vec<FeatureRow>,
    pub targets: Vec<f64>,
    pub timestamps: Vec<NaiveDateTime>,
}

impl EngineeredDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Subset by row indices, preserving the given order
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
            timestamps: indices.iter().map(|&i| self.timestamps[i]).collect(),
        }
    }

    pub fn target_array(&self) -> Array1<f64> {
        Array1::from_vec(self.targets.clone())
    }
}
