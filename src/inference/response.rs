//! Response body for the predict endpoint

use crate::error::AirqError;
use serde::{Deserialize, Serialize};

/// Outcome of a single prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<f64>,
    pub message: String,
}

impl PredictionResponse {
    pub fn success(prediction: f64) -> Self {
        Self {
            success: true,
            prediction: Some(prediction),
            message: format!("Predicted PM2.5: {} μg/m³", prediction),
        }
    }

    pub fn failure(err: &AirqError) -> Self {
        Self::error_message(err.to_string())
    }

    pub fn error_message(detail: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            prediction: None,
            message: format!("Error: {}", detail),
        }
    }
}
