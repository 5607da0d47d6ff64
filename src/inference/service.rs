//! Shared inference over the current model artifact

use super::request::PredictionRequest;
use super::response::PredictionResponse;
use crate::artifact::ModelArtifact;
use crate::error::{AirqError, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

/// Predict PM2.5 for a validated request, rounded to 2 decimals
pub fn predict(artifact: &ModelArtifact, request: &PredictionRequest) -> Result<f64> {
    let raw = artifact
        .predict_row(&request.to_feature_row())
        .map_err(|e| AirqError::PredictionError(e.to_string()))?;
    if !raw.is_finite() {
        return Err(AirqError::PredictionError(format!(
            "model produced a non-finite value: {}",
            raw
        )));
    }
    Ok(round2(raw))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Holds the artifact used to answer predictions.
///
/// Readers clone the inner `Arc` and release the lock before predicting, so
/// [`InferenceService::replace`] publishes a new artifact atomically while
/// in-flight requests finish on the one they started with.
#[derive(Debug, Default)]
pub struct InferenceService {
    artifact: RwLock<Option<Arc<ModelArtifact>>>,
}

impl InferenceService {
    /// Service with no model loaded; predictions fail until one is set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(artifact: ModelArtifact) -> Self {
        Self {
            artifact: RwLock::new(Some(Arc::new(artifact))),
        }
    }

    /// Current artifact, if any
    pub fn current(&self) -> Option<Arc<ModelArtifact>> {
        self.artifact.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.artifact.read().is_some()
    }

    /// Swap in a new artifact, returning the previous one
    pub fn replace(&self, artifact: ModelArtifact) -> Option<Arc<ModelArtifact>> {
        self.artifact.write().replace(Arc::new(artifact))
    }

    /// Predict for a validated request
    pub fn predict(&self, request: &PredictionRequest) -> Result<f64> {
        let artifact = self
            .current()
            .ok_or_else(|| AirqError::PredictionError("no model loaded".to_string()))?;
        predict(&artifact, request)
    }

    /// Validate a raw JSON request and predict
    pub fn predict_json(&self, value: &Value) -> Result<f64> {
        let request = PredictionRequest::from_json(value)?;
        self.predict(&request)
    }

    /// Never fails: errors become an unsuccessful response
    pub fn respond(&self, value: &Value) -> PredictionResponse {
        match self.predict_json(value) {
            Ok(prediction) => PredictionResponse::success(prediction),
            Err(err) => PredictionResponse::failure(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round2() {
        assert_eq!(round2(87.456), 87.46);
        assert_eq!(round2(87.0), 87.0);
    }

    #[test]
    fn test_empty_service() {
        let service = InferenceService::new();
        assert!(!service.is_loaded());
        let response = service.respond(&json!({}));
        assert!(!response.success);
        assert!(response.prediction.is_none());
        assert!(response.message.starts_with("Error: "));
    }
}
