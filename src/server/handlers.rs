//! Request handlers

use super::error::{Result, ServerError};
use super::state::AppState;
use crate::artifact::ModelArtifact;
use crate::inference::PredictionResponse;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Predict PM2.5 from a JSON object of feature values.
///
/// Always answers 200: malformed bodies and invalid fields come back as
/// `success: false` with the reason in `message`.
pub async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Json<PredictionResponse> {
    let response = match serde_json::from_slice::<Value>(&body) {
        Ok(value) => state.service.respond(&value),
        Err(e) => PredictionResponse::error_message(format!("invalid JSON body: {}", e)),
    };

    if !response.success {
        warn!(message = %response.message, "Prediction request failed");
    }
    Json(response)
}

/// Metrics and feature importances of the current model
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let artifact = state
        .service
        .current()
        .ok_or_else(|| ServerError::NotFound("no model loaded".to_string()))?;

    Ok(Json(json!({
        "metrics": artifact.metrics(),
        "feature_importances": artifact.importances(),
    })))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": state.service.is_loaded(),
        "uptime_secs": chrono::Utc::now().signed_duration_since(state.started_at).num_seconds(),
    }))
}

/// Re-read the artifact directory and swap the new model in
pub async fn reload_model(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let dir = state.config.artifact_dir.clone();
    let artifact = tokio::task::spawn_blocking(move || ModelArtifact::load(dir))
        .await
        .map_err(|e| ServerError::Internal(format!("reload task failed: {}", e)))??;

    let metrics = artifact.metrics().clone();
    let previous = state.service.replace(artifact);
    info!(
        artifact_dir = %state.config.artifact_dir.display(),
        replaced = previous.is_some(),
        r2 = metrics.r2_score,
        "Model reloaded"
    );

    Ok(Json(json!({
        "reloaded": true,
        "metrics": metrics,
    })))
}
