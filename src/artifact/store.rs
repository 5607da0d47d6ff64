//! Artifact persistence

use super::{ArtifactMetrics, FeatureImportances, ModelArtifact};
use crate::error::{AirqError, Result};
use crate::preprocessing::FittedTransform;
use crate::training::RandomForestRegressor;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MODEL_FILE: &str = "model.bin";
pub const METRICS_FILE: &str = "model_metrics.json";
pub const FEATURE_IMPORTANCES_FILE: &str = "feature_importances.json";

/// Bumped whenever the encoded model state changes shape
pub const MODEL_FORMAT_VERSION: u32 = 2;

// `format_version` must stay the leading field
#[derive(Serialize)]
struct ModelStateRef<'a> {
    format_version: u32,
    metrics_sha256: String,
    importances_sha256: String,
    transform: &'a FittedTransform,
    model: &'a RandomForestRegressor,
}

#[derive(Deserialize)]
struct ModelState {
    format_version: u32,
    metrics_sha256: String,
    importances_sha256: String,
    transform: FittedTransform,
    model: RandomForestRegressor,
}

impl ModelArtifact {
    /// Write the artifact into `dir`, creating it if needed.
    ///
    /// Each file is written to a temporary sibling and renamed into place, so
    /// a reader never observes a half-written file. The model state records
    /// digests of the two JSON files and is written last, which lets
    /// [`ModelArtifact::load`] reject files left over from a different save.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let metrics_json = serde_json::to_string_pretty(&self.metrics)?;
        let importances_json = serde_json::to_string_pretty(&self.importances)?;

        let state = ModelStateRef {
            format_version: MODEL_FORMAT_VERSION,
            metrics_sha256: compute_sha256(metrics_json.as_bytes()),
            importances_sha256: compute_sha256(importances_json.as_bytes()),
            transform: &self.transform,
            model: &self.model,
        };
        let model_bytes = bincode::serialize(&state)?;

        write_atomic(&dir.join(METRICS_FILE), metrics_json.as_bytes())?;
        write_atomic(&dir.join(FEATURE_IMPORTANCES_FILE), importances_json.as_bytes())?;
        write_atomic(&dir.join(MODEL_FILE), &model_bytes)?;

        info!(
            dir = %dir.display(),
            model_bytes = model_bytes.len(),
            n_trees = self.model.n_trees(),
            "Model artifact saved"
        );
        Ok(())
    }

    /// Load all three artifact files from `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let model_path = dir.join(MODEL_FILE);
        let bytes = read_file(&model_path)?;

        let state: ModelState = bincode::deserialize(&bytes)
            .map_err(|e| AirqError::ArtifactCorrupt(format!("{}: {}", model_path.display(), e)))?;
        if state.format_version != MODEL_FORMAT_VERSION {
            return Err(AirqError::ArtifactCorrupt(format!(
                "{}: unsupported format version {} (expected {})",
                model_path.display(),
                state.format_version,
                MODEL_FORMAT_VERSION
            )));
        }

        let metrics_path = dir.join(METRICS_FILE);
        let metrics_bytes = read_file(&metrics_path)?;
        check_digest(&metrics_path, &metrics_bytes, &state.metrics_sha256)?;
        let metrics = parse_json(&metrics_path, &metrics_bytes)?;

        let importances_path = dir.join(FEATURE_IMPORTANCES_FILE);
        let importances_bytes = read_file(&importances_path)?;
        check_digest(&importances_path, &importances_bytes, &state.importances_sha256)?;
        let importances = parse_json(&importances_path, &importances_bytes)?;

        let artifact = ModelArtifact::new(state.transform, state.model, metrics, importances)
            .map_err(|e| AirqError::ArtifactCorrupt(format!("{}: {}", dir.display(), e)))?;

        info!(
            dir = %dir.display(),
            n_features = artifact.transform.n_features(),
            n_trees = artifact.model.n_trees(),
            "Model artifact loaded"
        );
        Ok(artifact)
    }

    /// Whether `dir` holds a saved model
    pub fn exists(dir: impl AsRef<Path>) -> bool {
        dir.as_ref().join(MODEL_FILE).is_file()
    }
}

impl ArtifactMetrics {
    /// Read only the metrics file of an artifact directory
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        read_json(&dir.as_ref().join(METRICS_FILE))
    }
}

impl FeatureImportances {
    /// Read only the importances file of an artifact directory
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        read_json(&dir.as_ref().join(FEATURE_IMPORTANCES_FILE))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AirqError::ArtifactNotFound(path.to_path_buf())),
        Err(e) => Err(AirqError::IoError(e)),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    parse_json(path, &read_file(path)?)
}

fn parse_json<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| AirqError::ArtifactCorrupt(format!("{}: {}", path.display(), e)))
}

/// Compute SHA-256 hash of data
fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn check_digest(path: &Path, bytes: &[u8], expected: &str) -> Result<()> {
    if compute_sha256(bytes) != expected {
        return Err(AirqError::ArtifactCorrupt(format!(
            "{}: does not match {} (written by a different save)",
            path.display(),
            MODEL_FILE
        )));
    }
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Wrote artifact file");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
