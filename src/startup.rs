//! Obtain a model artifact before serving

use crate::artifact::ModelArtifact;
use crate::config::ArtifactConfig;
use crate::data::load_dataset;
use crate::error::Result;
use crate::training::{EvaluationReport, ModelTrainer, TrainingConfig};
use tracing::info;

/// How the startup artifact was obtained
#[derive(Debug, Clone)]
pub enum ArtifactOrigin {
    /// Read from the artifact directory
    Loaded,
    /// Trained from the data file and saved
    Trained(Box<EvaluationReport>),
}

/// Load the saved artifact, or train and save one if none exists.
///
/// A saved artifact that fails to load is an error; it is never silently
/// replaced by retraining. All errors here are fatal to the caller.
pub fn load_or_train(
    paths: &ArtifactConfig,
    training: &TrainingConfig,
) -> Result<(ModelArtifact, ArtifactOrigin)> {
    if ModelArtifact::exists(paths.artifact_dir()) {
        let artifact = ModelArtifact::load(paths.artifact_dir())?;
        return Ok((artifact, ArtifactOrigin::Loaded));
    }

    info!(
        artifact_dir = %paths.artifact_dir().display(),
        data_path = %paths.data_path().display(),
        "No saved model found, training"
    );
    let (artifact, report) = train_and_save(paths, training)?;
    Ok((artifact, ArtifactOrigin::Trained(Box::new(report))))
}

/// Train from the data file and persist the result
pub fn train_and_save(
    paths: &ArtifactConfig,
    training: &TrainingConfig,
) -> Result<(ModelArtifact, EvaluationReport)> {
    let dataset = load_dataset(paths.data_path())?;
    let (artifact, report) = ModelTrainer::new(training.clone()).train(&dataset)?;
    artifact.save(paths.artifact_dir())?;
    Ok((artifact, report))
}
