//! Paths resolved from the environment

use std::path::{Path, PathBuf};

pub const DEFAULT_ARTIFACT_DIR: &str = "./artifacts";
pub const DEFAULT_DATA_PATH: &str = "./air_quality.csv";

/// Where training data is read from and where the artifact lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    pub artifact_dir: PathBuf,
    pub data_path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            artifact_dir: std::env::var("ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACT_DIR)),
            data_path: std::env::var("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH)),
        }
    }
}

impl ArtifactConfig {
    pub fn new(artifact_dir: impl Into<PathBuf>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            data_path: data_path.into(),
        }
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }
}
